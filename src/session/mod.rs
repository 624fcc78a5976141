mod accounts;

pub use accounts::{Account, AccountStore, PasswordDigest, ACCOUNTS_SLOT};

use crate::storage::{decode_slot, encode_slot, SlotStore, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const SESSION_SLOT: &str = "user";

/// The active session, at most one per data directory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub handle: String,
    pub signed_in_at: DateTime<Utc>,
}

/// Persists the active session record in the `user` slot. This is plain
/// session bookkeeping, not authentication: verifying credentials is the
/// caller's job (see [`AccountStore::verify_password`]).
pub struct SessionStore {
    slots: Arc<dyn SlotStore>,
}

impl SessionStore {
    pub fn new(slots: Arc<dyn SlotStore>) -> SessionStore {
        SessionStore { slots }
    }

    pub fn sign_in(&self, handle: &str) -> Result<SessionRecord, StoreError> {
        let record = SessionRecord {
            handle: handle.to_owned(),
            signed_in_at: Utc::now(),
        };
        let payload = encode_slot(SESSION_SLOT, &record)?;
        self.slots.write_slot(SESSION_SLOT, &payload)?;
        Ok(record)
    }

    /// Returns None when nobody is signed in or the slot is unparseable.
    pub fn current(&self) -> Result<Option<SessionRecord>, StoreError> {
        decode_slot(self.slots.as_ref(), SESSION_SLOT)
    }

    pub fn sign_out(&self) -> Result<(), StoreError> {
        self.slots.delete_slot(SESSION_SLOT)
    }
}
