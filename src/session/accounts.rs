use crate::storage::{decode_slot, encode_slot, SlotStore, StoreError};
use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use rand::distr::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::{Arc, Mutex};

pub const ACCOUNTS_SLOT: &str = "users";

const SALT_LEN: usize = 16;

/// Salted SHA-256 digest of a password. Account records only ever hold
/// this digest, never the plaintext.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PasswordDigest {
    pub salt: String,
    pub hash: String,
}

impl PasswordDigest {
    pub fn create(password: &str) -> PasswordDigest {
        let salt: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(SALT_LEN)
            .map(char::from)
            .collect();
        let hash = Self::digest(password, &salt);
        PasswordDigest { salt, hash }
    }

    pub fn verify(&self, password: &str) -> bool {
        Self::digest(password, &self.salt) == self.hash
    }

    fn digest(password: &str, salt: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update(password.as_bytes());
        hasher
            .finalize()
            .iter()
            .map(|byte| format!("{:02x}", byte))
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub handle: String,
    pub display_name: String,
    pub created: DateTime<Utc>,
    pub password: PasswordDigest,
}

/// The registered-account table, persisted as one array in the `users`
/// slot, unique by handle. Full rewrite on every mutation like every
/// other persisted collection.
pub struct AccountStore {
    slots: Arc<dyn SlotStore>,
    accounts: Mutex<Vec<Account>>,
}

impl AccountStore {
    pub fn load(slots: Arc<dyn SlotStore>) -> Result<AccountStore, StoreError> {
        let accounts: Vec<Account> = decode_slot(slots.as_ref(), ACCOUNTS_SLOT)?;
        Ok(AccountStore {
            slots,
            accounts: Mutex::new(accounts),
        })
    }

    pub fn create_account(
        &self,
        handle: &str,
        display_name: &str,
        password: &str,
    ) -> Result<Account> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.iter().any(|account| account.handle == handle) {
            bail!("An account with handle {} already exists", handle);
        }
        let account = Account {
            handle: handle.to_owned(),
            display_name: display_name.to_owned(),
            created: Utc::now(),
            password: PasswordDigest::create(password),
        };
        let mut next = accounts.clone();
        next.push(account.clone());
        self.persist(&next)?;
        *accounts = next;
        Ok(account)
    }

    pub fn get_account(&self, handle: &str) -> Option<Account> {
        self.accounts
            .lock()
            .unwrap()
            .iter()
            .find(|account| account.handle == handle)
            .cloned()
    }

    /// Returns false for an unknown handle as well as a wrong password.
    pub fn verify_password(&self, handle: &str, password: &str) -> bool {
        self.accounts
            .lock()
            .unwrap()
            .iter()
            .find(|account| account.handle == handle)
            .map(|account| account.password.verify(password))
            .unwrap_or(false)
    }

    pub fn update_password(&self, handle: &str, password: &str) -> Result<()> {
        let mut accounts = self.accounts.lock().unwrap();
        let mut next = accounts.clone();
        let Some(account) = next.iter_mut().find(|account| account.handle == handle) else {
            bail!("No account with handle {}", handle);
        };
        account.password = PasswordDigest::create(password);
        self.persist(&next)?;
        *accounts = next;
        Ok(())
    }

    pub fn delete_account(&self, handle: &str) -> Result<()> {
        let mut accounts = self.accounts.lock().unwrap();
        let Some(position) = accounts.iter().position(|account| account.handle == handle) else {
            bail!("No account with handle {}", handle);
        };
        let mut next = accounts.clone();
        next.remove(position);
        self.persist(&next)?;
        *accounts = next;
        Ok(())
    }

    pub fn handles(&self) -> Vec<String> {
        self.accounts
            .lock()
            .unwrap()
            .iter()
            .map(|account| account.handle.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.accounts.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.lock().unwrap().is_empty()
    }

    fn persist(&self, accounts: &[Account]) -> Result<(), StoreError> {
        let payload = encode_slot(ACCOUNTS_SLOT, &accounts)?;
        self.slots.write_slot(ACCOUNTS_SLOT, &payload)
    }
}
