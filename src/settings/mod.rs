use crate::storage::{decode_slot, encode_slot, SlotStore, StoreError};
use std::sync::Arc;

/// One flat settings record, arbitrary fields. Consumers that want to
/// change a single field load the record, update it and save the whole
/// thing back; the store itself never merges.
pub type SettingsRecord = serde_json::Map<String, serde_json::Value>;

/// Per-user settings blobs, the degenerate case of the persisted
/// collection pattern: the "collection" is a single record, keyed by
/// settings category and user handle. Last write wins, full overwrite.
///
/// Stateless on purpose: every call goes straight to the durable slot, so
/// any number of `SettingsStore` values over the same slots agree.
pub struct SettingsStore {
    slots: Arc<dyn SlotStore>,
}

impl SettingsStore {
    pub fn new(slots: Arc<dyn SlotStore>) -> SettingsStore {
        SettingsStore { slots }
    }

    /// Slot key convention: `{category}_settings_{handle}`, e.g.
    /// `privacy_settings_@alice`.
    fn slot_key(category: &str, handle: &str) -> String {
        format!("{}_settings_{}", category, handle)
    }

    /// Absent or unparseable slot yields an empty record.
    pub fn load(&self, category: &str, handle: &str) -> Result<SettingsRecord, StoreError> {
        decode_slot(self.slots.as_ref(), &Self::slot_key(category, handle))
    }

    /// Overwrites the whole record for this scope.
    pub fn save(
        &self,
        category: &str,
        handle: &str,
        record: &SettingsRecord,
    ) -> Result<(), StoreError> {
        let key = Self::slot_key(category, handle);
        let payload = encode_slot(&key, record)?;
        self.slots.write_slot(&key, &payload)
    }

    pub fn delete(&self, category: &str, handle: &str) -> Result<(), StoreError> {
        self.slots.delete_slot(&Self::slot_key(category, handle))
    }
}
