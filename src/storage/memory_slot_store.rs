use super::slot_store::check_quota;
use super::{SlotStore, StoreError};
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory slot storage with the same contract as [`super::FileSlotStore`].
/// Nothing survives the process; meant for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemorySlotStore {
    slots: Mutex<HashMap<String, String>>,
    slot_quota_bytes: Option<usize>,
}

impl MemorySlotStore {
    pub fn new() -> MemorySlotStore {
        MemorySlotStore::default()
    }

    pub fn with_quota(slot_quota_bytes: Option<usize>) -> MemorySlotStore {
        MemorySlotStore {
            slots: Mutex::new(HashMap::new()),
            slot_quota_bytes,
        }
    }

    pub fn slot_count(&self) -> usize {
        self.slots.lock().unwrap().len()
    }
}

impl SlotStore for MemorySlotStore {
    fn read_slot(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.slots.lock().unwrap().get(key).cloned())
    }

    fn write_slot(&self, key: &str, payload: &str) -> Result<(), StoreError> {
        check_quota(key, payload, self.slot_quota_bytes)?;
        self.slots
            .lock()
            .unwrap()
            .insert(key.to_owned(), payload.to_owned());
        Ok(())
    }

    fn delete_slot(&self, key: &str) -> Result<(), StoreError> {
        self.slots.lock().unwrap().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn behaves_like_a_slot_store() {
        let store = MemorySlotStore::new();

        assert!(store.read_slot("user").unwrap().is_none());
        store.write_slot("user", "{}").unwrap();
        assert_eq!(store.read_slot("user").unwrap().unwrap(), "{}");
        assert_eq!(store.slot_count(), 1);

        store.delete_slot("user").unwrap();
        assert!(store.read_slot("user").unwrap().is_none());
    }

    #[test]
    fn enforces_quota() {
        let store = MemorySlotStore::with_quota(Some(8));

        store.write_slot("k", "12345678").unwrap();
        let result = store.write_slot("k", "123456789");
        assert!(matches!(result, Err(StoreError::QuotaExceeded { .. })));
        assert_eq!(store.read_slot("k").unwrap().unwrap(), "12345678");
    }
}
