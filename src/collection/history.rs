use super::{HistoryEntry, WATCH_HISTORY_SLOT};
use crate::events::{ChangeKind, CollectionKind, EventHub, StoreEvent};
use crate::storage::{decode_slot, encode_slot, SlotStore, StoreError};
use chrono::Utc;
use std::sync::{Arc, Mutex};

/// The watch-history collection. Same persistence contract as
/// [`super::CollectionStore`], with one twist: recording an id that is
/// already present bumps it to the front with a fresh `watched_at` instead
/// of duplicating it.
pub struct HistoryStore {
    slots: Arc<dyn SlotStore>,
    events: Arc<EventHub>,
    max_entries: Option<usize>,
    entries: Mutex<Vec<HistoryEntry>>,
}

impl HistoryStore {
    pub fn load(
        slots: Arc<dyn SlotStore>,
        events: Arc<EventHub>,
        max_entries: Option<usize>,
    ) -> Result<HistoryStore, StoreError> {
        let entries: Vec<HistoryEntry> = decode_slot(slots.as_ref(), WATCH_HISTORY_SLOT)?;
        Ok(HistoryStore {
            slots,
            events,
            max_entries,
            entries: Mutex::new(entries),
        })
    }

    /// Records a watch. The entry lands at the front; when the history
    /// exceeds `max_entries` the oldest entries are dropped on the same
    /// write.
    pub fn record(&self, id: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap();
        let mut next = entries.clone();
        let bumped = match next.iter().position(|entry| entry.id == id) {
            Some(position) => {
                next.remove(position);
                true
            }
            None => false,
        };
        next.insert(
            0,
            HistoryEntry {
                id: id.to_owned(),
                watched_at: Utc::now(),
            },
        );
        if let Some(max_entries) = self.max_entries {
            next.truncate(max_entries);
        }
        self.persist(&next)?;
        *entries = next;
        drop(entries);
        self.events.notify(StoreEvent {
            collection: CollectionKind::WatchHistory,
            change: if bumped {
                ChangeKind::Updated
            } else {
                ChangeKind::Added
            },
        });
        Ok(())
    }

    /// Removes one entry, e.g. "remove from history" on a watch page.
    /// Returns whether the history changed.
    pub fn remove(&self, id: &str) -> Result<bool, StoreError> {
        let mut entries = self.entries.lock().unwrap();
        let Some(position) = entries.iter().position(|entry| entry.id == id) else {
            return Ok(false);
        };
        let mut next = entries.clone();
        next.remove(position);
        self.persist(&next)?;
        *entries = next;
        drop(entries);
        self.events.notify(StoreEvent {
            collection: CollectionKind::WatchHistory,
            change: ChangeKind::Removed,
        });
        Ok(true)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .any(|entry| entry.id == id)
    }

    /// Snapshot, most recently watched first.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries.lock().unwrap().clone()
    }

    pub fn ids(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .map(|entry| entry.id.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap();
        self.slots.delete_slot(WATCH_HISTORY_SLOT)?;
        entries.clear();
        drop(entries);
        self.events.notify(StoreEvent {
            collection: CollectionKind::WatchHistory,
            change: ChangeKind::Cleared,
        });
        Ok(())
    }

    fn persist(&self, entries: &[HistoryEntry]) -> Result<(), StoreError> {
        let payload = encode_slot(WATCH_HISTORY_SLOT, &entries)?;
        self.slots.write_slot(WATCH_HISTORY_SLOT, &payload)
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::storage::MemorySlotStore;

    fn create_store(slots: Arc<dyn SlotStore>, max_entries: Option<usize>) -> HistoryStore {
        HistoryStore::load(slots, Arc::new(EventHub::new()), max_entries).unwrap()
    }

    #[test]
    fn records_most_recent_first() {
        let store = create_store(Arc::new(MemorySlotStore::new()), None);

        store.record("v1").unwrap();
        store.record("v2").unwrap();
        store.record("v3").unwrap();

        assert_eq!(store.ids(), vec!["v3", "v2", "v1"]);
    }

    #[test]
    fn rewatching_bumps_without_duplicating() {
        let store = create_store(Arc::new(MemorySlotStore::new()), None);

        store.record("v1").unwrap();
        store.record("v2").unwrap();
        let first_watched = store.entries().last().unwrap().watched_at;

        store.record("v1").unwrap();

        assert_eq!(store.ids(), vec!["v1", "v2"]);
        assert_eq!(store.len(), 2);
        let bumped = &store.entries()[0];
        assert_eq!(bumped.id, "v1");
        assert!(bumped.watched_at >= first_watched);
    }

    #[test]
    fn retention_cap_drops_oldest() {
        let store = create_store(Arc::new(MemorySlotStore::new()), Some(3));

        for id in ["v1", "v2", "v3", "v4"] {
            store.record(id).unwrap();
        }

        assert_eq!(store.ids(), vec!["v4", "v3", "v2"]);
    }

    #[test]
    fn survives_reload() {
        let slots: Arc<dyn SlotStore> = Arc::new(MemorySlotStore::new());
        {
            let store = create_store(slots.clone(), None);
            store.record("v1").unwrap();
            store.record("v2").unwrap();
        }

        let reloaded = create_store(slots, None);
        assert_eq!(reloaded.ids(), vec!["v2", "v1"]);
        assert!(reloaded.contains("v1"));
    }

    #[test]
    fn remove_and_clear() {
        let slots: Arc<dyn SlotStore> = Arc::new(MemorySlotStore::new());
        let store = create_store(slots.clone(), None);
        store.record("v1").unwrap();
        store.record("v2").unwrap();

        assert!(store.remove("v1").unwrap());
        assert!(!store.remove("v1").unwrap());
        assert_eq!(store.ids(), vec!["v2"]);

        store.clear().unwrap();
        assert!(store.is_empty());
        assert!(slots.read_slot(WATCH_HISTORY_SLOT).unwrap().is_none());
    }
}
