use super::CollectionEntry;
use crate::events::{ChangeKind, CollectionKind, EventHub, StoreEvent};
use crate::storage::{decode_slot, encode_slot, SlotStore, StoreError};
use chrono::Utc;
use std::sync::{Arc, Mutex};

/// A persisted, ordered, id-unique collection mirrored in full to one
/// durable slot. New entries are prepended, so iteration order is
/// most-recent-first, which is also the display order.
///
/// Every mutation rewrites the whole slot before the in-memory state is
/// updated; when the write fails the typed error is returned and memory
/// stays at the previous state, so memory and disk never diverge.
pub struct CollectionStore {
    slot_key: &'static str,
    kind: CollectionKind,
    slots: Arc<dyn SlotStore>,
    events: Arc<EventHub>,
    entries: Mutex<Vec<CollectionEntry>>,
}

impl CollectionStore {
    /// Rehydrates from the durable slot. An absent or unparseable slot
    /// yields an empty collection; the first write happens on the first
    /// mutation, not here.
    pub fn load(
        slot_key: &'static str,
        kind: CollectionKind,
        slots: Arc<dyn SlotStore>,
        events: Arc<EventHub>,
    ) -> Result<CollectionStore, StoreError> {
        let entries: Vec<CollectionEntry> = decode_slot(slots.as_ref(), slot_key)?;
        Ok(CollectionStore {
            slot_key,
            kind,
            slots,
            events,
            entries: Mutex::new(entries),
        })
    }

    pub fn slot_key(&self) -> &'static str {
        self.slot_key
    }

    /// Flips membership: removes the id if present, prepends it otherwise.
    /// Returns whether the id is a member afterwards.
    pub fn toggle(&self, id: &str) -> Result<bool, StoreError> {
        let mut entries = self.entries.lock().unwrap();
        let mut next = entries.clone();
        let change = match next.iter().position(|entry| entry.id == id) {
            Some(position) => {
                next.remove(position);
                ChangeKind::Removed
            }
            None => {
                next.insert(
                    0,
                    CollectionEntry {
                        id: id.to_owned(),
                        added_at: Utc::now(),
                    },
                );
                ChangeKind::Added
            }
        };
        self.persist(&next)?;
        *entries = next;
        // Subscribers may read the store, so notify without the lock.
        drop(entries);
        self.events.notify(StoreEvent {
            collection: self.kind,
            change,
        });
        Ok(change == ChangeKind::Added)
    }

    /// Prepends the id unless it is already a member. Returns whether the
    /// collection changed; a no-op does not touch the slot.
    pub fn add(&self, id: &str) -> Result<bool, StoreError> {
        let mut entries = self.entries.lock().unwrap();
        if entries.iter().any(|entry| entry.id == id) {
            return Ok(false);
        }
        let mut next = entries.clone();
        next.insert(
            0,
            CollectionEntry {
                id: id.to_owned(),
                added_at: Utc::now(),
            },
        );
        self.persist(&next)?;
        *entries = next;
        drop(entries);
        self.events.notify(StoreEvent {
            collection: self.kind,
            change: ChangeKind::Added,
        });
        Ok(true)
    }

    /// Removes the id if present. Returns whether the collection changed;
    /// a no-op does not touch the slot.
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
            collection: self.kind,
            change: ChangeKind::Removed,
        });
        Ok(true)
    }

    /// Pure membership scan, no side effects.
    pub fn is_member(&self, id: &str) -> bool {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .any(|entry| entry.id == id)
    }

    /// Snapshot of the entries in display order.
    pub fn entries(&self) -> Vec<CollectionEntry> {
        self.entries.lock().unwrap().clone()
    }

    /// Snapshot of the ids in display order.
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

    /// Empties the collection and deletes the durable slot entirely.
    /// Deleting rather than writing `[]` keeps the data directory free of
    /// empty documents; both are equivalent on the next load.
    pub fn clear(&self) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap();
        self.slots.delete_slot(self.slot_key)?;
        entries.clear();
        drop(entries);
        self.events.notify(StoreEvent {
            collection: self.kind,
            change: ChangeKind::Cleared,
        });
        Ok(())
    }

    fn persist(&self, entries: &[CollectionEntry]) -> Result<(), StoreError> {
        let payload = encode_slot(self.slot_key, &entries)?;
        self.slots.write_slot(self.slot_key, &payload)
    }
}
