use super::{Playlist, USER_PLAYLISTS_SLOT};
use crate::events::{ChangeKind, CollectionKind, EventHub, StoreEvent};
use crate::storage::{decode_slot, encode_slot, SlotStore, StoreError};
use anyhow::{bail, Result};
use chrono::Utc;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// User playlists, persisted as one ordered collection in the
/// `user_playlists` slot. Playlists are id-unique, newest-first; video ids
/// inside one playlist are unique and keep their curated append order.
pub struct PlaylistStore {
    slots: Arc<dyn SlotStore>,
    events: Arc<EventHub>,
    playlists: Mutex<Vec<Playlist>>,
}

impl PlaylistStore {
    pub fn load(slots: Arc<dyn SlotStore>, events: Arc<EventHub>) -> Result<PlaylistStore, StoreError> {
        let playlists: Vec<Playlist> = decode_slot(slots.as_ref(), USER_PLAYLISTS_SLOT)?;
        Ok(PlaylistStore {
            slots,
            events,
            playlists: Mutex::new(playlists),
        })
    }

    pub fn create_playlist(&self, name: &str) -> Result<Playlist, StoreError> {
        let now = Utc::now();
        let playlist = Playlist {
            id: Uuid::new_v4().to_string(),
            name: name.to_owned(),
            created: now,
            modified: now,
            video_ids: vec![],
        };

        let mut playlists = self.playlists.lock().unwrap();
        let mut next = playlists.clone();
        next.insert(0, playlist.clone());
        self.persist(&next)?;
        *playlists = next;
        drop(playlists);
        self.notify(ChangeKind::Added);
        Ok(playlist)
    }

    pub fn rename_playlist(&self, playlist_id: &str, name: &str) -> Result<()> {
        let mut playlists = self.playlists.lock().unwrap();
        let mut next = playlists.clone();
        let Some(playlist) = next.iter_mut().find(|playlist| playlist.id == playlist_id) else {
            bail!("No playlist with id {}", playlist_id);
        };
        playlist.name = name.to_owned();
        playlist.modified = Utc::now();
        self.persist(&next)?;
        *playlists = next;
        drop(playlists);
        self.notify(ChangeKind::Updated);
        Ok(())
    }

    pub fn delete_playlist(&self, playlist_id: &str) -> Result<()> {
        let mut playlists = self.playlists.lock().unwrap();
        let Some(position) = playlists
            .iter()
            .position(|playlist| playlist.id == playlist_id)
        else {
            bail!("No playlist with id {}", playlist_id);
        };
        let mut next = playlists.clone();
        next.remove(position);
        self.persist(&next)?;
        *playlists = next;
        drop(playlists);
        self.notify(ChangeKind::Removed);
        Ok(())
    }

    /// Appends a video to the playlist. Returns false when the video is
    /// already in it, without touching the slot.
    pub fn add_video(&self, playlist_id: &str, video_id: &str) -> Result<bool> {
        let mut playlists = self.playlists.lock().unwrap();
        let mut next = playlists.clone();
        let Some(playlist) = next.iter_mut().find(|playlist| playlist.id == playlist_id) else {
            bail!("No playlist with id {}", playlist_id);
        };
        if playlist.video_ids.iter().any(|id| id == video_id) {
            return Ok(false);
        }
        playlist.video_ids.push(video_id.to_owned());
        playlist.modified = Utc::now();
        self.persist(&next)?;
        *playlists = next;
        drop(playlists);
        self.notify(ChangeKind::Updated);
        Ok(true)
    }

    /// Removes a video from the playlist. Returns false when it was not in
    /// it, without touching the slot.
    pub fn remove_video(&self, playlist_id: &str, video_id: &str) -> Result<bool> {
        let mut playlists = self.playlists.lock().unwrap();
        let mut next = playlists.clone();
        let Some(playlist) = next.iter_mut().find(|playlist| playlist.id == playlist_id) else {
            bail!("No playlist with id {}", playlist_id);
        };
        let Some(position) = playlist.video_ids.iter().position(|id| id == video_id) else {
            return Ok(false);
        };
        playlist.video_ids.remove(position);
        playlist.modified = Utc::now();
        self.persist(&next)?;
        *playlists = next;
        drop(playlists);
        self.notify(ChangeKind::Updated);
        Ok(true)
    }

    pub fn get_playlist(&self, playlist_id: &str) -> Option<Playlist> {
        self.playlists
            .lock()
            .unwrap()
            .iter()
            .find(|playlist| playlist.id == playlist_id)
            .cloned()
    }

    /// Snapshot in display order, newest-first.
    pub fn playlists(&self) -> Vec<Playlist> {
        self.playlists.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.playlists.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.playlists.lock().unwrap().is_empty()
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        let mut playlists = self.playlists.lock().unwrap();
        self.slots.delete_slot(USER_PLAYLISTS_SLOT)?;
        playlists.clear();
        drop(playlists);
        self.notify(ChangeKind::Cleared);
        Ok(())
    }

    fn persist(&self, playlists: &[Playlist]) -> Result<(), StoreError> {
        let payload = encode_slot(USER_PLAYLISTS_SLOT, &playlists)?;
        self.slots.write_slot(USER_PLAYLISTS_SLOT, &payload)
    }

    fn notify(&self, change: ChangeKind) {
        self.events.notify(StoreEvent {
            collection: CollectionKind::Playlists,
            change,
        });
    }
}
