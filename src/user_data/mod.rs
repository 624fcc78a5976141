//! Aggregate wiring for one user's persisted collections.
//!
//! Built once at startup from a [`SlotStore`] and passed down to
//! consumers; there are no module-level globals. All stores share one
//! [`EventHub`], so a consumer can subscribe in one place and re-render
//! whatever changed.

use crate::catalog::{Resolver, Video};
use crate::collection::{
    CollectionEntry, CollectionStore, HistoryEntry, HistoryStore, Playlist, PlaylistStore,
    LIKED_VIDEOS_SLOT, SUBSCRIBED_CHANNELS_SLOT, USER_PLAYLISTS_SLOT, WATCH_HISTORY_SLOT,
    WATCH_LATER_SLOT,
};
use crate::events::{CollectionKind, EventHub, StoreEvent, SubscriptionId};
use crate::session::{Account, SessionRecord, ACCOUNTS_SLOT, SESSION_SLOT};
use crate::storage::{decode_slot_strict, SlotStore, StoreError};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Default retention cap for the watch history.
pub const DEFAULT_HISTORY_MAX_ENTRIES: usize = 1000;

pub struct UserData {
    pub liked_videos: CollectionStore,
    pub watch_later: CollectionStore,
    pub subscriptions: CollectionStore,
    pub history: HistoryStore,
    pub playlists: PlaylistStore,
    events: Arc<EventHub>,
}

impl UserData {
    pub fn load(slots: Arc<dyn SlotStore>) -> Result<UserData, StoreError> {
        Self::load_with_history_cap(slots, Some(DEFAULT_HISTORY_MAX_ENTRIES))
    }

    pub fn load_with_history_cap(
        slots: Arc<dyn SlotStore>,
        history_max_entries: Option<usize>,
    ) -> Result<UserData, StoreError> {
        let events = Arc::new(EventHub::new());
        Ok(UserData {
            liked_videos: CollectionStore::load(
                LIKED_VIDEOS_SLOT,
                CollectionKind::LikedVideos,
                slots.clone(),
                events.clone(),
            )?,
            watch_later: CollectionStore::load(
                WATCH_LATER_SLOT,
                CollectionKind::WatchLater,
                slots.clone(),
                events.clone(),
            )?,
            subscriptions: CollectionStore::load(
                SUBSCRIBED_CHANNELS_SLOT,
                CollectionKind::Subscriptions,
                slots.clone(),
                events.clone(),
            )?,
            history: HistoryStore::load(slots.clone(), events.clone(), history_max_entries)?,
            playlists: PlaylistStore::load(slots, events.clone())?,
            events,
        })
    }

    pub fn subscribe<F>(&self, subscriber: F) -> SubscriptionId
    where
        F: Fn(&StoreEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(subscriber)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Resolves the liked-videos collection for rendering, dropping stale
    /// ids silently (they show up in [`Self::stale_references`]).
    pub fn resolved_liked_videos<'a>(&self, resolver: &'a dyn Resolver) -> Vec<&'a Video> {
        resolve_videos(&self.liked_videos.ids(), resolver)
    }

    pub fn resolved_watch_later<'a>(&self, resolver: &'a dyn Resolver) -> Vec<&'a Video> {
        resolve_videos(&self.watch_later.ids(), resolver)
    }

    pub fn resolved_history<'a>(&self, resolver: &'a dyn Resolver) -> Vec<&'a Video> {
        resolve_videos(&self.history.ids(), resolver)
    }

    /// Reports every stored id that no longer resolves against the
    /// canonical source. These are leftovers from catalog changes, not
    /// errors; a consumer may prune or just skip them.
    pub fn stale_references(&self, resolver: &dyn Resolver) -> StaleReferences {
        let stale_videos = |ids: Vec<String>| -> Vec<String> {
            ids.into_iter()
                .filter(|id| resolver.resolve_video(id).is_none())
                .collect()
        };

        let playlist_videos = self
            .playlists
            .playlists()
            .into_iter()
            .flat_map(|playlist| playlist.video_ids)
            .filter(|id| resolver.resolve_video(id).is_none())
            .collect();

        StaleReferences {
            liked_videos: stale_videos(self.liked_videos.ids()),
            watch_later: stale_videos(self.watch_later.ids()),
            history: stale_videos(self.history.ids()),
            subscriptions: self
                .subscriptions
                .ids()
                .into_iter()
                .filter(|id| resolver.resolve_channel(id).is_none())
                .collect(),
            playlist_videos,
        }
    }
}

fn resolve_videos<'a>(ids: &[String], resolver: &'a dyn Resolver) -> Vec<&'a Video> {
    ids.iter()
        .filter_map(|id| resolver.resolve_video(id))
        .collect()
}

/// Strictly re-parses every fixed slot. Loading never fails on a bad
/// document (it falls back to empty with a warning); this is the audit
/// counterpart that surfaces those documents instead of hiding them.
pub fn unparseable_slots(slots: &dyn SlotStore) -> Vec<StoreError> {
    fn check<T: DeserializeOwned>(slots: &dyn SlotStore, key: &str, out: &mut Vec<StoreError>) {
        if let Err(err) = decode_slot_strict::<T>(slots, key) {
            out.push(err);
        }
    }

    let mut out = Vec::new();
    check::<Vec<CollectionEntry>>(slots, LIKED_VIDEOS_SLOT, &mut out);
    check::<Vec<CollectionEntry>>(slots, WATCH_LATER_SLOT, &mut out);
    check::<Vec<CollectionEntry>>(slots, SUBSCRIBED_CHANNELS_SLOT, &mut out);
    check::<Vec<HistoryEntry>>(slots, WATCH_HISTORY_SLOT, &mut out);
    check::<Vec<Playlist>>(slots, USER_PLAYLISTS_SLOT, &mut out);
    check::<SessionRecord>(slots, SESSION_SLOT, &mut out);
    check::<Vec<Account>>(slots, ACCOUNTS_SLOT, &mut out);
    out
}

#[derive(Debug, Default)]
pub struct StaleReferences {
    pub liked_videos: Vec<String>,
    pub watch_later: Vec<String>,
    pub history: Vec<String>,
    pub subscriptions: Vec<String>,
    pub playlist_videos: Vec<String>,
}

impl StaleReferences {
    pub fn total(&self) -> usize {
        self.liked_videos.len()
            + self.watch_later.len()
            + self.history.len()
            + self.subscriptions.len()
            + self.playlist_videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}
