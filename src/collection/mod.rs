mod history;
mod models;
mod playlists;
mod store;

pub use history::HistoryStore;
pub use models::{CollectionEntry, HistoryEntry, Playlist};
pub use playlists::PlaylistStore;
pub use store::CollectionStore;

/// Fixed slot keys, one per concern. Stores with the same key share the
/// same durable slot, so these never change once shipped.
pub const LIKED_VIDEOS_SLOT: &str = "likedVideos";
pub const WATCH_LATER_SLOT: &str = "watchLaterVideos";
pub const WATCH_HISTORY_SLOT: &str = "watchHistory";
pub const SUBSCRIBED_CHANNELS_SLOT: &str = "subscribedChannels";
pub const USER_PLAYLISTS_SLOT: &str = "user_playlists";
