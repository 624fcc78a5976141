use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One membership entry. Collections persist identifiers only; the
/// canonical video or channel is resolved against the catalog at render
/// time, so a title change never leaves stale copies behind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CollectionEntry {
    pub id: String,
    pub added_at: DateTime<Utc>,
}

/// A watch-history entry. Re-watching bumps the entry to the front with a
/// fresh timestamp instead of duplicating it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub watched_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    pub video_ids: Vec<String>,
}
