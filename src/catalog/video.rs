use serde::{Deserialize, Serialize};

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Video {
    pub id: String,
    pub title: String,
    pub channel_id: String,
    pub duration_sec: u32,
    pub upload_date: i64,
    pub is_short: bool,
    pub view_count: u64,
    pub tags: Vec<String>,
}
