use serde::{Deserialize, Serialize};

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Channel {
    pub id: String,
    pub handle: String,
    pub name: String,
    pub subscriber_count: u64,
    pub avatar: Option<String>,
}
