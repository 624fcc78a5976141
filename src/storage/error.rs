use thiserror::Error;

/// Errors surfaced by durable slot operations.
///
/// Mutating operations propagate these to the caller instead of silently
/// degrading, so a consumer can skip its optimistic update and tell the user.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error on slot \"{key}\": {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode slot \"{key}\": {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Slot \"{key}\" holds an unparseable document: {source}")]
    Deserialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Slot key \"{key}\" is not a plain name")]
    InvalidKey { key: String },

    #[error("Slot \"{key}\" payload is {size} bytes, quota is {quota} bytes")]
    QuotaExceeded {
        key: String,
        size: usize,
        quota: usize,
    },
}

impl StoreError {
    pub fn io(key: &str, source: std::io::Error) -> StoreError {
        StoreError::Io {
            key: key.to_owned(),
            source,
        }
    }
}
