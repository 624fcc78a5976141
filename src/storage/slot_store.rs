use super::StoreError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

/// A durable, string-keyed slot: the local analog of origin-scoped
/// key/value browser storage. One JSON document per key, full-document
/// replace on every write.
pub trait SlotStore: Send + Sync {
    /// Returns the raw payload for the key.
    /// Returns None if the slot was never written or has been deleted.
    fn read_slot(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replaces the slot content with the given payload.
    fn write_slot(&self, key: &str, payload: &str) -> Result<(), StoreError>;

    /// Deletes the slot entirely. Deleting an absent slot is a no-op.
    fn delete_slot(&self, key: &str) -> Result<(), StoreError>;
}

/// Decodes a slot into `T`. An absent slot yields `T::default()`.
/// An unparseable document is treated as no data: the decoded value falls
/// back to `T::default()` and a warning is logged, the caller never sees
/// a deserialization error. The bad document is left in place until the
/// next write replaces it.
pub fn decode_slot<T>(slots: &dyn SlotStore, key: &str) -> Result<T, StoreError>
where
    T: DeserializeOwned + Default,
{
    match slots.read_slot(key)? {
        None => Ok(T::default()),
        Some(payload) => match serde_json::from_str(&payload) {
            Ok(decoded) => Ok(decoded),
            Err(err) => {
                warn!(
                    "Slot \"{}\" holds an unparseable document, starting empty: {}",
                    key, err
                );
                Ok(T::default())
            }
        },
    }
}

/// Strict variant of [`decode_slot`] for auditing: an absent slot is
/// `None`, an unparseable document is an error instead of a fallback.
pub fn decode_slot_strict<T>(slots: &dyn SlotStore, key: &str) -> Result<Option<T>, StoreError>
where
    T: DeserializeOwned,
{
    match slots.read_slot(key)? {
        None => Ok(None),
        Some(payload) => {
            serde_json::from_str(&payload)
                .map(Some)
                .map_err(|source| StoreError::Deserialization {
                    key: key.to_owned(),
                    source,
                })
        }
    }
}

/// Encodes a value into the JSON payload for a slot.
pub fn encode_slot<T: Serialize>(key: &str, value: &T) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(|source| StoreError::Serialization {
        key: key.to_owned(),
        source,
    })
}

pub(crate) fn check_quota(
    key: &str,
    payload: &str,
    quota: Option<usize>,
) -> Result<(), StoreError> {
    if let Some(quota) = quota {
        if payload.len() > quota {
            return Err(StoreError::QuotaExceeded {
                key: key.to_owned(),
                size: payload.len(),
                quota,
            });
        }
    }
    Ok(())
}
