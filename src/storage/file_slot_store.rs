use super::slot_store::check_quota;
use super::{SlotStore, StoreError};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// File-backed slot storage: one `<key>.json` document per slot under the
/// data directory. Writes go through a temp file in the same directory and
/// are renamed into place, so a torn write can never corrupt a slot.
pub struct FileSlotStore {
    dir: PathBuf,
    slot_quota_bytes: Option<usize>,
}

impl FileSlotStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<FileSlotStore, StoreError> {
        Self::with_quota(dir, None)
    }

    /// `slot_quota_bytes` caps the payload size of a single slot; an
    /// oversized write fails with [`StoreError::QuotaExceeded`] and leaves
    /// the slot untouched.
    pub fn with_quota<P: AsRef<Path>>(
        dir: P,
        slot_quota_bytes: Option<usize>,
    ) -> Result<FileSlotStore, StoreError> {
        let dir = dir.as_ref().to_owned();
        fs::create_dir_all(&dir)
            .map_err(|source| StoreError::io(&dir.display().to_string(), source))?;
        Ok(FileSlotStore {
            dir,
            slot_quota_bytes,
        })
    }

    /// Keys name a flat namespace, never a path: anything that could
    /// traverse out of the data directory is rejected up front.
    fn slot_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        if key.is_empty() || key.contains(['/', '\\']) || key.contains("..") {
            return Err(StoreError::InvalidKey {
                key: key.to_owned(),
            });
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl SlotStore for FileSlotStore {
    fn read_slot(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.slot_path(key)?) {
            Ok(payload) => Ok(Some(payload)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoreError::io(key, err)),
        }
    }

    fn write_slot(&self, key: &str, payload: &str) -> Result<(), StoreError> {
        let path = self.slot_path(key)?;
        check_quota(key, payload, self.slot_quota_bytes)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)
            .map_err(|source| StoreError::io(key, source))?;
        tmp.write_all(payload.as_bytes())
            .map_err(|source| StoreError::io(key, source))?;
        tmp.persist(path)
            .map_err(|err| StoreError::io(key, err.error))?;
        Ok(())
    }

    fn delete_slot(&self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.slot_path(key)?) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StoreError::io(key, err)),
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use tempfile::TempDir;

    fn create_tmp_store() -> (FileSlotStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSlotStore::new(temp_dir.path()).unwrap();
        (store, temp_dir)
    }

    #[test]
    fn reads_back_what_was_written() {
        let (store, _temp_dir) = create_tmp_store();

        assert!(store.read_slot("likedVideos").unwrap().is_none());

        store.write_slot("likedVideos", "[{\"id\":\"1\"}]").unwrap();
        assert_eq!(
            store.read_slot("likedVideos").unwrap().unwrap(),
            "[{\"id\":\"1\"}]"
        );
    }

    #[test]
    fn write_replaces_whole_document() {
        let (store, _temp_dir) = create_tmp_store();

        store.write_slot("user", "{\"handle\":\"@alice\"}").unwrap();
        store.write_slot("user", "{\"handle\":\"@bob\"}").unwrap();

        assert_eq!(
            store.read_slot("user").unwrap().unwrap(),
            "{\"handle\":\"@bob\"}"
        );
    }

    #[test]
    fn delete_removes_slot_and_is_idempotent() {
        let (store, _temp_dir) = create_tmp_store();

        store.write_slot("watchHistory", "[]").unwrap();
        store.delete_slot("watchHistory").unwrap();
        assert!(store.read_slot("watchHistory").unwrap().is_none());

        // Deleting again is fine.
        store.delete_slot("watchHistory").unwrap();
    }

    #[test]
    fn survives_reopening_the_directory() {
        let temp_dir = TempDir::new().unwrap();
        {
            let store = FileSlotStore::new(temp_dir.path()).unwrap();
            store.write_slot("subscribedChannels", "[\"c1\"]").unwrap();
        }

        let reopened = FileSlotStore::new(temp_dir.path()).unwrap();
        assert_eq!(
            reopened.read_slot("subscribedChannels").unwrap().unwrap(),
            "[\"c1\"]"
        );
    }

    #[test]
    fn keys_that_leave_the_data_dir_are_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().join("slots");
        let store = FileSlotStore::new(&data_dir).unwrap();

        let result = store.write_slot("../escaped", "oops");
        assert!(matches!(result, Err(StoreError::InvalidKey { .. })));
        assert!(!temp_dir.path().join("escaped.json").exists());

        assert!(matches!(
            store.read_slot("a/b"),
            Err(StoreError::InvalidKey { .. })
        ));
        assert!(matches!(
            store.delete_slot("..\\up"),
            Err(StoreError::InvalidKey { .. })
        ));
        assert!(matches!(
            store.write_slot("", "x"),
            Err(StoreError::InvalidKey { .. })
        ));
    }

    #[test]
    fn oversized_write_fails_and_leaves_slot_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSlotStore::with_quota(temp_dir.path(), Some(16)).unwrap();

        store.write_slot("likedVideos", "[\"v1\"]").unwrap();

        let result = store.write_slot("likedVideos", &"x".repeat(64));
        assert!(matches!(
            result,
            Err(StoreError::QuotaExceeded { size: 64, .. })
        ));
        assert_eq!(
            store.read_slot("likedVideos").unwrap().unwrap(),
            "[\"v1\"]"
        );
    }
}
