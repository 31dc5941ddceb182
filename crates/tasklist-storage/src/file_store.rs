use std::{
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use tasklist_core::storage::{KeyValueStore, StorageError};
use tempfile::NamedTempFile;
use tracing::instrument;

/// File-backed store implementing the shared `KeyValueStore` contract.
/// Each key maps to its own file under `root`; the directory is the scope
/// that browser storage gets from its origin.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    root: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", sanitize_key(key)))
    }
}

impl KeyValueStore for FileKeyValueStore {
    #[instrument(skip_all, fields(key = %key))]
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root).map_err(storage_err)?;
        write_atomic(&self.path_for(key), value)
    }

    #[instrument(skip_all, fields(key = %key))]
    fn get(&self, key: &str) -> Result<String, StorageError> {
        fs::read_to_string(self.path_for(key)).map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                StorageError::NotFound {
                    key: key.to_string(),
                }
            } else {
                storage_err(err)
            }
        })
    }

    #[instrument(skip_all, fields(key = %key))]
    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(_) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(storage_err(err)),
        }
    }
}

/// Write through a temp file in the same directory and rename it over the
/// target, so readers only ever see the old or the new value.
fn write_atomic(path: &Path, value: &str) -> Result<(), StorageError> {
    let parent = path.parent().ok_or_else(|| StorageError::Storage {
        reason: "invalid storage path".to_string(),
    })?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(storage_err)?;
    tmp.write_all(value.as_bytes()).map_err(storage_err)?;
    tmp.flush().map_err(storage_err)?;
    tmp.persist(path).map_err(|e| storage_err(e.error))?;
    Ok(())
}

fn sanitize_key(key: &str) -> String {
    URL_SAFE_NO_PAD.encode(key)
}

fn storage_err<E: ToString>(err: E) -> StorageError {
    StorageError::Storage {
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use tasklist_core::storage::JsonStore;

    use super::*;

    #[test]
    fn round_trip_survives_new_handle() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileKeyValueStore::new(dir.path());
        store.set("tasks", "[]").expect("set");

        let reopened = FileKeyValueStore::new(dir.path());
        assert_eq!(reopened.get("tasks").expect("get"), "[]");
    }

    #[test]
    fn set_creates_missing_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().join("nested").join("tasklist");
        let store = FileKeyValueStore::new(&root);

        store.set("showTaskDates", "false").expect("set");
        assert!(root.is_dir());
        assert_eq!(store.get("showTaskDates").expect("get"), "false");
    }

    #[test]
    fn keys_map_to_distinct_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileKeyValueStore::new(dir.path());
        store.set("showActiveTask", "true").expect("set filter");
        store.set("showTaskDates", "false").expect("set dates");

        assert_ne!(
            store.path_for("showActiveTask"),
            store.path_for("showTaskDates")
        );
        assert_eq!(store.get("showActiveTask").expect("get"), "true");
        assert_eq!(store.get("showTaskDates").expect("get"), "false");
    }

    #[test]
    fn missing_key_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileKeyValueStore::new(dir.path());

        let err = store.get("tasks").expect_err("should be missing");
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[test]
    fn remove_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileKeyValueStore::new(dir.path());
        store.set("k", "v").expect("set");
        store.remove("k").expect("remove");
        store.remove("k").expect("remove again");

        let err = store.get("k").expect_err("should be missing");
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[test]
    fn corrupted_file_falls_back_through_json_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileKeyValueStore::new(dir.path());
        fs::write(store.path_for("showTaskDates"), "{{{").expect("write garbage");

        let json = JsonStore::new(store);
        assert!(json.load("showTaskDates", true));
    }
}
