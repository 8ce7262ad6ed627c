//! Persistent Store
//!
//! Durable key-value storage for the two photo sequences. The store is read
//! once when a gallery opens and afterwards only written, always in full.
//!
//! Keys:
//! - `photos` - JSON array of active records
//! - `deletedPhotos` - JSON array of deleted records, newest first

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{GalleryError, Result};
use crate::fs_utils;
use crate::photo::Photo;

pub const PHOTOS_KEY: &str = "photos";
pub const DELETED_PHOTOS_KEY: &str = "deletedPhotos";

/// String key-value storage in the manner of browser local storage
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// One JSON file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(GalleryError::Storage {
                message: format!("{}: {}", path.display(), e),
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key);
        fs_utils::write_atomic(&path, value).map_err(|e| GalleryError::Storage {
            message: format!("{}: {}", path.display(), e),
        })
    }
}

/// In-memory store; clones share the same map
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw value currently held under `key`
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.raw(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Both photo sequences as loaded from storage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredGallery {
    pub active: Vec<Photo>,
    pub deleted: Vec<Photo>,
}

/// Typed view over a [`KeyValueStore`]
#[derive(Debug, Clone)]
pub struct PhotoStore<S> {
    backend: S,
}

impl<S: KeyValueStore> PhotoStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Load both sequences. Never fails: anything missing or unreadable is empty.
    pub fn load(&self) -> StoredGallery {
        StoredGallery {
            active: self.load_sequence(PHOTOS_KEY),
            deleted: self.load_sequence(DELETED_PHOTOS_KEY),
        }
    }

    /// Persist both sequences in full
    pub fn save(&self, active: &[Photo], deleted: &[Photo]) -> Result<()> {
        self.save_sequence(PHOTOS_KEY, active)?;
        self.save_sequence(DELETED_PHOTOS_KEY, deleted)
    }

    fn load_sequence(&self, key: &str) -> Vec<Photo> {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("Could not read '{}', starting empty: {}", key, e);
                return Vec::new();
            }
        };
        // `null` is what an unset browser key parses to
        match serde_json::from_str::<Option<Vec<Photo>>>(&raw) {
            Ok(photos) => photos.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Malformed '{}' in store, starting empty: {}", key, e);
                Vec::new()
            }
        }
    }

    fn save_sequence(&self, key: &str, photos: &[Photo]) -> Result<()> {
        let json = serde_json::to_string(photos).map_err(|e| GalleryError::Storage {
            message: format!("JSON serialization failed: {}", e),
        })?;
        self.backend.set(key, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_empty_store_loads_empty() {
        let store = PhotoStore::new(MemoryStore::new());
        assert_eq!(store.load(), StoredGallery::default());
    }

    #[test]
    fn test_malformed_values_load_empty() {
        let backend = MemoryStore::new();
        backend.set(PHOTOS_KEY, "{not json").unwrap();
        backend.set(DELETED_PHOTOS_KEY, "null").unwrap();

        let store = PhotoStore::new(backend);
        let loaded = store.load();
        assert!(loaded.active.is_empty());
        assert!(loaded.deleted.is_empty());
    }

    #[test]
    fn test_save_writes_both_keys() {
        let backend = MemoryStore::new();
        let store = PhotoStore::new(backend.clone());
        let a = Photo::new("https://example.com/a.png");
        let b = Photo::new("https://example.com/b.png");

        store.save(&[a.clone()], &[b.clone()]).unwrap();

        let active: Vec<Photo> = serde_json::from_str(&backend.raw(PHOTOS_KEY).unwrap()).unwrap();
        let deleted: Vec<Photo> =
            serde_json::from_str(&backend.raw(DELETED_PHOTOS_KEY).unwrap()).unwrap();
        assert_eq!(active, vec![a]);
        assert_eq!(deleted, vec![b]);
    }

    #[test]
    fn test_file_store_round_trip() {
        let temp = tempdir().unwrap();
        let store = PhotoStore::new(FileStore::new(temp.path().join("data")));
        let a = Photo::new("https://example.com/a.png");

        store.save(&[a.clone()], &[]).unwrap();
        assert!(temp.path().join("data").join("photos.json").exists());
        assert!(temp.path().join("data").join("deletedPhotos.json").exists());

        let reopened = PhotoStore::new(FileStore::new(temp.path().join("data")));
        assert_eq!(reopened.load().active, vec![a]);
    }

    #[test]
    fn test_file_store_reads_legacy_records() {
        let temp = tempdir().unwrap();
        std::fs::write(
            temp.path().join("photos.json"),
            r#"[{"url":"https://example.com/a.png","date":"2024-05-01T10:00:00.000Z"}]"#,
        )
        .unwrap();

        let store = PhotoStore::new(FileStore::new(temp.path()));
        let loaded = store.load();
        assert_eq!(loaded.active.len(), 1);
        assert_eq!(loaded.active[0].url, "https://example.com/a.png");
    }
}
