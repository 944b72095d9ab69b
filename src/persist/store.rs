//! Storage Backends
//!
//! `FileStore` keeps one `<key>.json` file per record under a directory.
//! `MemoryStore` keeps records in a map and can be made read-only to stand
//! in for blocked storage.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{PersistError, Persistence};

/// Directory-backed store.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, PersistError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(PersistError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl Persistence for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(body) => Ok(Some(body)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;

        // Write then rename so a crash never leaves a half-written record.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        debug!(key, bytes = value.len(), path = %path.display(), "record written");
        Ok(())
    }
}

/// In-memory store.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    records: BTreeMap<String, String>,
    read_only: bool,
}

impl MemoryStore {
    /// Empty writable store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose writes always fail.
    pub fn read_only() -> Self {
        Self {
            records: BTreeMap::new(),
            read_only: true,
        }
    }

    /// Store pre-filled with records.
    pub fn with_records<K, V>(records: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            records: records
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            read_only: false,
        }
    }

    /// Switch write failures on or off.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no records are held.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Persistence for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.records.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        if self.read_only {
            return Err(PersistError::ReadOnly);
        }
        self.records.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("halo-store-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = temp_dir();
        let mut store = FileStore::new(&dir);

        assert_eq!(store.get("halo_meta_state_v1").unwrap(), None);
        store.set("halo_meta_state_v1", r#"{"vip":true}"#).unwrap();
        assert_eq!(
            store.get("halo_meta_state_v1").unwrap().as_deref(),
            Some(r#"{"vip":true}"#)
        );
        assert!(dir.join("halo_meta_state_v1.json").exists());
        assert!(!dir.join("halo_meta_state_v1.json.tmp").exists());

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_file_store_rejects_path_keys() {
        let mut store = FileStore::new(temp_dir());
        assert!(matches!(store.get("../etc/passwd"), Err(PersistError::InvalidKey(_))));
        assert!(matches!(store.set("", "x"), Err(PersistError::InvalidKey(_))));
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert!(store.is_empty());
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        assert_eq!(store.len(), 1);

        store.set_read_only(true);
        assert!(matches!(store.set("a", "2"), Err(PersistError::ReadOnly)));
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn test_prefilled_store() {
        let store = MemoryStore::with_records([("halo_state", "{}")]);
        assert_eq!(store.get("halo_state").unwrap().as_deref(), Some("{}"));
    }
}
