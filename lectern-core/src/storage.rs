//! Key-value persistence for the enrollment blob
//!
//! The tracker persists a single string value under a fixed key, the way a
//! browser profile keeps one local-storage entry. [`FileStore`] keeps one
//! file per key on disk; [`MemoryStore`] keeps entries in memory.

use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{Result, TrackerError};

/// String key-value storage
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    fn remove(&mut self, key: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// In-memory storage, used for ephemeral sessions and tests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an entry, e.g. a blob written by an earlier session
    pub fn with_entry(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Directory-backed storage: each key is a `<key>.json` file
///
/// Writes go to a temporary file in the same directory and are renamed into
/// place, so a crash never leaves a half-written blob behind.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key.chars().all(|c| {
                c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
            })
            && !key.starts_with('.');
        if !valid {
            return Err(TrackerError::storage(
                key,
                "key is not a valid file name",
            ));
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let mut temp_file = NamedTempFile::new_in(&self.root)?;
        temp_file.write_all(value.as_bytes())?;
        temp_file.flush()?;
        temp_file
            .persist(&path)
            .map_err(|err| TrackerError::Io(err.error))?;
        debug!(
            key,
            path = %path.display(),
            bytes = value.len(),
            "persisted entry"
        );
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_round_trips_and_removes() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("profile")).unwrap();

        assert_eq!(store.get("enrolledCourses").unwrap(), None);
        store.set("enrolledCourses", "{\"a\":1}").unwrap();
        assert_eq!(
            store.get("enrolledCourses").unwrap().as_deref(),
            Some("{\"a\":1}")
        );

        store.set("enrolledCourses", "{}").unwrap();
        let stored = store.get("enrolledCourses").unwrap();
        assert_eq!(stored.as_deref(), Some("{}"));

        store.remove("enrolledCourses").unwrap();
        store.remove("enrolledCourses").unwrap();
        assert_eq!(store.get("enrolledCourses").unwrap(), None);
    }

    #[test]
    fn file_store_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path()).unwrap();

        assert!(matches!(
            store.set("../escape", "x"),
            Err(TrackerError::Storage { .. })
        ));
        assert!(store.get("").is_err());
    }

    #[test]
    fn memory_store_seeding() {
        let store = MemoryStore::new().with_entry("k", "v");
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        assert_eq!(store.len(), 1);
    }
}
