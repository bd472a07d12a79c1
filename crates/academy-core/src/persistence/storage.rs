//! String key-value storage backends.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::{Error, Result};

/// Minimal string key-value store, shaped like browser local storage.
pub trait KeyValueStorage: Send + Sync {
    /// Read the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be modified.
    fn remove_item(&self, key: &str) -> Result<()>;
}

/// In-process storage with an optional byte quota.
///
/// Clones share the same map, so two stores built over clones of one
/// `MemoryStorage` behave like two views of the same local storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Arc<Mutex<HashMap<String, String>>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    /// Create an empty, unbounded storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty storage that rejects any single value larger than
    /// `limit` bytes.
    #[must_use]
    pub fn with_quota(limit: usize) -> Self {
        Self {
            quota: Some(limit),
            ..Self::default()
        }
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        if let Some(limit) = self.quota
            && value.len() > limit
        {
            return Err(Error::QuotaExceeded {
                key: key.to_string(),
                limit,
            });
        }
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.remove(key);
        Ok(())
    }
}

/// Directory-backed storage: one `<key>.json` file per key.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Store files under `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory the files live in.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{file_name}.json"))
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        // Write beside the target and rename so readers never see half a file.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        match std::fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "academy-core-storage-{}-{name}",
            std::process::id()
        ))
    }

    mod memory_tests {
        use super::*;

        #[test]
        fn set_get_remove() {
            let storage = MemoryStorage::new();
            assert_eq!(storage.get_item("k").unwrap(), None);

            storage.set_item("k", "v").unwrap();
            assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("v"));

            storage.remove_item("k").unwrap();
            assert_eq!(storage.get_item("k").unwrap(), None);
            assert!(storage.is_empty());
        }

        #[test]
        fn clones_share_items() {
            let storage = MemoryStorage::new();
            let other = storage.clone();
            storage.set_item("k", "v").unwrap();
            assert_eq!(other.get_item("k").unwrap().as_deref(), Some("v"));
        }

        #[test]
        fn quota_rejects_large_values() {
            let storage = MemoryStorage::with_quota(4);
            storage.set_item("k", "1234").unwrap();

            let err = storage.set_item("k", "12345").unwrap_err();
            assert!(matches!(err, Error::QuotaExceeded { limit: 4, .. }));
            assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("1234"));
        }
    }

    mod file_tests {
        use super::*;

        #[test]
        fn set_get_remove() {
            let dir = scratch_dir("roundtrip");
            let storage = FileStorage::new(&dir);

            assert_eq!(storage.get_item("academy.inquiries").unwrap(), None);
            storage.set_item("academy.inquiries", "[]").unwrap();
            assert_eq!(
                storage.get_item("academy.inquiries").unwrap().as_deref(),
                Some("[]")
            );
            assert!(dir.join("academy.inquiries.json").exists());

            storage.remove_item("academy.inquiries").unwrap();
            assert_eq!(storage.get_item("academy.inquiries").unwrap(), None);
            storage.remove_item("academy.inquiries").unwrap();

            std::fs::remove_dir_all(&dir).ok();
        }

        #[test]
        fn keys_cannot_escape_directory() {
            let storage = FileStorage::new("/srv/academy");
            assert_eq!(
                storage.path_for("../etc/passwd"),
                PathBuf::from("/srv/academy/.._etc_passwd.json")
            );
        }
    }
}
