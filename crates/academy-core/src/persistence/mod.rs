//! Best-effort mirroring of the inquiry snapshot to local storage.
//!
//! The store asks its adapter for a cached collection once, at
//! initialization, and hands it every new snapshot afterwards. Adapter errors
//! never reach store callers: the store logs and discards them.

mod storage;

pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};

use tracing::debug;

use crate::Result;
use crate::inquiry::InquiryRecord;

/// Storage key the collection lives under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "academy.inquiries";

/// Mirrors snapshots into durable storage.
pub trait PersistenceAdapter: Send + Sync {
    /// Short name for log output.
    fn name(&self) -> &'static str;

    /// Read the cached collection, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read or the cached value is
    /// not a valid collection.
    fn load(&self) -> Result<Option<Vec<InquiryRecord>>>;

    /// Replace the cached collection.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the backend rejects the write.
    fn save(&self, records: &[InquiryRecord]) -> Result<()>;
}

/// Adapter that caches nothing; demo data stays deterministic.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAdapter;

impl PersistenceAdapter for NullAdapter {
    fn name(&self) -> &'static str {
        "null"
    }

    fn load(&self) -> Result<Option<Vec<InquiryRecord>>> {
        Ok(None)
    }

    fn save(&self, _records: &[InquiryRecord]) -> Result<()> {
        Ok(())
    }
}

/// Adapter storing the whole collection as one JSON array under one key.
///
/// The format is not versioned; a shape change needs a manual migration.
#[derive(Debug, Clone)]
pub struct KeyValueAdapter<S> {
    storage: S,
    key: String,
}

impl<S: KeyValueStorage> KeyValueAdapter<S> {
    /// Create an adapter using [`DEFAULT_STORAGE_KEY`].
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, DEFAULT_STORAGE_KEY)
    }

    /// Create an adapter writing under `key`.
    #[must_use]
    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// The storage key in use.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The underlying storage.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }
}

impl<S: KeyValueStorage> PersistenceAdapter for KeyValueAdapter<S> {
    fn name(&self) -> &'static str {
        "key-value"
    }

    fn load(&self) -> Result<Option<Vec<InquiryRecord>>> {
        let Some(raw) = self.storage.get_item(&self.key)? else {
            return Ok(None);
        };
        let records: Vec<InquiryRecord> = serde_json::from_str(&raw)?;
        debug!(key = %self.key, count = records.len(), "Loaded cached inquiries");
        Ok(Some(records))
    }

    fn save(&self, records: &[InquiryRecord]) -> Result<()> {
        let raw = serde_json::to_string(records)?;
        self.storage.set_item(&self.key, &raw)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::inquiry::seed_inquiries;

    #[test]
    fn null_adapter_never_has_data() {
        let adapter = NullAdapter;
        adapter.save(&seed_inquiries()).unwrap();
        assert!(adapter.load().unwrap().is_none());
    }

    #[test]
    fn key_value_adapter_round_trips_collection() {
        let adapter = KeyValueAdapter::new(MemoryStorage::new());
        assert!(adapter.load().unwrap().is_none());

        let records = seed_inquiries();
        adapter.save(&records).unwrap();
        assert_eq!(adapter.load().unwrap(), Some(records));
    }

    #[test]
    fn key_value_adapter_writes_one_json_array_under_its_key() {
        let storage = MemoryStorage::new();
        let adapter = KeyValueAdapter::with_key(storage.clone(), "inquiries");
        adapter.save(&seed_inquiries()).unwrap();

        let raw = storage.get_item("inquiries").unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let array = value.as_array().unwrap();
        assert_eq!(array.len(), seed_inquiries().len());
        assert_eq!(array[0]["id"], "inq-1");
        assert_eq!(array[0]["status"], "조교 이관");
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn corrupt_value_is_an_error() {
        let storage = MemoryStorage::new();
        storage.set_item(DEFAULT_STORAGE_KEY, "{not json").unwrap();
        let adapter = KeyValueAdapter::new(storage);
        assert!(matches!(adapter.load(), Err(Error::Serde(_))));
    }

    #[test]
    fn quota_error_surfaces_from_save() {
        let adapter = KeyValueAdapter::new(MemoryStorage::with_quota(16));
        assert!(matches!(
            adapter.save(&seed_inquiries()),
            Err(Error::QuotaExceeded { .. })
        ));
    }
}
