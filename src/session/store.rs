use crate::article::ArticleRecord;
use crate::error::StoreError;
use crate::filter::YearRange;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub const WORKING_KEY: &str = "snapshot:working";
pub const ORIGINAL_KEY: &str = "snapshot:original";
pub const YEAR_START_KEY: &str = "snapshot:year-start";
pub const YEAR_END_KEY: &str = "snapshot:year-end";

const SNAPSHOT_KEYS: [&str; 4] = [WORKING_KEY, ORIGINAL_KEY, YEAR_START_KEY, YEAR_END_KEY];

/// What an explicit save leaves behind in durable storage
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub working: Vec<ArticleRecord>,
    pub original: Vec<ArticleRecord>,
    pub year_range: YearRange,
}

/// Durable home of the last saved snapshot.
///
/// Each part of a snapshot is an independent entry; a missing working entry
/// means "nothing saved" and is not an error.
pub trait SnapshotStore {
    fn load_snapshot(&self) -> Result<Option<Snapshot>, StoreError>;
    fn save_snapshot(&self, snapshot: &Snapshot) -> Result<(), StoreError>;
    fn clear_snapshot(&self) -> Result<(), StoreError>;
}

/// Raw key-value access shared by the store implementations
trait EntryStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

fn load_entries(store: &impl EntryStore) -> Result<Option<Snapshot>, StoreError> {
    let Some(working) = read_entry::<Vec<ArticleRecord>>(store, WORKING_KEY)? else {
        return Ok(None);
    };
    let original = read_entry(store, ORIGINAL_KEY)?.unwrap_or_default();
    let year_range = YearRange {
        start: read_entry(store, YEAR_START_KEY)?,
        end: read_entry(store, YEAR_END_KEY)?,
    };

    Ok(Some(Snapshot {
        working,
        original,
        year_range,
    }))
}

/// The working entry marks a snapshot as present, so it is dropped first and
/// written last: an interrupted save reads back as "nothing saved", never as a
/// mix of two snapshots.
fn save_entries(store: &impl EntryStore, snapshot: &Snapshot) -> Result<(), StoreError> {
    store.remove(WORKING_KEY)?;
    write_entry(store, ORIGINAL_KEY, Some(&snapshot.original))?;
    write_entry(store, YEAR_START_KEY, snapshot.year_range.start.as_ref())?;
    write_entry(store, YEAR_END_KEY, snapshot.year_range.end.as_ref())?;
    write_entry(store, WORKING_KEY, Some(&snapshot.working))?;
    Ok(())
}

fn clear_entries(store: &impl EntryStore) -> Result<(), StoreError> {
    for key in SNAPSHOT_KEYS {
        store.remove(key)?;
    }
    Ok(())
}

fn read_entry<V: DeserializeOwned>(
    store: &impl EntryStore,
    key: &str,
) -> Result<Option<V>, StoreError> {
    match store.read(key)? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

/// Write a value, or drop the entry when there is nothing to store
fn write_entry<V: Serialize>(
    store: &impl EntryStore,
    key: &str,
    value: Option<&V>,
) -> Result<(), StoreError> {
    match value {
        Some(value) => store.write(key, &serde_json::to_vec(value)?),
        None => store.remove(key),
    }
}

/// Get the platform-appropriate snapshot directory for pqd-score
pub fn get_snapshot_path() -> PathBuf {
    dirs::cache_dir()
        .map(|p| p.join("pqd-score/snapshots"))
        .unwrap_or_else(|| {
            PathBuf::from(format!(
                "{}/.cache/pqd-score/snapshots",
                std::env::var("HOME").unwrap_or_default()
            ))
        })
}

/// Disk-persistent snapshot store backed by cacache
#[derive(Debug, Clone)]
pub struct CacheStore {
    cache_path: PathBuf,
}

impl CacheStore {
    pub fn new(cache_path: PathBuf) -> Self {
        Self { cache_path }
    }

    pub fn path(&self) -> &Path {
        &self.cache_path
    }
}

impl EntryStore for CacheStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        match cacache::read_sync(&self.cache_path, key) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(cacache::Error::EntryNotFound(_, _)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        cacache::write_sync(&self.cache_path, key, bytes)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        cacache::remove_sync(&self.cache_path, key)?;
        Ok(())
    }
}

impl SnapshotStore for CacheStore {
    fn load_snapshot(&self) -> Result<Option<Snapshot>, StoreError> {
        load_entries(self)
    }

    fn save_snapshot(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        save_entries(self, snapshot)
    }

    fn clear_snapshot(&self) -> Result<(), StoreError> {
        clear_entries(self)
    }
}

/// In-memory store. Clones share the same entries, so a caller can keep a
/// handle and inspect what a session persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    fail_writes: bool,
    fail_reads: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes and removals always fail (reads still work)
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    /// A store whose reads always fail (writes still work)
    pub fn unreadable() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().is_ok_and(|entries| entries.contains_key(key))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>>, StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes {
            Err(StoreError::Unavailable("writes disabled".to_string()))
        } else {
            Ok(())
        }
    }
}

impl EntryStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        if self.fail_reads {
            return Err(StoreError::Unavailable("reads disabled".to_string()));
        }
        Ok(self.lock()?.get(key).cloned())
    }

    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        self.check_writable()?;
        self.lock()?.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.check_writable()?;
        self.lock()?.remove(key);
        Ok(())
    }
}

impl SnapshotStore for MemoryStore {
    fn load_snapshot(&self) -> Result<Option<Snapshot>, StoreError> {
        load_entries(self)
    }

    fn save_snapshot(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        save_entries(self, snapshot)
    }

    fn clear_snapshot(&self) -> Result<(), StoreError> {
        clear_entries(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::QualisTier;

    fn sample_snapshot(range: YearRange) -> Snapshot {
        let record = ArticleRecord {
            year: 2021,
            qualis_tier: QualisTier::A1,
            title: "Saved".to_string(),
            author_count: 2,
            ..ArticleRecord::default()
        };
        Snapshot {
            working: vec![record.clone()],
            original: vec![record],
            year_range: range,
        }
    }

    #[test]
    fn test_memory_store_empty_is_cold_start() {
        let store = MemoryStore::new();
        assert_eq!(store.load_snapshot().unwrap(), None);
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        let snapshot = sample_snapshot(YearRange::new(2019, 2023));
        store.save_snapshot(&snapshot).unwrap();

        for key in SNAPSHOT_KEYS {
            assert!(store.contains(key), "{} not written", key);
        }
        assert_eq!(store.load_snapshot().unwrap(), Some(snapshot));
    }

    #[test]
    fn test_unset_bounds_remove_entries() {
        let store = MemoryStore::new();
        store
            .save_snapshot(&sample_snapshot(YearRange::new(2019, 2023)))
            .unwrap();
        store
            .save_snapshot(&sample_snapshot(YearRange::unbounded()))
            .unwrap();

        assert!(!store.contains(YEAR_START_KEY));
        assert!(!store.contains(YEAR_END_KEY));
        let loaded = store.load_snapshot().unwrap().unwrap();
        assert_eq!(loaded.year_range, YearRange::unbounded());
    }

    #[test]
    fn test_clear_removes_everything() {
        let store = MemoryStore::new();
        store
            .save_snapshot(&sample_snapshot(YearRange::new(2019, 2023)))
            .unwrap();
        store.clear_snapshot().unwrap();
        assert_eq!(store.load_snapshot().unwrap(), None);
    }

    #[test]
    fn test_failing_store_rejects_writes() {
        let store = MemoryStore::failing();
        let result = store.save_snapshot(&sample_snapshot(YearRange::unbounded()));
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
        assert_eq!(store.load_snapshot().unwrap(), None);
    }

    /// Rejects writes to one key, passes everything else through
    struct RejectKey {
        inner: MemoryStore,
        key: &'static str,
    }

    impl EntryStore for RejectKey {
        fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
            self.inner.read(key)
        }

        fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
            if key == self.key {
                return Err(StoreError::Unavailable(format!("cannot write {}", key)));
            }
            self.inner.write(key, bytes)
        }

        fn remove(&self, key: &str) -> Result<(), StoreError> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_interrupted_save_never_mixes_snapshots() {
        for key in SNAPSHOT_KEYS {
            let inner = MemoryStore::new();
            inner
                .save_snapshot(&sample_snapshot(YearRange::new(2019, 2023)))
                .unwrap();

            let mut newer = sample_snapshot(YearRange::new(2000, 2001));
            newer.original[0].title = "Newer".to_string();
            let store = RejectKey {
                inner: inner.clone(),
                key,
            };
            assert!(save_entries(&store, &newer).is_err(), "{} did not fail", key);

            // a failed save leaves no snapshot behind
            assert_eq!(inner.load_snapshot().unwrap(), None, "after failing {}", key);
        }
    }

    #[test]
    fn test_unreadable_store() {
        let store = MemoryStore::unreadable();
        store
            .save_snapshot(&sample_snapshot(YearRange::unbounded()))
            .unwrap();
        assert!(matches!(
            store.load_snapshot(),
            Err(StoreError::Unavailable(_))
        ));
    }

    #[test]
    fn test_corrupt_entry_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().join("snapshots"));
        cacache::write_sync(store.path(), WORKING_KEY, b"not json").unwrap();
        assert!(matches!(
            store.load_snapshot(),
            Err(StoreError::Serialization(_))
        ));
    }

    #[test]
    fn test_cache_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().join("snapshots"));
        assert_eq!(store.load_snapshot().unwrap(), None);

        let snapshot = sample_snapshot(YearRange::new(2020, 2022));
        store.save_snapshot(&snapshot).unwrap();
        assert_eq!(store.load_snapshot().unwrap(), Some(snapshot));

        store.clear_snapshot().unwrap();
        assert_eq!(store.load_snapshot().unwrap(), None);
    }
}
