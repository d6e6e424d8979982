// Record persistence behind a key-value port
//
// The record collection is one JSON array stored as a string under a
// fixed key. The port keeps the wizard independent of the backing
// store: files on disk in production, a hash map in tests. Reads,
// appends, and clears are whole-collection operations; a single
// cooperative writer is assumed (two processes sharing a data dir can
// lose appends, a documented limitation).

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use log::warn;

use crate::error::StorageError;
use crate::records::{sort_newest_first, MeasurementRecord};

/// Fixed key the record collection is stored under
///
/// Matches collections written by earlier builds; do not rename.
pub const RECORDS_KEY: &str = "measurementRecords";

/// Port for string-keyed persistence
///
/// This trait abstracts the backing store, allowing different
/// implementations (files on disk, in-memory for tests).
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, overwriting any previous value
    fn put(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key` and its value; removing an absent key is not an error
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// File-backed store: one file per key under a data directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`; the directory is created lazily
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StorageError::ReadFailed {
                reason: format!("{}: {}", path.display(), err),
            }),
        }
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|err| StorageError::WriteFailed {
            reason: format!("{}: {}", self.dir.display(), err),
        })?;
        let path = self.path_for(key);
        fs::write(&path, value).map_err(|err| StorageError::WriteFailed {
            reason: format!("{}: {}", path.display(), err),
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StorageError::WriteFailed {
                reason: format!("{}: {}", path.display(), err),
            }),
        }
    }
}

/// In-memory store for tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::ReadFailed {
            reason: "memory store lock poisoned".to_string(),
        })?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::WriteFailed {
            reason: "memory store lock poisoned".to_string(),
        })?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::WriteFailed {
            reason: "memory store lock poisoned".to_string(),
        })?;
        entries.remove(key);
        Ok(())
    }
}

/// The record collection loaded from the store
#[derive(Debug, Clone)]
pub struct LoadedRecords {
    /// Records, newest first
    pub records: Vec<MeasurementRecord>,
    /// True when the stored value was unreadable and the collection was
    /// recovered as empty; callers surface a non-fatal warning
    pub recovered: bool,
}

/// Record collection layered on a key-value port
pub struct RecordStore {
    store: Box<dyn KeyValueStore>,
}

impl RecordStore {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load the whole collection, newest first
    ///
    /// A corrupt stored value is treated as an empty collection and
    /// flagged via `recovered`; it is never fatal.
    pub fn load_all(&self) -> Result<LoadedRecords, StorageError> {
        let raw = self.store.get(RECORDS_KEY)?;
        match raw {
            None => Ok(LoadedRecords {
                records: Vec::new(),
                recovered: false,
            }),
            Some(contents) => match serde_json::from_str::<Vec<MeasurementRecord>>(&contents) {
                Ok(mut records) => {
                    sort_newest_first(&mut records);
                    Ok(LoadedRecords {
                        records,
                        recovered: false,
                    })
                }
                Err(err) => {
                    warn!(
                        "[RecordStore] Stored collection unreadable ({}); treating as empty",
                        err
                    );
                    Ok(LoadedRecords {
                        records: Vec::new(),
                        recovered: true,
                    })
                }
            },
        }
    }

    /// Append one record: read all, append, write all
    ///
    /// Single atomic sequence per submission; no concurrent writers are
    /// assumed. Returns `true` when the existing collection was
    /// unreadable and the append rebuilt it from empty, so callers can
    /// surface the same non-fatal warning as `load_all`.
    pub fn append(&self, record: &MeasurementRecord) -> Result<bool, StorageError> {
        let raw = self.store.get(RECORDS_KEY)?;
        let mut recovered = false;
        let mut records: Vec<MeasurementRecord> = match raw {
            None => Vec::new(),
            Some(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!(
                    "[RecordStore] Stored collection unreadable ({}); starting fresh",
                    err
                );
                recovered = true;
                Vec::new()
            }),
        };
        records.push(record.clone());

        let json =
            serde_json::to_string(&records).map_err(|err| StorageError::SerializeFailed {
                reason: err.to_string(),
            })?;
        self.store.put(RECORDS_KEY, &json)?;
        Ok(recovered)
    }

    /// Remove the whole collection, regardless of prior size
    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(RECORDS_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::DeviceContext;
    use crate::points::find_point;
    use crate::wizard::{CompletedRun, Evaluation};
    use chrono::{TimeZone, Utc};

    fn test_record(serial: &str, day: u32) -> MeasurementRecord {
        let point = find_point("32.3").unwrap();
        let measurements = vec![36.1, 36.3, 36.2];
        let run = CompletedRun {
            device: DeviceContext::new("thermometer", "Термометры").unwrap(),
            serial_number: serial.to_string(),
            point: point.clone(),
            measurements: measurements.clone(),
            evaluation: Evaluation::of(&measurements, &point),
        };
        let ts = Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap();
        MeasurementRecord::from_run(&run, 3, ts).unwrap()
    }

    fn memory_record_store() -> RecordStore {
        RecordStore::new(Box::new(MemoryStore::new()))
    }

    #[test]
    fn test_load_from_empty_store() {
        let store = memory_record_store();
        let loaded = store.load_all().unwrap();
        assert!(loaded.records.is_empty());
        assert!(!loaded.recovered);
    }

    #[test]
    fn test_append_then_load() {
        let store = memory_record_store();
        assert!(!store.append(&test_record("SN1", 1)).unwrap());
        assert!(!store.append(&test_record("SN2", 2)).unwrap());

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded.records.len(), 2);
        // Newest first
        assert_eq!(loaded.records[0].serial_number, "SN2");
        assert_eq!(loaded.records[1].serial_number, "SN1");
    }

    #[test]
    fn test_corrupt_collection_recovers_empty() {
        let kv = MemoryStore::new();
        kv.put(RECORDS_KEY, "{definitely not json").unwrap();
        let store = RecordStore::new(Box::new(kv));

        let loaded = store.load_all().unwrap();
        assert!(loaded.records.is_empty());
        assert!(loaded.recovered);
    }

    #[test]
    fn test_append_after_corruption_rebuilds_collection() {
        let kv = MemoryStore::new();
        kv.put(RECORDS_KEY, "[1, 2, oops").unwrap();
        let store = RecordStore::new(Box::new(kv));

        assert!(store.append(&test_record("SN1", 1)).unwrap());
        let loaded = store.load_all().unwrap();
        assert_eq!(loaded.records.len(), 1);
        assert!(!loaded.recovered);
    }

    #[test]
    fn test_clear_empties_any_size() {
        let store = memory_record_store();
        for day in 1..=5 {
            store.append(&test_record("SN", day)).unwrap();
        }
        store.clear().unwrap();
        assert!(store.load_all().unwrap().records.is_empty());

        // Clearing an already-empty collection is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(Box::new(FileStore::new(dir.path())));

        store.append(&test_record("SN1", 1)).unwrap();
        let loaded = store.load_all().unwrap();
        assert_eq!(loaded.records.len(), 1);
        assert_eq!(loaded.records[0].serial_number, "SN1");

        // The collection lives in one file under the fixed key
        assert!(dir.path().join("measurementRecords.json").exists());
    }

    #[test]
    fn test_file_store_missing_key_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert_eq!(store.get(RECORDS_KEY).unwrap(), None);
        store.remove(RECORDS_KEY).unwrap();
    }
}
