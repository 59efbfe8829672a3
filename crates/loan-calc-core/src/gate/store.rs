use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use fd_lock::RwLock;
use tempfile::NamedTempFile;

use crate::error::StorageError;

/// Persistent key-value backend for gate counters.
///
/// Implementations must make [`KeyValueStore::increment_int`] atomic with
/// respect to every other call on the same store.
pub trait KeyValueStore: Send + Sync {
    fn get_int(&self, key: &str) -> Result<Option<i64>, StorageError>;
    fn set_int(&self, key: &str, value: i64) -> Result<(), StorageError>;
    fn get_bool(&self, key: &str) -> Result<Option<bool>, StorageError>;
    fn set_bool(&self, key: &str, value: bool) -> Result<(), StorageError>;

    /// Add one to the integer under `key` (missing counts as 0) and return
    /// the new value.
    fn increment_int(&self, key: &str) -> Result<i64, StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<S> {
    fn get_int(&self, key: &str) -> Result<Option<i64>, StorageError> {
        (**self).get_int(key)
    }
    fn set_int(&self, key: &str, value: i64) -> Result<(), StorageError> {
        (**self).set_int(key, value)
    }
    fn get_bool(&self, key: &str) -> Result<Option<bool>, StorageError> {
        (**self).get_bool(key)
    }
    fn set_bool(&self, key: &str, value: bool) -> Result<(), StorageError> {
        (**self).set_bool(key, value)
    }
    fn increment_int(&self, key: &str) -> Result<i64, StorageError> {
        (**self).increment_int(key)
    }
}

/// A single stored value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredValue {
    Int(i64),
    Bool(bool),
}

type Entries = BTreeMap<String, StoredValue>;

fn read_int(entries: &Entries, key: &str) -> Result<Option<i64>, StorageError> {
    match entries.get(key) {
        None => Ok(None),
        Some(StoredValue::Int(v)) => Ok(Some(*v)),
        Some(StoredValue::Bool(_)) => Err(StorageError::Corrupt {
            key: key.into(),
            reason: "expected an integer, found a boolean".into(),
        }),
    }
}

fn read_bool(entries: &Entries, key: &str) -> Result<Option<bool>, StorageError> {
    match entries.get(key) {
        None => Ok(None),
        Some(StoredValue::Bool(v)) => Ok(Some(*v)),
        Some(StoredValue::Int(_)) => Err(StorageError::Corrupt {
            key: key.into(),
            reason: "expected a boolean, found an integer".into(),
        }),
    }
}

fn bump(entries: &mut Entries, key: &str) -> Result<i64, StorageError> {
    let next = read_int(entries, key)?.unwrap_or(0).saturating_add(1);
    entries.insert(key.to_string(), StoredValue::Int(next));
    Ok(next)
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Process-local store. State is lost on drop.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<Entries>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Entries>, StorageError> {
        self.entries
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store mutex poisoned".into()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get_int(&self, key: &str) -> Result<Option<i64>, StorageError> {
        let entries = self.lock()?;
        read_int(&entries, key)
    }

    fn set_int(&self, key: &str, value: i64) -> Result<(), StorageError> {
        self.lock()?.insert(key.to_string(), StoredValue::Int(value));
        Ok(())
    }

    fn get_bool(&self, key: &str) -> Result<Option<bool>, StorageError> {
        let entries = self.lock()?;
        read_bool(&entries, key)
    }

    fn set_bool(&self, key: &str, value: bool) -> Result<(), StorageError> {
        self.lock()?.insert(key.to_string(), StoredValue::Bool(value));
        Ok(())
    }

    fn increment_int(&self, key: &str) -> Result<i64, StorageError> {
        let mut entries = self.lock()?;
        bump(&mut entries, key)
    }
}

// ---------------------------------------------------------------------------
// File-backed store
// ---------------------------------------------------------------------------

/// JSON document on disk. Every write replaces the file atomically, so a
/// crash mid-write leaves the previous state intact.
///
/// Access is serialized through an advisory lock on a sibling `.lock` file,
/// so separate handles and separate processes sharing a path never lose an
/// increment.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("state"));
        name.push(".lock");
        self.dir().join(name)
    }

    fn open_lock(&self) -> Result<RwLock<File>, StorageError> {
        fs::create_dir_all(self.dir())?;
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())?;
        Ok(RwLock::new(file))
    }

    fn load(&self) -> Result<Entries, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(Entries::new()),
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| StorageError::Corrupt {
                key: self.path.display().to_string(),
                reason: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Entries::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, entries: &Entries) -> Result<(), StorageError> {
        let body = serde_json::to_vec_pretty(entries)
            .map_err(|e| StorageError::Io(format!("encode state: {e}")))?;
        let mut tmp = NamedTempFile::new_in(self.dir())?;
        tmp.write_all(&body)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| StorageError::Io(e.error.to_string()))?;
        Ok(())
    }

    fn read<T>(&self, f: impl FnOnce(&Entries) -> Result<T, StorageError>) -> Result<T, StorageError> {
        let lock = self.open_lock()?;
        let _held = lock.read()?;
        f(&self.load()?)
    }

    fn update<T>(&self, f: impl FnOnce(&mut Entries) -> Result<T, StorageError>) -> Result<T, StorageError> {
        let mut lock = self.open_lock()?;
        let _held = lock.write()?;
        let mut entries = self.load()?;
        let out = f(&mut entries)?;
        self.save(&entries)?;
        Ok(out)
    }
}

impl KeyValueStore for FileStore {
    fn get_int(&self, key: &str) -> Result<Option<i64>, StorageError> {
        self.read(|entries| read_int(entries, key))
    }

    fn set_int(&self, key: &str, value: i64) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.insert(key.to_string(), StoredValue::Int(value));
            Ok(())
        })
    }

    fn get_bool(&self, key: &str) -> Result<Option<bool>, StorageError> {
        self.read(|entries| read_bool(entries, key))
    }

    fn set_bool(&self, key: &str, value: bool) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.insert(key.to_string(), StoredValue::Bool(value));
            Ok(())
        })
    }

    fn increment_int(&self, key: &str) -> Result<i64, StorageError> {
        self.update(|entries| bump(entries, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get_int("count").unwrap(), None);
        store.set_int("count", 4).unwrap();
        store.set_bool("flag", true).unwrap();
        assert_eq!(store.get_int("count").unwrap(), Some(4));
        assert_eq!(store.get_bool("flag").unwrap(), Some(true));
    }

    #[test]
    fn test_type_mismatch_is_corrupt() {
        let store = MemoryStore::new();
        store.set_bool("count", true).unwrap();
        assert!(matches!(
            store.get_int("count"),
            Err(StorageError::Corrupt { .. })
        ));
    }

    #[test]
    fn test_concurrent_increments_are_not_lost() {
        let store = Arc::new(MemoryStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..100 {
                        store.increment_int("count").unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(store.get_int("count").unwrap(), Some(800));
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let store = FileStore::open(&path);
        assert_eq!(store.increment_int("count").unwrap(), 1);
        assert_eq!(store.increment_int("count").unwrap(), 2);
        store.set_bool("unlocked", true).unwrap();
        drop(store);

        let reopened = FileStore::open(&path);
        assert_eq!(reopened.get_int("count").unwrap(), Some(2));
        assert_eq!(reopened.get_bool("unlocked").unwrap(), Some(true));
    }

    #[test]
    fn test_separate_file_handles_share_the_counter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let path = path.clone();
                thread::spawn(move || {
                    let store = FileStore::open(&path);
                    for _ in 0..200 {
                        store.increment_int("count").unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(FileStore::open(&path).get_int("count").unwrap(), Some(400));
    }

    #[test]
    fn test_file_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "not json").unwrap();

        let store = FileStore::open(&path);
        assert!(matches!(
            store.get_int("count"),
            Err(StorageError::Corrupt { .. })
        ));
    }
}
