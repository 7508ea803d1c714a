//! Key-value blob store
//!
//! Every logical collection is persisted as one serialized blob under a fixed
//! key and is always read and written as a whole value. There are no
//! transactions across keys except [`KvStore::commit`], which applies a batch
//! all-or-nothing (used by backup restore).

use crate::storage::error::{StorageError, StorageResult};
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Persisted collections, one blob each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StateKey {
    Pantry,
    Recipes,
    History,
    Water,
    WaterHistory,
    Settings,
    Sleep,
    Steps,
    Habits,
    HabitLogs,
}

impl StateKey {
    /// All keys, in backup order
    pub const ALL: [StateKey; 10] = [
        StateKey::Pantry,
        StateKey::Recipes,
        StateKey::History,
        StateKey::Water,
        StateKey::WaterHistory,
        StateKey::Settings,
        StateKey::Sleep,
        StateKey::Steps,
        StateKey::Habits,
        StateKey::HabitLogs,
    ];

    /// Storage name of the key
    pub fn as_str(&self) -> &'static str {
        match self {
            StateKey::Pantry => "nutri-flex-pantry",
            StateKey::Recipes => "nutri-flex-recipes",
            StateKey::History => "nutri-flex-history",
            StateKey::Water => "nutri-flex-water",
            StateKey::WaterHistory => "nutri-flex-water-history",
            StateKey::Settings => "nutri-flex-wellness-settings",
            StateKey::Sleep => "nutri-flex-sleep",
            StateKey::Steps => "nutri-flex-steps",
            StateKey::Habits => "nutri-flex-habits",
            StateKey::HabitLogs => "nutri-flex-habit-logs",
        }
    }
}

impl Serialize for StateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl std::fmt::Display for StateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whole-value blob storage keyed by [`StateKey`]
pub trait KvStore: Send + Sync {
    /// Read the blob for a key, `None` if never written
    fn get(&self, key: StateKey) -> StorageResult<Option<String>>;

    /// Overwrite the blob for a key
    fn put(&self, key: StateKey, value: &str) -> StorageResult<()>;

    /// Delete the blob for a key (no-op if absent)
    fn remove(&self, key: StateKey) -> StorageResult<()>;

    /// Write every entry or none of them
    fn commit(&self, batch: &[(StateKey, String)]) -> StorageResult<()>;
}

/// In-memory store, used for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: RwLock<HashMap<StateKey, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Lock(format!("Failed to acquire store lock: {}", e))
}

impl KvStore for MemoryStore {
    fn get(&self, key: StateKey) -> StorageResult<Option<String>> {
        let blobs = self.blobs.read().map_err(poisoned)?;
        Ok(blobs.get(&key).cloned())
    }

    fn put(&self, key: StateKey, value: &str) -> StorageResult<()> {
        let mut blobs = self.blobs.write().map_err(poisoned)?;
        blobs.insert(key, value.to_string());
        Ok(())
    }

    fn remove(&self, key: StateKey) -> StorageResult<()> {
        let mut blobs = self.blobs.write().map_err(poisoned)?;
        blobs.remove(&key);
        Ok(())
    }

    fn commit(&self, batch: &[(StateKey, String)]) -> StorageResult<()> {
        let mut blobs = self.blobs.write().map_err(poisoned)?;
        for (key, value) in batch {
            blobs.insert(*key, value.clone());
        }
        Ok(())
    }
}

/// Directory-backed store: one `<key>.json` file per key
///
/// Single-key writes go through a temp file and a rename, so a crash leaves
/// either the old or the new blob, never a torn one.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `dir`
    pub fn open(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        tracing::debug!("Opened file store at {:?}", dir);
        Ok(Self { dir })
    }

    /// Root directory of the store
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: StateKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.as_str()))
    }

    fn staging_path_for(&self, key: StateKey) -> PathBuf {
        self.dir.join(format!("{}.json.tmp", key.as_str()))
    }

    fn read_existing(&self, key: StateKey) -> StorageResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn discard_staged(&self, keys: &[StateKey]) {
        for key in keys {
            let _ = fs::remove_file(self.staging_path_for(*key));
        }
    }

    /// Put back the pre-commit values for keys already swapped in
    fn restore(&self, previous: &[(StateKey, Option<String>)]) {
        for (key, value) in previous {
            let result = match value {
                Some(content) => self.put(*key, content),
                None => self.remove(*key),
            };
            if let Err(e) = result {
                tracing::error!(key = %key, error = %e, "Failed to restore key after aborted commit");
            }
        }
    }
}

impl KvStore for FileStore {
    fn get(&self, key: StateKey) -> StorageResult<Option<String>> {
        self.read_existing(key)
    }

    fn put(&self, key: StateKey, value: &str) -> StorageResult<()> {
        let staging = self.staging_path_for(key);
        fs::write(&staging, value)?;
        fs::rename(&staging, self.path_for(key))?;
        Ok(())
    }

    fn remove(&self, key: StateKey) -> StorageResult<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn commit(&self, batch: &[(StateKey, String)]) -> StorageResult<()> {
        // Stage every value before touching any live file
        let mut staged = Vec::with_capacity(batch.len());
        for (key, value) in batch {
            if let Err(e) = fs::write(self.staging_path_for(*key), value) {
                self.discard_staged(&staged);
                self.discard_staged(&[*key]);
                return Err(StorageError::Commit {
                    key: key.to_string(),
                    reason: e.to_string(),
                });
            }
            staged.push(*key);
        }

        let mut previous = Vec::with_capacity(batch.len());
        for key in &staged {
            let before = match self.read_existing(*key) {
                Ok(before) => before,
                Err(e) => {
                    self.restore(&previous);
                    self.discard_staged(&staged);
                    return Err(StorageError::Commit {
                        key: key.to_string(),
                        reason: e.to_string(),
                    });
                }
            };

            if let Err(e) = fs::rename(self.staging_path_for(*key), self.path_for(*key)) {
                self.restore(&previous);
                self.discard_staged(&staged);
                return Err(StorageError::Commit {
                    key: key.to_string(),
                    reason: e.to_string(),
                });
            }
            previous.push((*key, before));
        }

        tracing::debug!("Committed {} keys to {:?}", staged.len(), self.dir);
        Ok(())
    }
}
