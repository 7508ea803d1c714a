//! Backup bundle export and import
//!
//! A bundle carries every persisted collection as its verbatim blob string
//! plus a `meta` stamp. Import validates the whole bundle first and then
//! writes all present entries in one [`KvStore::commit`](crate::storage::KvStore::commit),
//! so a failed import leaves the store as it was.

use crate::storage::{StateKey, StorageError};
use crate::tracker::engine::Tracker;
use crc32fast::Hasher;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Schema version stamped on exported bundles
pub const BACKUP_VERSION: &str = "12.0";

/// Errors from restoring a bundle
#[derive(Error, Debug)]
pub enum BackupError {
    #[error("Backup payload is empty")]
    Empty,

    #[error("Backup payload is not a valid bundle: {0}")]
    Parse(String),

    #[error("Backup entry {key} is not valid JSON")]
    InvalidEntry { key: StateKey },

    #[error("Backup checksum mismatch: expected {expected}, computed {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Export stamp
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackupMeta {
    #[serde(default, deserialize_with = "crate::tracker::types::lenient::millis")]
    pub timestamp: i64,
    #[serde(default)]
    pub version: String,
    /// CRC32 of the present entries; bundles from older versions lack it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

/// Full-state snapshot; each entry is the stored blob or `null`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BackupBundle {
    #[serde(default)]
    pub pantry: Option<String>,
    #[serde(default)]
    pub recipes: Option<String>,
    #[serde(default)]
    pub history: Option<String>,
    #[serde(default)]
    pub water: Option<String>,
    #[serde(default)]
    pub water_history: Option<String>,
    #[serde(default)]
    pub settings: Option<String>,
    #[serde(default)]
    pub sleep: Option<String>,
    #[serde(default)]
    pub steps: Option<String>,
    #[serde(default)]
    pub habits: Option<String>,
    #[serde(default)]
    pub habit_logs: Option<String>,
    #[serde(default)]
    pub meta: Option<BackupMeta>,
}

impl BackupBundle {
    pub fn entry(&self, key: StateKey) -> Option<&str> {
        let value = match key {
            StateKey::Pantry => &self.pantry,
            StateKey::Recipes => &self.recipes,
            StateKey::History => &self.history,
            StateKey::Water => &self.water,
            StateKey::WaterHistory => &self.water_history,
            StateKey::Settings => &self.settings,
            StateKey::Sleep => &self.sleep,
            StateKey::Steps => &self.steps,
            StateKey::Habits => &self.habits,
            StateKey::HabitLogs => &self.habit_logs,
        };
        value.as_deref()
    }

    fn entry_mut(&mut self, key: StateKey) -> &mut Option<String> {
        match key {
            StateKey::Pantry => &mut self.pantry,
            StateKey::Recipes => &mut self.recipes,
            StateKey::History => &mut self.history,
            StateKey::Water => &mut self.water,
            StateKey::WaterHistory => &mut self.water_history,
            StateKey::Settings => &mut self.settings,
            StateKey::Sleep => &mut self.sleep,
            StateKey::Steps => &mut self.steps,
            StateKey::Habits => &mut self.habits,
            StateKey::HabitLogs => &mut self.habit_logs,
        }
    }

    /// Non-empty entries in key order
    pub fn present_entries(&self) -> Vec<(StateKey, &str)> {
        StateKey::ALL
            .iter()
            .filter_map(|&key| {
                self.entry(key)
                    .filter(|value| !value.is_empty())
                    .map(|value| (key, value))
            })
            .collect()
    }

    /// CRC32 over key names and values of the present entries
    pub fn checksum(&self) -> String {
        let mut hasher = Hasher::new();
        for (key, value) in self.present_entries() {
            hasher.update(key.as_str().as_bytes());
            hasher.update(&[0]);
            hasher.update(value.as_bytes());
            hasher.update(&[0]);
        }
        format!("{:08x}", hasher.finalize())
    }

    /// Parse a serialized bundle, rejecting `null` and non-objects
    pub fn parse(payload: &str) -> Result<Self, BackupError> {
        let value: serde_json::Value =
            serde_json::from_str(payload).map_err(|e| BackupError::Parse(e.to_string()))?;
        if value.is_null() {
            return Err(BackupError::Empty);
        }
        serde_json::from_value(value).map_err(|e| BackupError::Parse(e.to_string()))
    }

    /// Check checksum and that every present entry is JSON
    pub fn validate(&self) -> Result<(), BackupError> {
        if let Some(expected) = self.meta.as_ref().and_then(|m| m.checksum.as_ref()) {
            let actual = self.checksum();
            if !expected.eq_ignore_ascii_case(&actual) {
                return Err(BackupError::ChecksumMismatch {
                    expected: expected.clone(),
                    actual,
                });
            }
        }

        for (key, value) in self.present_entries() {
            if serde_json::from_str::<serde_json::Value>(value).is_err() {
                return Err(BackupError::InvalidEntry { key });
            }
        }
        Ok(())
    }
}

impl Tracker {
    /// Snapshot every stored blob
    pub fn export_full_data(&self) -> Result<BackupBundle, StorageError> {
        let _guard = self.write_guard()?;

        let mut bundle = BackupBundle::default();
        for key in StateKey::ALL {
            *bundle.entry_mut(key) = self.store().get(key)?;
        }

        bundle.meta = Some(BackupMeta {
            timestamp: self.now_millis(),
            version: BACKUP_VERSION.to_string(),
            checksum: Some(bundle.checksum()),
        });

        tracing::info!(
            entries = bundle.present_entries().len(),
            "Exported backup bundle"
        );
        Ok(bundle)
    }

    /// Restore a bundle; returns the number of keys written
    ///
    /// Keys absent from the bundle are left as they are.
    pub fn restore(&self, bundle: &BackupBundle) -> Result<usize, BackupError> {
        bundle.validate()?;

        let batch: Vec<(StateKey, String)> = bundle
            .present_entries()
            .into_iter()
            .map(|(key, value)| (key, value.to_string()))
            .collect();
        let keys: Vec<StateKey> = batch.iter().map(|(key, _)| *key).collect();

        {
            let _guard = self.write_guard()?;
            self.store().commit(&batch)?;
        }
        // Valid JSON of the wrong shape still reads as defaults
        self.clear_recovered(&keys);
        for key in &keys {
            self.check_key(*key)?;
        }

        tracing::info!(
            keys = batch.len(),
            version = bundle.meta.as_ref().map(|m| m.version.as_str()).unwrap_or("unknown"),
            "Restored backup bundle"
        );
        Ok(batch.len())
    }

    /// Restore from a serialized bundle; `false` when nothing was written
    pub fn import_full_data(&self, payload: &str) -> bool {
        let result = BackupBundle::parse(payload).and_then(|bundle| self.restore(&bundle));
        match result {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Rejected backup import");
                false
            }
        }
    }
}
