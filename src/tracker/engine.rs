//! NutriFlex Tracker
//!
//! The tracker is the explicitly constructed entry point to all state:
//! - Write path: operation → load whole collection → modify → persist
//! - Read path: load collections → scoring functions → result
//!
//! Each collection lives under its own [`StateKey`] and is replaced as a
//! whole value. Corrupt or missing blobs read as their defaults; corruption
//! is logged and remembered so callers can surface it.

use crate::scoring::ScoringRules;
use crate::storage::{KvStore, StateKey, StorageError, StorageResult};
use crate::tracker::clock::Clock;
use crate::tracker::types::{
    CalendarDate, Habit, HabitLog, HistoryItem, UserRecipe, WaterData, WellnessSettings,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

/// Outcome of [`Tracker::init`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Keys whose blobs could not be decoded and now read as defaults
    pub recovered: Vec<StateKey>,
    /// Keys written with initial defaults because they were absent
    pub seeded: Vec<StateKey>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.recovered.is_empty()
    }
}

/// Wellness tracker over a key-value store
pub struct Tracker {
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    rules: ScoringRules,
    /// Serializes read-modify-write cycles
    writes: Mutex<()>,
    /// Keys found corrupt since construction
    recovered: Mutex<BTreeSet<StateKey>>,
}

impl Tracker {
    /// Create a tracker; call [`Tracker::init`] before use
    pub fn new(store: Arc<dyn KvStore>, clock: Arc<dyn Clock>, rules: ScoringRules) -> Self {
        Self {
            store,
            clock,
            rules,
            writes: Mutex::new(()),
            recovered: Mutex::new(BTreeSet::new()),
        }
    }

    /// Seed absent defaults and check every persisted collection
    pub fn init(&self) -> StorageResult<LoadReport> {
        let mut report = LoadReport::default();

        {
            let _guard = self.write_guard()?;
            if self.store.get(StateKey::Pantry)?.is_none() {
                self.save(StateKey::Pantry, &super::pantry::default_pantry())?;
                report.seeded.push(StateKey::Pantry);
            }
        }

        for key in StateKey::ALL {
            if !self.check_key(key)? {
                report.recovered.push(key);
            }
        }

        if report.is_clean() {
            tracing::info!("Tracker state loaded ({} keys)", StateKey::ALL.len());
        } else {
            tracing::warn!(
                recovered = ?report.recovered,
                "Tracker state loaded with corrupt collections reset to defaults"
            );
        }

        Ok(report)
    }

    /// Decode a key with its collection type; `false` if corrupt
    pub(crate) fn check_key(&self, key: StateKey) -> StorageResult<bool> {
        let raw = match self.store.get(key)? {
            Some(raw) => raw,
            None => return Ok(true),
        };

        let ok = match key {
            StateKey::Pantry => serde_json::from_str::<Vec<String>>(&raw).is_ok(),
            StateKey::Recipes => serde_json::from_str::<Vec<UserRecipe>>(&raw).is_ok(),
            StateKey::History => super::history::decode_history(&raw).is_ok(),
            StateKey::Water => serde_json::from_str::<WaterData>(&raw).is_ok(),
            StateKey::WaterHistory => {
                serde_json::from_str::<BTreeMap<CalendarDate, u32>>(&raw).is_ok()
            }
            StateKey::Settings => serde_json::from_str::<WellnessSettings>(&raw).is_ok(),
            StateKey::Sleep => serde_json::from_str::<BTreeMap<CalendarDate, f64>>(&raw).is_ok(),
            StateKey::Steps => serde_json::from_str::<BTreeMap<CalendarDate, u32>>(&raw).is_ok(),
            StateKey::Habits => serde_json::from_str::<Vec<Habit>>(&raw).is_ok(),
            StateKey::HabitLogs => serde_json::from_str::<Vec<HabitLog>>(&raw).is_ok(),
        };

        if !ok {
            self.mark_recovered(key);
        }
        Ok(ok)
    }

    /// Keys that have been read as defaults because their blob was corrupt
    pub fn recovered_keys(&self) -> Vec<StateKey> {
        self.recovered
            .lock()
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn rules(&self) -> &ScoringRules {
        &self.rules
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub(crate) fn store(&self) -> &dyn KvStore {
        self.store.as_ref()
    }

    /// Local calendar day of the tracker's clock
    pub fn today(&self) -> CalendarDate {
        self.clock.today()
    }

    pub(crate) fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }

    /// Hold while doing a read-modify-write
    pub(crate) fn write_guard(&self) -> StorageResult<MutexGuard<'_, ()>> {
        self.writes
            .lock()
            .map_err(|e| StorageError::Lock(format!("Failed to acquire write lock: {}", e)))
    }

    pub(crate) fn mark_recovered(&self, key: StateKey) {
        tracing::warn!(key = %key, "Corrupt collection, using defaults");
        if let Ok(mut set) = self.recovered.lock() {
            set.insert(key);
        }
    }

    pub(crate) fn clear_recovered(&self, keys: &[StateKey]) {
        if let Ok(mut set) = self.recovered.lock() {
            for key in keys {
                set.remove(key);
            }
        }
    }

    /// Load a collection with a custom decoder, falling back to `default`
    pub(crate) fn load_with<T, D, F>(&self, key: StateKey, decode: D, default: F) -> StorageResult<T>
    where
        D: FnOnce(&str) -> Result<T, serde_json::Error>,
        F: FnOnce() -> T,
    {
        match self.store.get(key)? {
            None => Ok(default()),
            Some(raw) => match decode(&raw) {
                Ok(value) => Ok(value),
                Err(e) => {
                    tracing::debug!(key = %key, error = %e, "Failed to decode collection");
                    self.mark_recovered(key);
                    Ok(default())
                }
            },
        }
    }

    /// Load a JSON collection, falling back to `T::default()`
    pub(crate) fn load<T>(&self, key: StateKey) -> StorageResult<T>
    where
        T: DeserializeOwned + Default,
    {
        self.load_with(key, |raw| serde_json::from_str(raw), T::default)
    }

    /// Persist a collection as a whole value
    ///
    /// A successful write replaces any corrupt blob, so the key is no longer
    /// reported as recovered.
    pub(crate) fn save<T>(&self, key: StateKey, value: &T) -> StorageResult<()>
    where
        T: Serialize + ?Sized,
    {
        let content = serde_json::to_string(value)?;
        self.store.put(key, &content)?;
        self.clear_recovered(&[key]);
        tracing::debug!(key = %key, bytes = content.len(), "Saved collection");
        Ok(())
    }

    /// Fresh time-ordered identifier
    pub(crate) fn new_id() -> String {
        uuid::Uuid::now_v7().to_string()
    }

    /// Raw item history (also used by reports)
    pub(crate) fn load_history(&self) -> StorageResult<Vec<HistoryItem>> {
        self.load_with(StateKey::History, super::history::decode_history, Vec::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::tracker::clock::FixedClock;

    fn create_test_tracker() -> (Tracker, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::on(CalendarDate::from_ymd(2024, 6, 15).unwrap(), 12));
        let tracker = Tracker::new(store.clone(), clock, ScoringRules::default());
        (tracker, store)
    }

    #[test]
    fn test_init_seeds_pantry_once() {
        let (tracker, store) = create_test_tracker();

        let report = tracker.init().unwrap();
        assert_eq!(report.seeded, vec![StateKey::Pantry]);
        assert!(report.is_clean());
        assert!(store.get(StateKey::Pantry).unwrap().is_some());

        let report = tracker.init().unwrap();
        assert!(report.seeded.is_empty());
    }

    #[test]
    fn test_init_reports_corrupt_keys() {
        let (tracker, store) = create_test_tracker();
        store.put(StateKey::History, "{not json").unwrap();
        store.put(StateKey::Steps, r#"{"2024-06-15": "many"}"#).unwrap();

        let report = tracker.init().unwrap();

        assert_eq!(report.recovered, vec![StateKey::History, StateKey::Steps]);
        assert_eq!(tracker.recovered_keys(), report.recovered);
    }

    #[test]
    fn test_corrupt_load_returns_default_and_is_remembered() {
        let (tracker, store) = create_test_tracker();
        store.put(StateKey::Habits, "garbage").unwrap();

        let habits: Vec<Habit> = tracker.load(StateKey::Habits).unwrap();

        assert!(habits.is_empty());
        assert_eq!(tracker.recovered_keys(), vec![StateKey::Habits]);
    }

    #[test]
    fn test_write_clears_recovery_flag() {
        let (tracker, store) = create_test_tracker();
        store.put(StateKey::History, "garbage").unwrap();

        let report = tracker.init().unwrap();
        assert_eq!(report.recovered, vec![StateKey::History]);

        tracker
            .log_meal(crate::tracker::MealEntry::new(
                "Tostada",
                crate::tracker::MealStatus::Completed,
                true,
                250,
            ))
            .unwrap();

        assert!(tracker.recovered_keys().is_empty());
        assert_eq!(tracker.get_unified_history().unwrap().len(), 1);
        assert!(tracker.init().unwrap().is_clean());
    }

    #[test]
    fn test_failed_decode_after_write_is_flagged_again() {
        let (tracker, store) = create_test_tracker();
        tracker.save(StateKey::Habits, &Vec::<Habit>::new()).unwrap();
        assert!(tracker.recovered_keys().is_empty());

        store.put(StateKey::Habits, "42").unwrap();
        let habits: Vec<Habit> = tracker.load(StateKey::Habits).unwrap();

        assert!(habits.is_empty());
        assert_eq!(tracker.recovered_keys(), vec![StateKey::Habits]);
    }

    #[test]
    fn test_new_ids_are_unique() {
        let a = Tracker::new_id();
        let b = Tracker::new_id();
        assert_ne!(a, b);
    }
}
