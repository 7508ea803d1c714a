//! Sleep, steps and habits
//!
//! Sleep and steps are `date -> value` maps with last-write-wins per day.
//! Habit completions are `(date, habitId)` pairs toggled in and out.
//! Settings only gate display; turning a module off keeps its logs.

use crate::storage::{StateKey, StorageResult};
use crate::tracker::engine::Tracker;
use crate::tracker::types::{CalendarDate, Habit, HabitLog, WellnessSettings};
use std::collections::BTreeMap;

/// Upper bound for a day's sleep entry
pub const MAX_SLEEP_HOURS: f64 = 24.0;

fn sanitize_hours(hours: f64) -> f64 {
    if hours.is_finite() {
        hours.clamp(0.0, MAX_SLEEP_HOURS)
    } else {
        0.0
    }
}

impl Tracker {
    pub fn get_wellness_settings(&self) -> StorageResult<WellnessSettings> {
        self.load(StateKey::Settings)
    }

    pub fn save_wellness_settings(&self, settings: WellnessSettings) -> StorageResult<WellnessSettings> {
        let _guard = self.write_guard()?;
        self.save(StateKey::Settings, &settings)?;
        tracing::debug!(?settings, "Saved wellness settings");
        Ok(settings)
    }

    pub fn sleep_log(&self) -> StorageResult<BTreeMap<CalendarDate, f64>> {
        self.load(StateKey::Sleep)
    }

    pub fn steps_log(&self) -> StorageResult<BTreeMap<CalendarDate, u32>> {
        self.load(StateKey::Steps)
    }

    /// Set today's sleep; hours are clamped to `[0, 24]`
    pub fn log_sleep(&self, hours: f64) -> StorageResult<f64> {
        let _guard = self.write_guard()?;
        let hours = sanitize_hours(hours);

        let mut log = self.sleep_log()?;
        log.insert(self.today(), hours);
        self.save(StateKey::Sleep, &log)?;

        tracing::debug!(hours, "Logged sleep");
        Ok(hours)
    }

    /// Set today's step count
    pub fn log_steps(&self, count: u32) -> StorageResult<u32> {
        let _guard = self.write_guard()?;

        let mut log = self.steps_log()?;
        log.insert(self.today(), count);
        self.save(StateKey::Steps, &log)?;

        tracing::debug!(count, "Logged steps");
        Ok(count)
    }

    /// Today's sleep, `None` when not logged yet
    pub fn get_today_sleep(&self) -> StorageResult<Option<f64>> {
        Ok(self.sleep_log()?.get(&self.today()).copied())
    }

    /// Today's steps, 0 when not logged yet
    pub fn get_today_steps(&self) -> StorageResult<u32> {
        Ok(self.steps_log()?.get(&self.today()).copied().unwrap_or(0))
    }

    pub fn get_habits(&self) -> StorageResult<Vec<Habit>> {
        self.load(StateKey::Habits)
    }

    /// Every habit completion, including those of deleted habits
    pub fn habit_logs(&self) -> StorageResult<Vec<HabitLog>> {
        self.load(StateKey::HabitLogs)
    }

    pub fn add_habit(&self, title: &str) -> StorageResult<Vec<Habit>> {
        let _guard = self.write_guard()?;

        let mut habits = self.get_habits()?;
        let habit = Habit {
            id: Self::new_id(),
            title: title.trim().to_string(),
        };
        tracing::debug!(id = %habit.id, "Added habit");
        habits.push(habit);

        self.save(StateKey::Habits, &habits)?;
        Ok(habits)
    }

    /// Remove a habit definition; its past completions are kept
    pub fn delete_habit(&self, id: &str) -> StorageResult<Vec<Habit>> {
        let _guard = self.write_guard()?;

        let mut habits = self.get_habits()?;
        let before = habits.len();
        habits.retain(|h| h.id != id);

        if habits.len() != before {
            self.save(StateKey::Habits, &habits)?;
            tracing::debug!(id, "Deleted habit");
        }
        Ok(habits)
    }

    /// Flip today's completion of a habit; returns whether it is now done
    ///
    /// Unknown habit ids are ignored and report `false`.
    pub fn toggle_habit_for_today(&self, id: &str) -> StorageResult<bool> {
        let _guard = self.write_guard()?;

        if !self.get_habits()?.iter().any(|h| h.id == id) {
            tracing::debug!(id, "Toggle for unknown habit ignored");
            return Ok(false);
        }

        let today = self.today();
        let mut logs = self.habit_logs()?;
        let before = logs.len();
        logs.retain(|log| !(log.date == today && log.habit_id == id));

        let completed = logs.len() == before;
        if completed {
            logs.push(HabitLog {
                date: today,
                habit_id: id.to_string(),
            });
        }

        self.save(StateKey::HabitLogs, &logs)?;
        tracing::debug!(id, completed, "Toggled habit");
        Ok(completed)
    }

    /// Ids of habits completed today
    pub fn get_today_habit_logs(&self) -> StorageResult<Vec<String>> {
        let today = self.today();
        Ok(self
            .habit_logs()?
            .into_iter()
            .filter(|log| log.date == today)
            .map(|log| log.habit_id)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::ScoringRules;
    use crate::storage::MemoryStore;
    use crate::tracker::clock::FixedClock;
    use std::sync::Arc;

    fn create_test_tracker() -> (Tracker, Arc<FixedClock>) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::on(CalendarDate::from_ymd(2024, 6, 15).unwrap(), 8));
        let tracker = Tracker::new(store, clock.clone(), ScoringRules::default());
        (tracker, clock)
    }

    #[test]
    fn test_sleep_not_logged_vs_zero() {
        let (tracker, _) = create_test_tracker();
        assert_eq!(tracker.get_today_sleep().unwrap(), None);

        tracker.log_sleep(0.0).unwrap();
        assert_eq!(tracker.get_today_sleep().unwrap(), Some(0.0));
    }

    #[test]
    fn test_sleep_last_write_wins_and_clamps() {
        let (tracker, _) = create_test_tracker();
        tracker.log_sleep(6.0).unwrap();
        tracker.log_sleep(7.5).unwrap();
        assert_eq!(tracker.get_today_sleep().unwrap(), Some(7.5));

        assert_eq!(tracker.log_sleep(30.0).unwrap(), 24.0);
        assert_eq!(tracker.log_sleep(-2.0).unwrap(), 0.0);
        assert_eq!(tracker.log_sleep(f64::NAN).unwrap(), 0.0);
        assert_eq!(tracker.sleep_log().unwrap().len(), 1);
    }

    #[test]
    fn test_steps_overwrite_per_day() {
        let (tracker, clock) = create_test_tracker();
        assert_eq!(tracker.get_today_steps().unwrap(), 0);

        tracker.log_steps(4000).unwrap();
        tracker.log_steps(9000).unwrap();
        assert_eq!(tracker.get_today_steps().unwrap(), 9000);

        clock.advance_days(1);
        assert_eq!(tracker.get_today_steps().unwrap(), 0);
        assert_eq!(tracker.steps_log().unwrap().len(), 1);
    }

    #[test]
    fn test_settings_round_trip() {
        let (tracker, _) = create_test_tracker();
        assert_eq!(tracker.get_wellness_settings().unwrap(), WellnessSettings::default());

        let settings = WellnessSettings {
            enable_sleep: true,
            enable_steps: false,
            enable_habits: true,
        };
        tracker.save_wellness_settings(settings).unwrap();
        assert_eq!(tracker.get_wellness_settings().unwrap(), settings);
    }

    #[test]
    fn test_toggle_twice_restores_state() {
        let (tracker, _) = create_test_tracker();
        let habits = tracker.add_habit("Read 10 pages").unwrap();
        let id = habits[0].id.clone();

        assert!(tracker.toggle_habit_for_today(&id).unwrap());
        assert_eq!(tracker.get_today_habit_logs().unwrap(), vec![id.clone()]);

        assert!(!tracker.toggle_habit_for_today(&id).unwrap());
        assert!(!tracker.get_today_habit_logs().unwrap().contains(&id));
    }

    #[test]
    fn test_toggle_unknown_habit_is_noop() {
        let (tracker, _) = create_test_tracker();
        assert!(!tracker.toggle_habit_for_today("ghost").unwrap());
        assert!(tracker.habit_logs().unwrap().is_empty());
    }

    #[test]
    fn test_delete_habit_keeps_history() {
        let (tracker, clock) = create_test_tracker();
        let habits = tracker.add_habit("Stretch").unwrap();
        let id = habits[0].id.clone();
        tracker.toggle_habit_for_today(&id).unwrap();

        clock.advance_days(1);
        let habits = tracker.delete_habit(&id).unwrap();
        assert!(habits.is_empty());

        assert_eq!(tracker.habit_logs().unwrap().len(), 1);
        assert!(!tracker.toggle_habit_for_today(&id).unwrap());
    }
}
