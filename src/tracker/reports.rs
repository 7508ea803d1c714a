//! Read-side aggregates: score, streaks and weekly series
//!
//! Each call loads the collections it needs and hands them to the pure
//! functions in [`crate::scoring`].

use crate::scoring::{self, ActivityDays};
use crate::storage::StorageResult;
use crate::tracker::engine::Tracker;
use crate::tracker::types::{DailyBreakdown, Streaks, WeeklyStatsData, WellnessDay};

impl Tracker {
    pub fn get_daily_breakdown(&self) -> StorageResult<DailyBreakdown> {
        let items = self.load_history()?;
        let water = self.get_water_data()?;
        Ok(scoring::daily_breakdown(
            &items,
            water.count,
            self.clock(),
            self.rules(),
        ))
    }

    /// Total XP for today
    pub fn get_daily_score(&self) -> StorageResult<u32> {
        Ok(self.get_daily_breakdown()?.total_xp)
    }

    pub fn get_streaks(&self) -> StorageResult<Streaks> {
        let items = self.load_history()?;
        let water_history = self.water_history()?;
        let habit_logs = self.habit_logs()?;

        let days = ActivityDays::collect(&items, &water_history, &habit_logs, self.clock());
        Ok(scoring::compute_streaks(&days, self.today()))
    }

    pub fn get_weekly_detailed_stats(&self) -> StorageResult<Vec<WeeklyStatsData>> {
        let items = self.load_history()?;
        let water_history = self.water_history()?;
        Ok(scoring::weekly_detailed_stats(
            &items,
            &water_history,
            self.clock(),
            self.rules(),
        ))
    }

    pub fn get_weekly_wellness_history(&self) -> StorageResult<Vec<WellnessDay>> {
        let sleep = self.sleep_log()?;
        let steps = self.steps_log()?;
        let habit_logs = self.habit_logs()?;
        Ok(scoring::weekly_wellness_history(
            &sleep,
            &steps,
            &habit_logs,
            self.today(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::ScoringRules;
    use crate::storage::MemoryStore;
    use crate::tracker::clock::FixedClock;
    use crate::tracker::history::{ExerciseEntry, MealEntry};
    use crate::tracker::types::{CalendarDate, Intensity, MealStatus};
    use std::sync::Arc;

    fn create_test_tracker() -> (Tracker, Arc<FixedClock>) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::on(CalendarDate::from_ymd(2024, 6, 15).unwrap(), 10));
        let tracker = Tracker::new(store, clock.clone(), ScoringRules::default());
        (tracker, clock)
    }

    fn exercise(minutes: u32) -> ExerciseEntry {
        ExerciseEntry {
            name: "Bike".to_string(),
            time: "18:00".to_string(),
            intensity: Intensity::High,
            duration: minutes,
            calories_burned: 300,
        }
    }

    #[test]
    fn test_example_scenario_from_empty_state() {
        let (tracker, _) = create_test_tracker();

        tracker
            .log_meal(MealEntry::new("Salad", MealStatus::Completed, true, 350))
            .unwrap();
        let breakdown = tracker.get_daily_breakdown().unwrap();
        assert_eq!(breakdown.nutrition.current, 100);
        assert_eq!(breakdown.nutrition.percent, 0.2);

        tracker.log_exercise(exercise(30)).unwrap();
        let breakdown = tracker.get_daily_breakdown().unwrap();
        assert_eq!(breakdown.exercise.current, 150);
        assert_eq!(breakdown.exercise.percent, 0.5);

        for _ in 0..4 {
            tracker.update_water(1).unwrap();
        }
        let breakdown = tracker.get_daily_breakdown().unwrap();
        assert_eq!(breakdown.hydration.current, 100);
        assert_eq!(breakdown.hydration.percent, 0.5);
        assert_eq!(breakdown.total_xp, 350);
        assert_eq!(tracker.get_daily_score().unwrap(), 350);
    }

    #[test]
    fn test_unhealthy_meals_never_show_negative() {
        let (tracker, _) = create_test_tracker();
        for _ in 0..5 {
            tracker
                .log_meal(MealEntry::new("Donut", MealStatus::Completed, false, 400))
                .unwrap();
            let breakdown = tracker.get_daily_breakdown().unwrap();
            assert_eq!(breakdown.nutrition.current, 0);
        }
        assert_eq!(tracker.get_daily_breakdown().unwrap().nutrition_raw, -250);
    }

    #[test]
    fn test_pending_meal_scores_after_confirmation() {
        let (tracker, _) = create_test_tracker();
        let items = tracker
            .log_meal(MealEntry::new("Curry", MealStatus::Pending, true, 600))
            .unwrap();
        assert_eq!(tracker.get_daily_score().unwrap(), 0);

        tracker.confirm_meal(items[0].id(), "").unwrap();
        assert_eq!(tracker.get_daily_score().unwrap(), 100);
    }

    #[test]
    fn test_streaks_with_open_today_and_gap() {
        let (tracker, clock) = create_test_tracker();

        // Exercise on D-3, D-2, D-1; water on D-3 and D-1 only
        clock.advance_days(-3);
        tracker.log_exercise(exercise(20)).unwrap();
        tracker.update_water(1).unwrap();
        clock.advance_days(1);
        tracker.log_exercise(exercise(20)).unwrap();
        clock.advance_days(1);
        tracker.log_exercise(exercise(20)).unwrap();
        tracker.update_water(2).unwrap();
        clock.advance_days(1);

        let streaks = tracker.get_streaks().unwrap();
        assert_eq!(streaks.exercise, 3);
        assert_eq!(streaks.hydration, 1);
        assert_eq!(streaks.nutrition, 0);
        assert_eq!(streaks.habits, 0);
    }

    #[test]
    fn test_habit_streak_counts_deleted_habit_history() {
        let (tracker, clock) = create_test_tracker();
        let id = tracker.add_habit("Meditate").unwrap()[0].id.clone();

        clock.advance_days(-1);
        tracker.toggle_habit_for_today(&id).unwrap();
        clock.advance_days(1);
        tracker.toggle_habit_for_today(&id).unwrap();
        tracker.delete_habit(&id).unwrap();

        assert_eq!(tracker.get_streaks().unwrap().habits, 2);
        let week = tracker.get_weekly_wellness_history().unwrap();
        assert_eq!(week[6].completed_habits, 1);
        assert_eq!(week[5].completed_habits, 1);
    }

    #[test]
    fn test_weekly_series_reads_all_sources() {
        let (tracker, clock) = create_test_tracker();
        clock.advance_days(-2);
        tracker
            .log_meal(MealEntry::new("Fish", MealStatus::Completed, true, 500))
            .unwrap();
        tracker.log_exercise(exercise(25)).unwrap();
        tracker.update_water(5).unwrap();
        tracker.log_sleep(8.0).unwrap();
        tracker.log_steps(12000).unwrap();
        clock.advance_days(2);

        let stats = tracker.get_weekly_detailed_stats().unwrap();
        assert_eq!(stats.len(), 7);
        assert_eq!(stats[4].nutrition_xp, 100);
        assert_eq!(stats[4].exercise_mins, 25);
        assert_eq!(stats[4].water_cups, 5);
        assert_eq!(stats[6].water_cups, 0);

        let wellness = tracker.get_weekly_wellness_history().unwrap();
        assert_eq!(wellness[4].sleep, 8.0);
        assert_eq!(wellness[4].steps, 12000);
        assert_eq!(wellness[6].steps, 0);
    }
}
