//! Weekly aggregates
//!
//! Fixed-length series, oldest to newest, ending today. Days without data
//! report zeros (indistinguishable from a logged zero).

use crate::scoring::breakdown::{exercise_minutes_for_day, floor_xp, nutrition_raw_for_day};
use crate::scoring::ScoringRules;
use crate::tracker::clock::Clock;
use crate::tracker::types::{CalendarDate, HabitLog, HistoryItem, WeeklyStatsData, WellnessDay};
use std::collections::{BTreeMap, HashSet};

/// Number of days in every weekly series
pub const WEEK_LENGTH: u64 = 7;

/// The seven calendar days ending at `today`, oldest first
fn week_ending(today: CalendarDate) -> Vec<CalendarDate> {
    (0..WEEK_LENGTH)
        .rev()
        .filter_map(|back| today.days_before(back))
        .collect()
}

/// Nutrition XP, exercise minutes and water cups per day
///
/// Nutrition is floored at zero per day.
pub fn weekly_detailed_stats(
    items: &[HistoryItem],
    water_history: &BTreeMap<CalendarDate, u32>,
    clock: &dyn Clock,
    rules: &ScoringRules,
) -> Vec<WeeklyStatsData> {
    week_ending(clock.today())
        .into_iter()
        .map(|day| WeeklyStatsData {
            day: day.weekday_label(),
            date: day,
            nutrition_xp: floor_xp(nutrition_raw_for_day(items, day, clock, rules)),
            exercise_mins: exercise_minutes_for_day(items, day, clock),
            water_cups: water_history.get(&day).copied().unwrap_or(0),
        })
        .collect()
}

/// Sleep hours, steps and distinct completed habits per day
pub fn weekly_wellness_history(
    sleep: &BTreeMap<CalendarDate, f64>,
    steps: &BTreeMap<CalendarDate, u32>,
    habit_logs: &[HabitLog],
    today: CalendarDate,
) -> Vec<WellnessDay> {
    week_ending(today)
        .into_iter()
        .map(|day| {
            let completed: HashSet<&str> = habit_logs
                .iter()
                .filter(|log| log.date == day)
                .map(|log| log.habit_id.as_str())
                .collect();

            WellnessDay {
                date: day,
                day_name: day.weekday_label(),
                sleep: sleep.get(&day).copied().unwrap_or(0.0),
                steps: steps.get(&day).copied().unwrap_or(0),
                completed_habits: completed.len() as u32,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::clock::FixedClock;
    use crate::tracker::types::{ExerciseLog, Intensity, MealLog, MealStatus};

    fn today() -> CalendarDate {
        CalendarDate::from_ymd(2024, 6, 15).unwrap()
    }

    fn completed_meal(id: &str, healthy: bool, at: i64) -> HistoryItem {
        HistoryItem::Meal(MealLog {
            id: id.to_string(),
            timestamp: at,
            title: "Bowl".to_string(),
            calories: 500,
            is_healthy: healthy,
            score_value: None,
            status: MealStatus::Completed,
            consumed_at: Some(at),
            user_notes: String::new(),
        })
    }

    #[test]
    fn test_week_is_seven_days_ending_today() {
        let clock = FixedClock::on(today(), 9);
        let stats = weekly_detailed_stats(&[], &BTreeMap::new(), &clock, &ScoringRules::default());

        assert_eq!(stats.len(), 7);
        assert_eq!(stats[0].date, CalendarDate::from_ymd(2024, 6, 9).unwrap());
        assert_eq!(stats[6].date, today());
        assert_eq!(stats[6].day, "Sat");
        assert!(stats.iter().all(|d| d.nutrition_xp == 0 && d.water_cups == 0));
    }

    #[test]
    fn test_per_day_values() {
        let clock = FixedClock::on(today(), 9);
        let two_days_ago = today().days_before(2).unwrap();
        let at = clock.local_millis(two_days_ago, 13);

        let items = vec![
            completed_meal("1", true, at),
            completed_meal("2", false, clock.now_millis()),
            HistoryItem::Exercise(ExerciseLog {
                id: "3".to_string(),
                timestamp: at,
                name: "Swim".to_string(),
                time: "13:00".to_string(),
                intensity: Intensity::High,
                duration: 45,
                calories_burned: 400,
            }),
        ];
        let mut water = BTreeMap::new();
        water.insert(two_days_ago, 6);

        let stats = weekly_detailed_stats(&items, &water, &clock, &ScoringRules::default());

        assert_eq!(stats[4].nutrition_xp, 100);
        assert_eq!(stats[4].exercise_mins, 45);
        assert_eq!(stats[4].water_cups, 6);
        // -50 today floors to 0 for that day only
        assert_eq!(stats[6].nutrition_xp, 0);
    }

    #[test]
    fn test_wellness_history_defaults_and_distinct_habits() {
        let mut sleep = BTreeMap::new();
        sleep.insert(today(), 7.5);
        let mut steps = BTreeMap::new();
        steps.insert(today().previous().unwrap(), 9000);

        let logs = vec![
            HabitLog {
                date: today(),
                habit_id: "read".to_string(),
            },
            HabitLog {
                date: today(),
                habit_id: "stretch".to_string(),
            },
            HabitLog {
                date: today(),
                habit_id: "read".to_string(),
            },
        ];

        let history = weekly_wellness_history(&sleep, &steps, &logs, today());

        assert_eq!(history.len(), 7);
        assert_eq!(history[6].sleep, 7.5);
        assert_eq!(history[6].steps, 0);
        assert_eq!(history[6].completed_habits, 2);
        assert_eq!(history[5].steps, 9000);
        assert_eq!(history[0].sleep, 0.0);
    }
}
