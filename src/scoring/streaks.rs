//! Streak Calculator
//!
//! A streak is the run of consecutive active days ending today, or ending
//! yesterday when nothing has been logged yet today (today is still open).
//! A full day without activity breaks it.

use crate::tracker::clock::Clock;
use crate::tracker::types::{CalendarDate, HabitLog, HistoryItem, Streaks};
use std::collections::{BTreeMap, HashSet};

/// Days with at least one qualifying activity, per pillar
#[derive(Debug, Clone, Default)]
pub struct ActivityDays {
    /// Days with a completed meal (by `consumedAt`)
    pub nutrition: HashSet<CalendarDate>,
    /// Days with an exercise log (by `timestamp`)
    pub exercise: HashSet<CalendarDate>,
    /// Days whose historical water count is above zero
    pub hydration: HashSet<CalendarDate>,
    /// Days with any habit completion
    pub habits: HashSet<CalendarDate>,
}

impl ActivityDays {
    /// Index every persisted activity by local calendar day
    pub fn collect(
        items: &[HistoryItem],
        water_history: &BTreeMap<CalendarDate, u32>,
        habit_logs: &[HabitLog],
        clock: &dyn Clock,
    ) -> Self {
        let mut days = Self::default();

        for item in items {
            match item {
                HistoryItem::Meal(meal) => {
                    if let Some(day) = meal.scored_at().and_then(|at| clock.date_of(at)) {
                        days.nutrition.insert(day);
                    }
                }
                HistoryItem::Exercise(ex) => {
                    if let Some(day) = clock.date_of(ex.timestamp) {
                        days.exercise.insert(day);
                    }
                }
            }
        }

        days.hydration = water_history
            .iter()
            .filter(|(_, &cups)| cups > 0)
            .map(|(&day, _)| day)
            .collect();

        days.habits = habit_logs.iter().map(|log| log.date).collect();

        days
    }
}

/// Length of the active run ending at `today` (or yesterday if today is empty)
///
/// Cost is proportional to the streak length; the reported value has no cap.
pub fn streak_ending_at<F>(today: CalendarDate, had_activity: F) -> u32
where
    F: Fn(CalendarDate) -> bool,
{
    let start = if had_activity(today) {
        today
    } else {
        match today.previous() {
            Some(yesterday) if had_activity(yesterday) => yesterday,
            _ => return 0,
        }
    };

    let mut streak = 0u32;
    let mut cursor = Some(start);
    while let Some(day) = cursor {
        if !had_activity(day) {
            break;
        }
        streak = streak.saturating_add(1);
        cursor = day.previous();
    }
    streak
}

/// Streaks for all four pillars
pub fn compute_streaks(days: &ActivityDays, today: CalendarDate) -> Streaks {
    Streaks {
        nutrition: streak_ending_at(today, |d| days.nutrition.contains(&d)),
        exercise: streak_ending_at(today, |d| days.exercise.contains(&d)),
        hydration: streak_ending_at(today, |d| days.hydration.contains(&d)),
        habits: streak_ending_at(today, |d| days.habits.contains(&d)),
    }
}
