//! Daily breakdown
//!
//! - nutrition = sum of XP of meals completed today (signed); shown floored at 0
//! - exercise  = minutes logged today × `xp_per_exercise_minute`
//! - hydration = cups today × `xp_per_water_cup`
//! - total     = max(0, nutrition) + exercise + hydration

use crate::scoring::ScoringRules;
use crate::tracker::clock::Clock;
use crate::tracker::types::{
    CalendarDate, DailyBreakdown, HistoryItem, MealLog, MetricBreakdown,
};

/// XP a completed meal is worth: explicit score, else the verdict default
pub fn meal_xp(meal: &MealLog, rules: &ScoringRules) -> i64 {
    meal.score_value
        .unwrap_or_else(|| rules.default_meal_xp(meal.is_healthy)) as i64
}

/// Signed nutrition XP of meals consumed on `day`
pub fn nutrition_raw_for_day(
    items: &[HistoryItem],
    day: CalendarDate,
    clock: &dyn Clock,
    rules: &ScoringRules,
) -> i64 {
    items
        .iter()
        .filter_map(HistoryItem::as_meal)
        .filter(|meal| {
            meal.scored_at()
                .and_then(|at| clock.date_of(at))
                .map(|d| d == day)
                .unwrap_or(false)
        })
        .map(|meal| meal_xp(meal, rules))
        .sum()
}

/// Exercise minutes recorded on `day`
pub fn exercise_minutes_for_day(
    items: &[HistoryItem],
    day: CalendarDate,
    clock: &dyn Clock,
) -> u32 {
    items
        .iter()
        .filter_map(HistoryItem::as_exercise)
        .filter(|ex| clock.date_of(ex.timestamp) == Some(day))
        .fold(0u32, |acc, ex| acc.saturating_add(ex.duration))
}

/// Today's per-pillar progress
///
/// `water_cups` is today's live hydration count.
pub fn daily_breakdown(
    items: &[HistoryItem],
    water_cups: u32,
    clock: &dyn Clock,
    rules: &ScoringRules,
) -> DailyBreakdown {
    let today = clock.today();

    let nutrition_raw = nutrition_raw_for_day(items, today, clock, rules);
    let nutrition_xp = floor_xp(nutrition_raw);

    let exercise_xp = exercise_minutes_for_day(items, today, clock)
        .saturating_mul(rules.xp_per_exercise_minute);

    let hydration_xp = water_cups.saturating_mul(rules.xp_per_water_cup);

    tracing::trace!(
        %today,
        nutrition_raw,
        exercise_xp,
        hydration_xp,
        "Computed daily breakdown"
    );

    DailyBreakdown {
        nutrition: MetricBreakdown::new(
            nutrition_xp,
            rules.nutrition_goal,
            format!("{} XP", nutrition_xp),
        ),
        exercise: MetricBreakdown::new(
            exercise_xp,
            rules.exercise_goal,
            format!("{} XP", exercise_xp),
        ),
        hydration: MetricBreakdown::new(
            hydration_xp,
            rules.hydration_goal,
            format!("{}/{} cups", water_cups, rules.daily_cup_goal),
        ),
        nutrition_raw,
        total_xp: nutrition_xp
            .saturating_add(exercise_xp)
            .saturating_add(hydration_xp),
    }
}

/// Signed XP clamped into `[0, u32::MAX]`
pub(crate) fn floor_xp(raw: i64) -> u32 {
    raw.clamp(0, u32::MAX as i64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::clock::FixedClock;
    use crate::tracker::types::{ExerciseLog, Intensity, MealStatus};

    fn today() -> CalendarDate {
        CalendarDate::from_ymd(2024, 6, 15).unwrap()
    }

    fn meal(id: &str, healthy: bool, score: Option<i32>, consumed_at: Option<i64>) -> HistoryItem {
        HistoryItem::Meal(MealLog {
            id: id.to_string(),
            timestamp: consumed_at.unwrap_or(0),
            title: format!("meal {}", id),
            calories: 400,
            is_healthy: healthy,
            score_value: score,
            status: if consumed_at.is_some() {
                MealStatus::Completed
            } else {
                MealStatus::Pending
            },
            consumed_at,
            user_notes: String::new(),
        })
    }

    fn exercise(id: &str, minutes: u32, at: i64) -> HistoryItem {
        HistoryItem::Exercise(ExerciseLog {
            id: id.to_string(),
            timestamp: at,
            name: "Run".to_string(),
            time: "07:00".to_string(),
            intensity: Intensity::Medium,
            duration: minutes,
            calories_burned: 200,
        })
    }

    #[test]
    fn test_empty_day() {
        let clock = FixedClock::on(today(), 12);
        let breakdown = daily_breakdown(&[], 0, &clock, &ScoringRules::default());

        assert_eq!(breakdown.total_xp, 0);
        assert_eq!(breakdown.nutrition.current, 0);
        assert_eq!(breakdown.hydration.label, "0/8 cups");
    }

    #[test]
    fn test_example_scenario() {
        let clock = FixedClock::on(today(), 12);
        let now = clock.now_millis();
        let items = vec![meal("1", true, None, Some(now)), exercise("2", 30, now)];

        let breakdown = daily_breakdown(&items, 4, &clock, &ScoringRules::default());

        assert_eq!(breakdown.nutrition.current, 100);
        assert_eq!(breakdown.nutrition.percent, 0.2);
        assert_eq!(breakdown.exercise.current, 150);
        assert_eq!(breakdown.exercise.percent, 0.5);
        assert_eq!(breakdown.hydration.current, 100);
        assert_eq!(breakdown.hydration.percent, 0.5);
        assert_eq!(breakdown.total_xp, 350);
    }

    #[test]
    fn test_negative_nutrition_floors_at_zero() {
        let clock = FixedClock::on(today(), 12);
        let now = clock.now_millis();
        let items = vec![
            meal("1", false, None, Some(now)),
            meal("2", false, None, Some(now)),
            exercise("3", 10, now),
        ];

        let breakdown = daily_breakdown(&items, 0, &clock, &ScoringRules::default());

        assert_eq!(breakdown.nutrition_raw, -100);
        assert_eq!(breakdown.nutrition.current, 0);
        assert_eq!(breakdown.nutrition.percent, 0.0);
        assert_eq!(breakdown.total_xp, 50);
    }

    #[test]
    fn test_explicit_score_overrides_verdict() {
        let clock = FixedClock::on(today(), 12);
        let now = clock.now_millis();
        let items = vec![
            meal("1", false, Some(50), Some(now)),
            meal("2", true, Some(-20), Some(now)),
        ];

        let breakdown = daily_breakdown(&items, 0, &clock, &ScoringRules::default());
        assert_eq!(breakdown.nutrition_raw, 30);
    }

    #[test]
    fn test_only_today_and_completed_count() {
        let clock = FixedClock::on(today(), 12);
        let yesterday = clock.local_millis(today().previous().unwrap(), 20);
        let items = vec![
            meal("1", true, None, Some(yesterday)),
            meal("2", true, None, None),
            exercise("3", 60, yesterday),
        ];

        let breakdown = daily_breakdown(&items, 0, &clock, &ScoringRules::default());
        assert_eq!(breakdown.total_xp, 0);
    }

    #[test]
    fn test_percent_never_exceeds_one() {
        let clock = FixedClock::on(today(), 12);
        let now = clock.now_millis();
        let items = vec![exercise("1", 200, now)];

        let breakdown = daily_breakdown(&items, 20, &clock, &ScoringRules::default());
        assert_eq!(breakdown.exercise.current, 1000);
        assert_eq!(breakdown.exercise.percent, 1.0);
        assert_eq!(breakdown.hydration.percent, 1.0);
    }
}
