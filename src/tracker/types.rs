//! Core data types for the NutriFlex tracker
//!
//! This module defines the records persisted by the tracker and the shapes
//! returned by its read APIs:
//! - `CalendarDate`: local calendar day, canonical `YYYY-MM-DD`
//! - `HistoryItem`: tagged union of `MealLog` and `ExerciseLog`
//! - `WaterData`, `WellnessSettings`, `Habit`, `HabitLog`, `UserRecipe`
//! - `DailyBreakdown`, `Streaks`, `WeeklyStatsData`, `WellnessDay`
//!
//! Persisted field names are camelCase so blobs written by earlier app
//! versions stay readable. Numeric fields decode leniently (see [`lenient`]).

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use thiserror::Error;

/// A calendar day in the user's local time zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CalendarDate(NaiveDate);

/// Failed to parse a calendar date string
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid calendar date: {0}")]
pub struct CalendarDateError(pub String);

impl CalendarDate {
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn from_naive(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn naive(&self) -> NaiveDate {
        self.0
    }

    /// The day before, `None` at the start of the representable range
    pub fn previous(&self) -> Option<Self> {
        self.0.pred_opt().map(Self)
    }

    /// The day `n` days earlier
    pub fn days_before(&self, n: u64) -> Option<Self> {
        self.0.checked_sub_days(Days::new(n)).map(Self)
    }

    /// Short weekday label ("Mon", "Tue", ...)
    pub fn weekday_label(&self) -> String {
        self.0.format("%a").to_string()
    }
}

impl std::fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for CalendarDate {
    type Err = CalendarDateError;

    /// Accepts `2024-06-05` and the legacy unpadded `2024-6-5`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CalendarDateError(s.to_string());
        let mut parts = s.trim().splitn(3, '-');

        let year: i32 = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
        let month: u32 = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
        let day: u32 = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;

        Self::from_ymd(year, month, day).ok_or_else(invalid)
    }
}

impl Serialize for CalendarDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CalendarDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Tolerant decoders for numbers written by a loosely-typed client
pub mod lenient {
    use serde::{Deserialize, Deserializer};

    fn to_count(value: f64) -> u32 {
        if value.is_finite() && value > 0.0 {
            value.round().min(u32::MAX as f64) as u32
        } else {
            0
        }
    }

    /// Non-negative integer; floats are rounded, negatives become 0
    pub fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        Ok(to_count(f64::deserialize(deserializer)?))
    }

    /// Optional signed integer; floats are rounded, null is `None`
    pub fn opt_score<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<i32>, D::Error> {
        let value = Option::<f64>::deserialize(deserializer)?;
        Ok(value
            .filter(|v| v.is_finite())
            .map(|v| v.round().clamp(i32::MIN as f64, i32::MAX as f64) as i32))
    }

    /// Signed integer; floats are rounded
    pub fn score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
        Ok(opt_score(deserializer)?.unwrap_or(0))
    }

    /// Optional epoch-millisecond instant
    pub fn opt_millis<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<i64>, D::Error> {
        let value = Option::<f64>::deserialize(deserializer)?;
        Ok(value.filter(|v| v.is_finite()).map(|v| v.round() as i64))
    }

    /// Epoch-millisecond instant
    pub fn millis<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        Ok(opt_millis(deserializer)?.unwrap_or(0))
    }

    /// Text where null means empty
    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
    }
}

/// Whether a meal is planned or already eaten
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MealStatus {
    /// Intend to cook/eat; never scored
    Pending,
    /// Consumed; scored on the day of `consumedAt`
    Completed,
}

/// Exercise intensity (wire values are the app's original labels)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Intensity {
    #[serde(rename = "Baja")]
    Low,
    #[serde(rename = "Media")]
    Medium,
    #[serde(rename = "Alta")]
    High,
    #[serde(rename = "Extrema")]
    Extreme,
}

impl Intensity {
    pub fn label(&self) -> &'static str {
        match self {
            Intensity::Low => "Baja",
            Intensity::Medium => "Media",
            Intensity::High => "Alta",
            Intensity::Extreme => "Extrema",
        }
    }
}

impl FromStr for Intensity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "baja" | "low" => Ok(Intensity::Low),
            "media" | "medium" => Ok(Intensity::Medium),
            "alta" | "high" => Ok(Intensity::High),
            "extrema" | "extreme" => Ok(Intensity::Extreme),
            other => Err(format!("Unknown intensity: {}", other)),
        }
    }
}

impl std::fmt::Display for Intensity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A meal entry in the unified history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MealLog {
    pub id: String,
    /// Creation instant (epoch ms)
    #[serde(deserialize_with = "lenient::millis")]
    pub timestamp: i64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::count")]
    pub calories: u32,
    #[serde(default)]
    pub is_healthy: bool,
    /// Explicit XP delta; overrides the healthy/unhealthy default
    #[serde(
        default,
        deserialize_with = "lenient::opt_score",
        skip_serializing_if = "Option::is_none"
    )]
    pub score_value: Option<i32>,
    pub status: MealStatus,
    /// Completion instant; set iff status is completed
    #[serde(
        default,
        deserialize_with = "lenient::opt_millis",
        skip_serializing_if = "Option::is_none"
    )]
    pub consumed_at: Option<i64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub user_notes: String,
}

impl MealLog {
    pub fn is_completed(&self) -> bool {
        self.status == MealStatus::Completed
    }

    /// Instant this meal counts toward, if it counts at all
    pub fn scored_at(&self) -> Option<i64> {
        if self.is_completed() {
            self.consumed_at
        } else {
            None
        }
    }
}

/// An exercise entry in the unified history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseLog {
    pub id: String,
    /// Instant the entry was recorded (epoch ms)
    #[serde(deserialize_with = "lenient::millis")]
    pub timestamp: i64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    /// Wall-clock "HH:MM" the activity happened
    #[serde(default, deserialize_with = "lenient::text")]
    pub time: String,
    pub intensity: Intensity,
    /// Minutes
    #[serde(default, deserialize_with = "lenient::count")]
    pub duration: u32,
    #[serde(default, deserialize_with = "lenient::count")]
    pub calories_burned: u32,
}

/// One entry of the unified meal/exercise history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HistoryItem {
    Meal(MealLog),
    Exercise(ExerciseLog),
}

impl HistoryItem {
    pub fn id(&self) -> &str {
        match self {
            HistoryItem::Meal(m) => &m.id,
            HistoryItem::Exercise(e) => &e.id,
        }
    }

    pub fn timestamp(&self) -> i64 {
        match self {
            HistoryItem::Meal(m) => m.timestamp,
            HistoryItem::Exercise(e) => e.timestamp,
        }
    }

    pub fn as_meal(&self) -> Option<&MealLog> {
        match self {
            HistoryItem::Meal(m) => Some(m),
            HistoryItem::Exercise(_) => None,
        }
    }

    pub fn as_exercise(&self) -> Option<&ExerciseLog> {
        match self {
            HistoryItem::Exercise(e) => Some(e),
            HistoryItem::Meal(_) => None,
        }
    }
}

/// Live hydration record for one day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WaterData {
    pub date: CalendarDate,
    #[serde(default, deserialize_with = "lenient::count")]
    pub count: u32,
    #[serde(default, deserialize_with = "lenient::millis")]
    pub last_sip_timestamp: i64,
}

/// Which optional wellness modules are collected and shown
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WellnessSettings {
    #[serde(default)]
    pub enable_sleep: bool,
    #[serde(default)]
    pub enable_steps: bool,
    #[serde(default)]
    pub enable_habits: bool,
}

/// A user-defined habit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Habit {
    pub id: String,
    pub title: String,
}

/// A habit marked done on a given day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HabitLog {
    pub date: CalendarDate,
    pub habit_id: String,
}

/// Macro estimate attached to a saved recipe
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecipeMacros {
    #[serde(default)]
    pub calories: String,
    #[serde(default)]
    pub protein: String,
    #[serde(default)]
    pub carbs: String,
    #[serde(default)]
    pub fats: String,
}

/// A recipe saved by the user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRecipe {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub macros: Option<RecipeMacros>,
}

/// Verdict produced by the external advisory service for a meal
///
/// Treated as untrusted; see [`MealJudgment::clamped_score`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MealJudgment {
    pub is_healthy: bool,
    #[serde(default, deserialize_with = "lenient::count")]
    pub calories: u32,
    #[serde(default, deserialize_with = "lenient::score")]
    pub score_impact: i32,
    #[serde(default, deserialize_with = "lenient::text")]
    pub reason: String,
}

impl MealJudgment {
    /// Score impact forced into `[min, max]`
    pub fn clamped_score(&self, min: i32, max: i32) -> i32 {
        self.score_impact.clamp(min, max.max(min))
    }
}

/// Progress of one pillar for today
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricBreakdown {
    pub current: u32,
    pub max: u32,
    /// `min(current / max, 1)`
    pub percent: f64,
    pub label: String,
}

impl MetricBreakdown {
    pub fn new(current: u32, max: u32, label: impl Into<String>) -> Self {
        let percent = if max == 0 {
            if current > 0 {
                1.0
            } else {
                0.0
            }
        } else {
            (current as f64 / max as f64).min(1.0)
        };

        Self {
            current,
            max,
            percent,
            label: label.into(),
        }
    }
}

/// Today's score across the three pillars
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyBreakdown {
    pub nutrition: MetricBreakdown,
    pub exercise: MetricBreakdown,
    pub hydration: MetricBreakdown,
    /// Signed nutrition sum before the zero floor
    pub nutrition_raw: i64,
    #[serde(rename = "totalXP")]
    pub total_xp: u32,
}

/// Consecutive-day streak per pillar
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Streaks {
    pub nutrition: u32,
    pub exercise: u32,
    pub hydration: u32,
    pub habits: u32,
}

/// One day of the weekly chart series
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyStatsData {
    pub day: String,
    pub date: CalendarDate,
    #[serde(rename = "nutritionXP")]
    pub nutrition_xp: u32,
    pub exercise_mins: u32,
    pub water_cups: u32,
}

/// One day of the weekly wellness series
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WellnessDay {
    pub date: CalendarDate,
    pub day_name: String,
    pub sleep: f64,
    pub steps: u32,
    pub completed_habits: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calendar_date_canonical_encoding() {
        let date = CalendarDate::from_ymd(2024, 3, 5).unwrap();
        assert_eq!(date.to_string(), "2024-03-05");
    }

    #[test]
    fn test_calendar_date_parses_legacy_unpadded_keys() {
        let legacy: CalendarDate = "2024-3-5".parse().unwrap();
        let canonical: CalendarDate = "2024-03-05".parse().unwrap();
        assert_eq!(legacy, canonical);

        assert!("2024-13-01".parse::<CalendarDate>().is_err());
        assert!("yesterday".parse::<CalendarDate>().is_err());
    }

    #[test]
    fn test_calendar_date_arithmetic() {
        let date = CalendarDate::from_ymd(2024, 3, 1).unwrap();
        assert_eq!(date.previous(), CalendarDate::from_ymd(2024, 2, 29));
        assert_eq!(date.days_before(6), CalendarDate::from_ymd(2024, 2, 24));
        assert_eq!(date.weekday_label(), "Fri");
    }

    #[test]
    fn test_history_item_tagging() {
        let json = r#"{"type":"exercise","id":"1","timestamp":1000,"name":"Run","time":"07:30","intensity":"Alta","duration":30,"caloriesBurned":300}"#;
        let item: HistoryItem = serde_json::from_str(json).unwrap();

        let exercise = item.as_exercise().unwrap();
        assert_eq!(exercise.intensity, Intensity::High);
        assert_eq!(exercise.duration, 30);

        let back = serde_json::to_value(&item).unwrap();
        assert_eq!(back["type"], "exercise");
        assert_eq!(back["caloriesBurned"], 300);
    }

    #[test]
    fn test_meal_log_lenient_numbers() {
        let json = r#"{"type":"meal","id":"7","timestamp":1000.0,"title":"Tacos","calories":450.6,"isHealthy":false,"scoreValue":-49.6,"status":"completed","consumedAt":2000,"userNotes":null}"#;
        let item: HistoryItem = serde_json::from_str(json).unwrap();
        let meal = item.as_meal().unwrap();

        assert_eq!(meal.calories, 451);
        assert_eq!(meal.score_value, Some(-50));
        assert_eq!(meal.consumed_at, Some(2000));
        assert_eq!(meal.user_notes, "");
        assert_eq!(meal.scored_at(), Some(2000));
    }

    #[test]
    fn test_pending_meal_is_never_scored() {
        let meal = MealLog {
            id: "1".to_string(),
            timestamp: 0,
            title: "Soup".to_string(),
            calories: 200,
            is_healthy: true,
            score_value: None,
            status: MealStatus::Pending,
            consumed_at: Some(5),
            user_notes: String::new(),
        };
        assert_eq!(meal.scored_at(), None);
    }

    #[test]
    fn test_metric_breakdown_percent_clamps() {
        assert_eq!(MetricBreakdown::new(100, 500, "").percent, 0.2);
        assert_eq!(MetricBreakdown::new(900, 300, "").percent, 1.0);
        assert_eq!(MetricBreakdown::new(0, 0, "").percent, 0.0);
    }

    #[test]
    fn test_judgment_clamp() {
        let judgment = MealJudgment {
            is_healthy: true,
            calories: 500,
            score_impact: 900,
            reason: "very healthy".to_string(),
        };
        assert_eq!(judgment.clamped_score(-100, 150), 150);

        let judgment = MealJudgment {
            score_impact: -400,
            ..judgment
        };
        assert_eq!(judgment.clamped_score(-100, 150), -100);
    }

    #[test]
    fn test_breakdown_wire_names() {
        let breakdown = DailyBreakdown {
            nutrition: MetricBreakdown::new(0, 500, "0 XP"),
            exercise: MetricBreakdown::new(0, 300, "0 XP"),
            hydration: MetricBreakdown::new(0, 200, "0/8 cups"),
            nutrition_raw: -50,
            total_xp: 0,
        };
        let json = serde_json::to_value(&breakdown).unwrap();
        assert_eq!(json["totalXP"], 0);
        assert_eq!(json["nutritionRaw"], -50);
    }
}
