//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! Field names are camelCase like the persisted records they wrap.

use serde::{Deserialize, Serialize};

use crate::storage::StateKey;
use crate::tracker::{CalendarDate, MealJudgment, MealStatus};

// ============================================
// HISTORY DTOs
// ============================================

fn default_completed() -> MealStatus {
    MealStatus::Completed
}

/// Meal log request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogMealRequest {
    pub title: String,
    #[serde(default = "default_completed")]
    pub status: MealStatus,
    pub is_healthy: bool,
    #[serde(default)]
    pub calories: u32,
    #[serde(default)]
    pub notes: String,
    /// Explicit XP delta, overrides the healthy/unhealthy default
    #[serde(default)]
    pub score_value: Option<i32>,
    /// Completion instant (ms since epoch) for completed meals
    #[serde(default)]
    pub consumed_at: Option<i64>,
}

/// Meal log request carrying an advisory verdict
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgedMealRequest {
    pub title: String,
    #[serde(default = "default_completed")]
    pub status: MealStatus,
    pub judgment: MealJudgment,
    #[serde(default)]
    pub notes: String,
}

/// Meal confirmation request
#[derive(Debug, Default, Deserialize)]
pub struct ConfirmMealRequest {
    #[serde(default)]
    pub notes: String,
}

/// Exercise log request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogExerciseRequest {
    pub name: String,
    /// "HH:MM"; defaults to now
    #[serde(default)]
    pub time: Option<String>,
    /// Baja/Media/Alta/Extrema or low/medium/high/extreme
    pub intensity: String,
    /// Minutes
    pub duration: u32,
    #[serde(default)]
    pub calories_burned: u32,
}

/// Recent activity digest query
#[derive(Debug, Deserialize)]
pub struct ContextParams {
    #[serde(default)]
    pub hours: Option<u32>,
}

/// Recent activity digest
#[derive(Debug, Serialize)]
pub struct ContextResponse {
    pub hours: u32,
    pub summary: String,
}

// ============================================
// HYDRATION DTOs
// ============================================

/// Water adjustment request
#[derive(Debug, Deserialize)]
pub struct WaterRequest {
    /// Cups to add (negative to remove)
    pub delta: i64,
}

// ============================================
// WELLNESS DTOs
// ============================================

/// Sleep log request
#[derive(Debug, Deserialize)]
pub struct SleepRequest {
    pub hours: f64,
}

/// Steps log request
#[derive(Debug, Deserialize)]
pub struct StepsRequest {
    pub count: u32,
}

/// Today's sleep entry
#[derive(Debug, Serialize)]
pub struct TodaySleepResponse {
    pub date: CalendarDate,
    /// `null` when not logged yet
    pub hours: Option<f64>,
}

/// Today's steps entry
#[derive(Debug, Serialize)]
pub struct TodayStepsResponse {
    pub date: CalendarDate,
    pub steps: u32,
}

/// Habit creation request
#[derive(Debug, Deserialize)]
pub struct HabitRequest {
    pub title: String,
}

/// Result of toggling a habit
#[derive(Debug, Serialize)]
pub struct ToggleHabitResponse {
    pub id: String,
    pub completed: bool,
}

/// Habits completed today
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayHabitsResponse {
    pub date: CalendarDate,
    pub habit_ids: Vec<String>,
}

// ============================================
// STATS DTOs
// ============================================

/// Today's total
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResponse {
    pub date: CalendarDate,
    #[serde(rename = "totalXP")]
    pub total_xp: u32,
}

// ============================================
// PANTRY DTOs
// ============================================

/// Pantry item request
#[derive(Debug, Deserialize)]
pub struct PantryItemRequest {
    pub item: String,
}

// ============================================
// BACKUP DTOs
// ============================================

/// Backup import result
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub imported: bool,
    /// Number of collections written
    pub keys: usize,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: healthy, degraded, unhealthy
    pub status: String,
    /// Storage status
    pub storage: String,
    /// Collections reset to defaults after being found corrupt
    pub recovered: Vec<StateKey>,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}
