//! Wellness Routes
//!
//! - GET /api/v1/wellness/settings - Module toggles
//! - PUT /api/v1/wellness/settings - Save module toggles
//! - POST /api/v1/sleep - Set today's sleep
//! - GET /api/v1/sleep/today - Today's sleep (null if not logged)
//! - POST /api/v1/steps - Set today's steps
//! - GET /api/v1/steps/today - Today's steps
//! - GET /api/v1/habits - Habit definitions
//! - POST /api/v1/habits - Create a habit
//! - DELETE /api/v1/habits/:id - Delete a habit (its history is kept)
//! - POST /api/v1/habits/:id/toggle - Flip today's completion
//! - GET /api/v1/habits/today - Habits completed today

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::dto::{
    HabitRequest, SleepRequest, StepsRequest, TodayHabitsResponse, TodaySleepResponse,
    TodayStepsResponse, ToggleHabitResponse,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::routes::history::require_text;
use crate::api::state::AppState;
use crate::storage::StorageError;
use crate::tracker::{Habit, WellnessSettings, MAX_SLEEP_HOURS};

/// GET /api/v1/wellness/settings
pub async fn get_settings(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<WellnessSettings>> {
    let settings = state.run(|tracker| tracker.get_wellness_settings()).await?;
    Ok(Json(settings))
}

/// PUT /api/v1/wellness/settings
pub async fn save_settings(
    State(state): State<Arc<AppState>>,
    Json(settings): Json<WellnessSettings>,
) -> ApiResult<Json<WellnessSettings>> {
    let saved = state
        .run(move |tracker| tracker.save_wellness_settings(settings))
        .await?;
    Ok(Json(saved))
}

/// POST /api/v1/sleep
pub async fn log_sleep(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SleepRequest>,
) -> ApiResult<Json<TodaySleepResponse>> {
    if !req.hours.is_finite() || !(0.0..=MAX_SLEEP_HOURS).contains(&req.hours) {
        return Err(ApiError::Validation(format!(
            "hours must be between 0 and {}",
            MAX_SLEEP_HOURS
        )));
    }

    let (date, hours) = state
        .run(move |tracker| {
            let hours = tracker.log_sleep(req.hours)?;
            Ok::<_, StorageError>((tracker.today(), hours))
        })
        .await?;
    Ok(Json(TodaySleepResponse {
        date,
        hours: Some(hours),
    }))
}

/// GET /api/v1/sleep/today
pub async fn today_sleep(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<TodaySleepResponse>> {
    let (date, hours) = state
        .run(|tracker| {
            Ok::<_, StorageError>((tracker.today(), tracker.get_today_sleep()?))
        })
        .await?;
    Ok(Json(TodaySleepResponse { date, hours }))
}

/// POST /api/v1/steps
pub async fn log_steps(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StepsRequest>,
) -> ApiResult<Json<TodayStepsResponse>> {
    let (date, steps) = state
        .run(move |tracker| {
            let steps = tracker.log_steps(req.count)?;
            Ok::<_, StorageError>((tracker.today(), steps))
        })
        .await?;
    Ok(Json(TodayStepsResponse { date, steps }))
}

/// GET /api/v1/steps/today
pub async fn today_steps(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<TodayStepsResponse>> {
    let (date, steps) = state
        .run(|tracker| {
            Ok::<_, StorageError>((tracker.today(), tracker.get_today_steps()?))
        })
        .await?;
    Ok(Json(TodayStepsResponse { date, steps }))
}

/// GET /api/v1/habits
pub async fn list_habits(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Habit>>> {
    let habits = state.run(|tracker| tracker.get_habits()).await?;
    Ok(Json(habits))
}

/// POST /api/v1/habits
pub async fn add_habit(
    State(state): State<Arc<AppState>>,
    Json(req): Json<HabitRequest>,
) -> ApiResult<(StatusCode, Json<Vec<Habit>>)> {
    require_text("title", &req.title)?;
    let habits = state
        .run(move |tracker| tracker.add_habit(&req.title))
        .await?;
    Ok((StatusCode::CREATED, Json(habits)))
}

/// DELETE /api/v1/habits/:id
pub async fn delete_habit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Habit>>> {
    let habits = state.run(move |tracker| tracker.delete_habit(&id)).await?;
    Ok(Json(habits))
}

/// POST /api/v1/habits/:id/toggle
///
/// 404 for ids that are not active habits; the tracker itself ignores them.
pub async fn toggle_habit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<ToggleHabitResponse>> {
    let habit_id = id.clone();
    let (known, completed) = state
        .run(move |tracker| {
            let known = tracker.get_habits()?.iter().any(|h| h.id == habit_id);
            let completed = tracker.toggle_habit_for_today(&habit_id)?;
            Ok::<_, StorageError>((known, completed))
        })
        .await?;

    if !known {
        return Err(ApiError::NotFound(format!("Habit {} not found", id)));
    }
    Ok(Json(ToggleHabitResponse { id, completed }))
}

/// GET /api/v1/habits/today
pub async fn today_habits(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<TodayHabitsResponse>> {
    let (date, habit_ids) = state
        .run(|tracker| {
            Ok::<_, StorageError>((tracker.today(), tracker.get_today_habit_logs()?))
        })
        .await?;
    Ok(Json(TodayHabitsResponse { date, habit_ids }))
}
