//! History Routes
//!
//! Meals and exercise share one history.
//!
//! - GET /api/v1/history - Unified history
//! - DELETE /api/v1/history/:id - Delete an item
//! - POST /api/v1/meals - Log a meal
//! - POST /api/v1/meals/judged - Log a meal from an advisory verdict
//! - POST /api/v1/meals/:id/confirm - Mark a pending meal as eaten
//! - POST /api/v1/exercises - Log exercise
//! - GET /api/v1/exercises/today - Today's exercise
//! - GET /api/v1/context - Plain-text digest of recent activity

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::dto::{
    ConfirmMealRequest, ContextParams, ContextResponse, JudgedMealRequest, LogExerciseRequest,
    LogMealRequest,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::tracker::{
    ExerciseEntry, ExerciseLog, HistoryItem, Intensity, MealEntry, DEFAULT_SUMMARY_HOURS,
};

/// GET /api/v1/history
pub async fn get_history(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<HistoryItem>>> {
    let items = state.run(|tracker| tracker.get_unified_history()).await?;
    Ok(Json(items))
}

/// DELETE /api/v1/history/:id
///
/// Unknown ids leave the history unchanged.
pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<HistoryItem>>> {
    let items = state.run(move |tracker| tracker.delete_item(&id)).await?;
    Ok(Json(items))
}

/// POST /api/v1/meals
pub async fn log_meal(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LogMealRequest>,
) -> ApiResult<(StatusCode, Json<Vec<HistoryItem>>)> {
    require_text("title", &req.title)?;

    let entry = MealEntry::new(req.title.trim(), req.status, req.is_healthy, req.calories)
        .notes(req.notes)
        .score(req.score_value)
        .consumed_at(req.consumed_at);

    let items = state.run(move |tracker| tracker.log_meal(entry)).await?;
    Ok((StatusCode::CREATED, Json(items)))
}

/// POST /api/v1/meals/judged
///
/// The verdict's score impact is clamped to the configured range.
pub async fn log_judged_meal(
    State(state): State<Arc<AppState>>,
    Json(req): Json<JudgedMealRequest>,
) -> ApiResult<(StatusCode, Json<Vec<HistoryItem>>)> {
    require_text("title", &req.title)?;

    let items = state
        .run(move |tracker| {
            tracker.log_judged_meal(req.title.trim(), req.status, &req.judgment, req.notes)
        })
        .await?;
    Ok((StatusCode::CREATED, Json(items)))
}

/// POST /api/v1/meals/:id/confirm
pub async fn confirm_meal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Option<Json<ConfirmMealRequest>>,
) -> ApiResult<Json<Vec<HistoryItem>>> {
    let notes = body.map(|Json(req)| req.notes).unwrap_or_default();
    let items = state
        .run(move |tracker| tracker.confirm_meal(&id, &notes))
        .await?;
    Ok(Json(items))
}

/// POST /api/v1/exercises
pub async fn log_exercise(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LogExerciseRequest>,
) -> ApiResult<(StatusCode, Json<Vec<HistoryItem>>)> {
    let entry = validate_exercise(req)?;
    let items = state.run(move |tracker| tracker.log_exercise(entry)).await?;
    Ok((StatusCode::CREATED, Json(items)))
}

/// GET /api/v1/exercises/today
pub async fn today_exercises(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<ExerciseLog>>> {
    let exercises = state.run(|tracker| tracker.get_today_exercises()).await?;
    Ok(Json(exercises))
}

/// GET /api/v1/context?hours=48
pub async fn recent_context(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ContextParams>,
) -> ApiResult<Json<ContextResponse>> {
    let hours = params.hours.unwrap_or(DEFAULT_SUMMARY_HOURS);
    let summary = state
        .run(move |tracker| tracker.recent_history_summary(hours))
        .await?;
    Ok(Json(ContextResponse { hours, summary }))
}

pub(crate) fn require_text(field: &str, value: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(ApiError::Validation(format!("{} cannot be empty", field)));
    }
    Ok(())
}

fn validate_exercise(req: LogExerciseRequest) -> ApiResult<ExerciseEntry> {
    require_text("name", &req.name)?;

    if req.duration == 0 {
        return Err(ApiError::Validation(
            "duration must be at least 1 minute".to_string(),
        ));
    }

    let intensity: Intensity = req.intensity.parse().map_err(ApiError::Validation)?;

    let time = req.time.unwrap_or_default();
    if !time.trim().is_empty() {
        let re = regex::Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$")
            .map_err(|_| ApiError::Internal("Regex error".to_string()))?;
        if !re.is_match(time.trim()) {
            return Err(ApiError::Validation(format!(
                "Invalid time '{}'. Use HH:MM",
                time
            )));
        }
    }

    Ok(ExerciseEntry {
        name: req.name.trim().to_string(),
        time: time.trim().to_string(),
        intensity,
        duration: req.duration,
        calories_burned: req.calories_burned,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(time: Option<&str>, intensity: &str, duration: u32) -> LogExerciseRequest {
        LogExerciseRequest {
            name: "Swim".to_string(),
            time: time.map(str::to_string),
            intensity: intensity.to_string(),
            duration,
            calories_burned: 300,
        }
    }

    #[test]
    fn test_validate_exercise() {
        let entry = validate_exercise(request(Some("06:30"), "high", 30)).unwrap();
        assert_eq!(entry.intensity, Intensity::High);
        assert_eq!(entry.time, "06:30");

        let entry = validate_exercise(request(None, "Media", 10)).unwrap();
        assert_eq!(entry.time, "");

        assert!(validate_exercise(request(Some("24:00"), "Alta", 30)).is_err());
        assert!(validate_exercise(request(Some("7:5"), "Alta", 30)).is_err());
        assert!(validate_exercise(request(None, "Alta", 0)).is_err());
        assert!(validate_exercise(request(None, "brutal", 30)).is_err());
    }
}
