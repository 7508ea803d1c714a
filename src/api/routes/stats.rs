//! Stats Routes
//!
//! Read-only aggregates, recomputed on every request.
//!
//! - GET /api/v1/stats/daily - Per-pillar breakdown for today
//! - GET /api/v1/stats/score - Today's total XP
//! - GET /api/v1/stats/streaks - Consecutive-day streaks
//! - GET /api/v1/stats/weekly - 7-day nutrition/exercise/water series
//! - GET /api/v1/stats/wellness - 7-day sleep/steps/habits series

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::ScoreResponse;
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::storage::StorageError;
use crate::tracker::{DailyBreakdown, Streaks, WeeklyStatsData, WellnessDay};

/// GET /api/v1/stats/daily
pub async fn daily_breakdown(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<DailyBreakdown>> {
    let breakdown = state.run(|tracker| tracker.get_daily_breakdown()).await?;
    Ok(Json(breakdown))
}

/// GET /api/v1/stats/score
pub async fn daily_score(State(state): State<Arc<AppState>>) -> ApiResult<Json<ScoreResponse>> {
    let (date, total_xp) = state
        .run(|tracker| Ok::<_, StorageError>((tracker.today(), tracker.get_daily_score()?)))
        .await?;
    Ok(Json(ScoreResponse { date, total_xp }))
}

/// GET /api/v1/stats/streaks
pub async fn streaks(State(state): State<Arc<AppState>>) -> ApiResult<Json<Streaks>> {
    let streaks = state.run(|tracker| tracker.get_streaks()).await?;
    Ok(Json(streaks))
}

/// GET /api/v1/stats/weekly
pub async fn weekly(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<WeeklyStatsData>>> {
    let week = state
        .run(|tracker| tracker.get_weekly_detailed_stats())
        .await?;
    Ok(Json(week))
}

/// GET /api/v1/stats/wellness
pub async fn wellness(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<WellnessDay>>> {
    let week = state
        .run(|tracker| tracker.get_weekly_wellness_history())
        .await?;
    Ok(Json(week))
}
