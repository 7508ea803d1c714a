//! Hydration Routes
//!
//! - GET /api/v1/water - Today's live counter
//! - POST /api/v1/water - Add or remove cups
//! - GET /api/v1/water/history - Cups per day

use axum::{extract::State, Json};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::api::dto::WaterRequest;
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::tracker::{CalendarDate, WaterData};

/// GET /api/v1/water
pub async fn get_water(State(state): State<Arc<AppState>>) -> ApiResult<Json<WaterData>> {
    let data = state.run(|tracker| tracker.get_water_data()).await?;
    Ok(Json(data))
}

/// POST /api/v1/water
///
/// The count is clamped at zero rather than rejected.
pub async fn update_water(
    State(state): State<Arc<AppState>>,
    Json(req): Json<WaterRequest>,
) -> ApiResult<Json<WaterData>> {
    let data = state
        .run(move |tracker| tracker.update_water(req.delta))
        .await?;
    Ok(Json(data))
}

/// GET /api/v1/water/history
pub async fn water_history(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<BTreeMap<CalendarDate, u32>>> {
    let history = state.run(|tracker| tracker.water_history()).await?;
    Ok(Json(history))
}
