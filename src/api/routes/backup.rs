//! Backup Routes
//!
//! - GET /api/v1/backup - Download the full-state bundle
//! - POST /api/v1/backup - Restore a bundle (all keys or none)

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use std::sync::Arc;

use crate::api::dto::ImportResponse;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::tracker::BackupBundle;

/// GET /api/v1/backup
pub async fn export_backup(State(state): State<Arc<AppState>>) -> ApiResult<Response> {
    let bundle = state.run(|tracker| tracker.export_full_data()).await?;
    let body = serde_json::to_string_pretty(&bundle)
        .map_err(|e| ApiError::Internal(format!("Failed to encode backup: {}", e)))?;

    let filename = format!("nutriflex_backup_{}.json", Utc::now().format("%Y%m%d_%H%M%S"));

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response())
}

/// POST /api/v1/backup
///
/// Body is the bundle as produced by the export endpoint. Rejected bundles
/// leave the store untouched.
pub async fn import_backup(
    State(state): State<Arc<AppState>>,
    body: String,
) -> ApiResult<Json<ImportResponse>> {
    let bundle = BackupBundle::parse(&body)?;
    let keys = state.run(move |tracker| tracker.restore(&bundle)).await?;

    tracing::info!(keys, "Backup imported over HTTP");
    Ok(Json(ImportResponse {
        imported: true,
        keys,
    }))
}
