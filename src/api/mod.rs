//! NutriFlex REST API
//!
//! HTTP layer over the [`Tracker`](crate::tracker::Tracker), built with Axum.
//!
//! # Endpoints
//!
//! ## History
//! - `GET /api/v1/history` - Unified meal/exercise history
//! - `DELETE /api/v1/history/:id` - Delete an item
//! - `POST /api/v1/meals` - Log a meal
//! - `POST /api/v1/meals/judged` - Log a meal from an advisory verdict
//! - `POST /api/v1/meals/:id/confirm` - Mark a pending meal as eaten
//! - `POST /api/v1/exercises` - Log exercise
//! - `GET /api/v1/exercises/today` - Today's exercise
//! - `GET /api/v1/context` - Recent activity digest
//!
//! ## Hydration
//! - `GET /api/v1/water` - Today's counter
//! - `POST /api/v1/water` - Add or remove cups
//! - `GET /api/v1/water/history` - Cups per day
//!
//! ## Wellness
//! - `GET|PUT /api/v1/wellness/settings` - Module toggles
//! - `POST /api/v1/sleep`, `GET /api/v1/sleep/today`
//! - `POST /api/v1/steps`, `GET /api/v1/steps/today`
//! - `GET|POST /api/v1/habits`, `DELETE /api/v1/habits/:id`
//! - `POST /api/v1/habits/:id/toggle`, `GET /api/v1/habits/today`
//!
//! ## Stats
//! - `GET /api/v1/stats/daily` - Per-pillar breakdown
//! - `GET /api/v1/stats/score` - Today's total XP
//! - `GET /api/v1/stats/streaks` - Streaks
//! - `GET /api/v1/stats/weekly` - 7-day activity series
//! - `GET /api/v1/stats/wellness` - 7-day wellness series
//!
//! ## Pantry
//! - `GET|POST /api/v1/pantry`, `DELETE /api/v1/pantry/:item`
//! - `GET|POST /api/v1/recipes`, `DELETE /api/v1/recipes/:id`
//!
//! ## Backup
//! - `GET /api/v1/backup` - Download the full-state bundle
//! - `POST /api/v1/backup` - Restore a bundle
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use nutriflex::api::{serve, AppState};
//! use nutriflex::config::ApiConfig;
//! use nutriflex::scoring::ScoringRules;
//! use nutriflex::storage::FileStore;
//! use nutriflex::tracker::{SystemClock, Tracker};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Arc::new(FileStore::open("./nutriflex_data")?);
//!     let tracker = Arc::new(Tracker::new(store, Arc::new(SystemClock), ScoringRules::default()));
//!     tracker.init()?;
//!
//!     let config = ApiConfig::default();
//!     serve(AppState::new(tracker, config.clone()), &config).await?;
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ApiConfig;

/// Largest accepted backup upload
const MAX_BACKUP_BYTES: usize = 16 * 1024 * 1024;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let backup_routes = Router::new()
        .route(
            "/backup",
            get(routes::backup::export_backup).post(routes::backup::import_backup),
        )
        .layer(DefaultBodyLimit::max(MAX_BACKUP_BYTES));

    let api_routes = Router::new()
        // History routes
        .route("/history", get(routes::history::get_history))
        .route("/history/:id", delete(routes::history::delete_item))
        .route("/meals", post(routes::history::log_meal))
        .route("/meals/judged", post(routes::history::log_judged_meal))
        .route("/meals/:id/confirm", post(routes::history::confirm_meal))
        .route("/exercises", post(routes::history::log_exercise))
        .route("/exercises/today", get(routes::history::today_exercises))
        .route("/context", get(routes::history::recent_context))
        // Hydration routes
        .route(
            "/water",
            get(routes::hydration::get_water).post(routes::hydration::update_water),
        )
        .route("/water/history", get(routes::hydration::water_history))
        // Wellness routes
        .route(
            "/wellness/settings",
            get(routes::wellness::get_settings).put(routes::wellness::save_settings),
        )
        .route("/sleep", post(routes::wellness::log_sleep))
        .route("/sleep/today", get(routes::wellness::today_sleep))
        .route("/steps", post(routes::wellness::log_steps))
        .route("/steps/today", get(routes::wellness::today_steps))
        .route(
            "/habits",
            get(routes::wellness::list_habits).post(routes::wellness::add_habit),
        )
        .route("/habits/today", get(routes::wellness::today_habits))
        .route("/habits/:id", delete(routes::wellness::delete_habit))
        .route("/habits/:id/toggle", post(routes::wellness::toggle_habit))
        // Stats routes
        .route("/stats/daily", get(routes::stats::daily_breakdown))
        .route("/stats/score", get(routes::stats::daily_score))
        .route("/stats/streaks", get(routes::stats::streaks))
        .route("/stats/weekly", get(routes::stats::weekly))
        .route("/stats/wellness", get(routes::stats::wellness))
        // Pantry routes
        .route(
            "/pantry",
            get(routes::pantry::get_pantry).post(routes::pantry::add_to_pantry),
        )
        .route("/pantry/:item", delete(routes::pantry::remove_from_pantry))
        .route(
            "/recipes",
            get(routes::pantry::list_recipes).post(routes::pantry::add_recipe),
        )
        .route("/recipes/:id", delete(routes::pantry::remove_recipe))
        .merge(backup_routes);

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let cors = cors_layer(&state.config.cors_origins);
    let timeout = TimeoutLayer::new(Duration::from_secs(state.config.request_timeout_secs));

    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(timeout)
        .layer(cors)
        .with_state(shared_state)
}

/// CORS for the configured origins; no origins means any
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("NutriFlex API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("NutriFlex API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
