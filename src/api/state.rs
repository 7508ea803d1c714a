//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use crate::api::error::{ApiError, ApiResult};
use crate::config::ApiConfig;
use crate::tracker::Tracker;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Tracker holding all wellness state
    pub tracker: Arc<Tracker>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(tracker: Arc<Tracker>, config: ApiConfig) -> Self {
        Self {
            tracker,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Run a tracker operation on the blocking pool
    ///
    /// Tracker calls do synchronous file I/O and must stay off the async workers.
    pub async fn run<T, E, F>(&self, op: F) -> ApiResult<T>
    where
        F: FnOnce(&Tracker) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: Into<ApiError> + Send + 'static,
    {
        let tracker = Arc::clone(&self.tracker);
        tokio::task::spawn_blocking(move || op(&tracker))
            .await
            .map_err(|e| ApiError::Internal(format!("Tracker task failed: {}", e)))?
            .map_err(Into::into)
    }
}
