//! # NutriFlex
//!
//! Gamified personal wellness tracker: meals, exercise and hydration earn
//! daily XP, optional modules track sleep, steps and habits, and every
//! collection can be exported and restored as a single bundle.
//!
//! ## Features
//!
//! - **Daily scoring**: per-pillar XP with goals and a nutrition floor
//! - **Streaks**: consecutive-day runs, today counted only once active
//! - **Weekly series**: fixed 7-day charts for activity and wellness
//! - **Durability**: one JSON blob per collection, written atomically
//! - **Backup**: checksummed bundle, all-or-nothing restore
//!
//! ## Modules
//!
//! - [`storage`]: Key-value persistence seam and backends
//! - [`tracker`]: Every read and write operation of the app
//! - [`scoring`]: Pure breakdown, streak and weekly computations
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML configuration with environment overrides
//! - [`logging`]: `tracing` subscriber setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nutriflex::scoring::ScoringRules;
//! use nutriflex::storage::FileStore;
//! use nutriflex::tracker::{MealEntry, MealStatus, SystemClock, Tracker};
//! use std::sync::Arc;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(FileStore::open("./nutriflex_data")?);
//!     let tracker = Tracker::new(store, Arc::new(SystemClock), ScoringRules::default());
//!     tracker.init()?;
//!
//!     tracker.log_meal(MealEntry::new("Ensalada de quinoa", MealStatus::Completed, true, 420))?;
//!     tracker.update_water(2)?;
//!
//!     let today = tracker.get_daily_breakdown()?;
//!     println!("Today: {} XP", today.total_xp);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod logging;
pub mod scoring;
pub mod storage;
pub mod tracker;

// Re-export top-level types for convenience
pub use storage::{FileStore, KvStore, MemoryStore, StateKey, StorageError, StorageResult};

pub use tracker::{
    BackupBundle, BackupError, Clock, DailyBreakdown, HistoryItem, Streaks, SystemClock, Tracker,
};

pub use scoring::ScoringRules;

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{ApiConfig, Config, ConfigError, LoggingConfig, StorageConfig};
