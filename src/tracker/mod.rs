//! Wellness tracker
//!
//! The [`Tracker`] owns a [`KvStore`](crate::storage::KvStore), a [`Clock`]
//! and the [`ScoringRules`](crate::scoring::ScoringRules), and exposes every
//! read and write operation of the app:
//!
//! - **history**: meals and exercise in one tagged collection
//! - **hydration**: live daily water counter with history map
//! - **wellness**: sleep, steps, habits and module settings
//! - **pantry**: ingredient list and saved recipes
//! - **reports**: daily breakdown, streaks, weekly series
//! - **backup**: full-state export and atomic import
//!
//! Business-rule violations never error: bad numbers are clamped, unknown
//! ids are no-ops and corrupt blobs read as defaults. Only storage I/O fails.

pub mod backup;
pub mod clock;
pub mod engine;
pub mod history;
pub mod hydration;
pub mod pantry;
pub mod reports;
pub mod types;
pub mod wellness;

pub use backup::{BackupBundle, BackupError, BackupMeta, BACKUP_VERSION};
pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::{LoadReport, Tracker};
pub use history::{ExerciseEntry, MealEntry, DEFAULT_SUMMARY_HOURS};
pub use pantry::default_pantry;
pub use types::*;
pub use wellness::MAX_SLEEP_HOURS;
