//! API Routes
//!
//! Route handlers organized by functionality.

pub mod backup;
pub mod health;
pub mod history;
pub mod hydration;
pub mod pantry;
pub mod stats;
pub mod wellness;
