//! PhD Tracker Common Library
//!
//! Shared code for the tracker binaries including:
//! - Database models, schema bootstrap and repository
//! - Entity reconciliation (name resolution, association sync, professor upsert)
//! - Aggregate reporting
//! - Error types and handling
//! - Configuration management
//! - Metrics and observability

pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;
pub mod reconcile;
pub mod report;

// Re-export commonly used types
pub use config::AppConfig;
pub use db::{DbPool, Repository};
pub use errors::{AppError, Result};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
