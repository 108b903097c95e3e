//! Common types and utilities shared across the map-reviews crates.
//!
//! This crate defines the shared error type and the observability helpers
//! used throughout the workspace. It is intentionally lightweight so that
//! every crate can depend on it without pulling in the browser stack.
//!
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`MapReviewsError`] and [`Result`]: Shared error handling
//!
//! # Examples
//!
//! ```rust
//! use mapreviews_common::MapReviewsError;
//!
//! let err = MapReviewsError::Config("target_count must be at least 1".into());
//! assert_eq!(err.to_string(), "Configuration error: target_count must be at least 1");
//! ```
pub mod observability;

/// Error types used across the review harvester.
#[derive(thiserror::Error, Debug)]
pub enum MapReviewsError {
    /// A driver (browser session, element lookup, script) reported an error.
    #[error("Driver error: {0}")]
    Driver(#[from] anyhow::Error),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The business page could not be reached or searched for.
    #[error("Navigation error: {0}")]
    Navigation(String),

    /// Reading or writing a local file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The result batch could not be encoded.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Convenient alias for results that use [`MapReviewsError`].
pub type Result<T> = std::result::Result<T, MapReviewsError>;
