//! Error types for hierarchy configuration.
//!
//! Construction and traversal are infallible; only loading settings and
//! setting up worker pools can fail.

use thiserror::Error;

/// Errors that can occur while configuring BVH construction.
#[derive(Error, Debug)]
pub enum BvhError {
    /// Settings failed validation.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Settings name a builder the registry does not know.
    #[error("unknown BVH implementation: {0}")]
    UnknownBuilder(String),

    /// Settings could not be parsed from TOML.
    #[error("failed to parse settings: {0}")]
    Toml(#[from] toml::de::Error),

    /// Settings could not be parsed from JSON.
    #[error("failed to parse settings: {0}")]
    Json(#[from] serde_json::Error),

    /// The dedicated sort pool could not be created.
    #[error("failed to create sort pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Result type for BVH configuration.
pub type Result<T> = std::result::Result<T, BvhError>;
