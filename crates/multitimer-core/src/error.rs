//! Core error types for multitimer-core.
//!
//! A failing collaborator is fatal to the triggering operation only. Per-id
//! lifecycle state is committed after the external calls that can fail, so
//! every operation that returns one of these errors is safe to retry.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for multitimer-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Deadline scheduler errors
    #[error("Deadline scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    /// Alert presentation errors
    #[error("Alert presenter error: {0}")]
    Presenter(#[from] PresenterError),

    /// Wake retention errors
    #[error("Wake retention error: {0}")]
    Wake(#[from] WakeError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Payload serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Deadline-scheduler-specific errors.
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// No async runtime to run the arming on
    #[error("No async runtime available to arm deadlines")]
    RuntimeUnavailable,

    /// The delivery channel has been dropped by the host
    #[error("Deadline delivery channel closed")]
    DeliveryClosed,

    /// The underlying scheduling service failed
    #[error("Scheduler backend failure: {0}")]
    Backend(String),
}

/// Alert-presenter-specific errors.
#[derive(Error, Debug)]
pub enum PresenterError {
    /// The alert service cannot be reached
    #[error("Alert service unavailable")]
    Unavailable,

    /// The underlying presentation service failed
    #[error("Presenter backend failure: {0}")]
    Backend(String),
}

/// Wake-retention-specific errors.
#[derive(Error, Debug)]
pub enum WakeError {
    /// No async runtime to time out the retention on
    #[error("No async runtime available to bound the wake retention")]
    RuntimeUnavailable,

    /// The underlying wake primitive failed
    #[error("Wake retention backend failure: {0}")]
    Backend(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// No usable configuration directory
    #[error("Could not determine a configuration directory")]
    NoConfigDir,
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
