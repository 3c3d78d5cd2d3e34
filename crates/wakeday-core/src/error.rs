//! Core error types for wakeday-core.
//!
//! The interactive paths never propagate these: clock-time and key parsing
//! degrade to defaults, and document persistence reports success as a
//! boolean. Errors are reserved for the configuration and logging edges,
//! where the host can still meaningfully report a setup problem.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for wakeday-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Document persistence errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to read the document file
    #[error("failed to read document at {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the document file
    #[error("failed to write document at {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document file exists but does not decode
    #[error("document at {path} is not valid JSON: {message}")]
    Corrupt { path: PathBuf, message: String },
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Could not determine or create the data directory
    #[error("could not prepare data directory: {0}")]
    DataDir(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
