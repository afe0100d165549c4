//! Error types for run manifests

use hdlrun_ports::PortPath;
use thiserror::Error;

/// Result type for manifest operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while loading a run manifest
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error reading the manifest file
    #[error("I/O error: {0}")]
    Io(String),

    /// TOML parsing error
    #[error("Failed to parse manifest: {0}")]
    Parse(String),

    /// Malformed signal in the design's port specification
    #[error("Invalid signal at {path}: {message}")]
    InvalidSignal { path: PortPath, message: String },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}
