//! Error types for port flattening

use crate::path::PortPath;
use thiserror::Error;

/// Result type for port flattening
pub type Result<T> = std::result::Result<T, FlattenError>;

/// Errors raised while flattening a port specification
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlattenError {
    /// A container references one of its ancestors
    #[error("cyclic port structure: {path} refers back to {ancestor}")]
    CyclicStructure { path: PortPath, ancestor: PortPath },

    /// A leaf is neither a signal nor a container
    #[error("unsupported port type at {path}: {found}")]
    UnsupportedPortType { path: PortPath, found: String },

    /// Two distinct signals resolve to the same port name
    #[error("duplicate port name '{name}' at {first} and {second}")]
    DuplicatePortName {
        name: String,
        first: PortPath,
        second: PortPath,
    },
}

impl FlattenError {
    /// Path of the offending value in the original structure
    pub fn path(&self) -> &PortPath {
        match self {
            FlattenError::CyclicStructure { path, .. } => path,
            FlattenError::UnsupportedPortType { path, .. } => path,
            FlattenError::DuplicatePortName { second, .. } => second,
        }
    }
}
