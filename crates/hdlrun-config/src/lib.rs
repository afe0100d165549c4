//! hdlrun run manifests
//!
//! This crate handles parsing and validation of `hdlrun.toml` files, which
//! describe the sources, simulator settings and optional structured design of
//! a run, and converts them into [`RunOptions`](hdlrun_runner::RunOptions).

pub mod error;
pub mod manifest;
pub mod ports;

pub use error::{ConfigError, Result};
pub use manifest::{DesignSection, PlatformSection, RunManifest, RunSection};
pub use ports::ports_from_toml;

use std::path::Path;

/// Default manifest file name
pub const MANIFEST_NAME: &str = "hdlrun.toml";

/// Parse a manifest from a file path
pub fn from_path(path: impl AsRef<Path>) -> Result<RunManifest> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
    from_str(&contents)
}

/// Parse a manifest from a string
pub fn from_str(s: &str) -> Result<RunManifest> {
    toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
}
