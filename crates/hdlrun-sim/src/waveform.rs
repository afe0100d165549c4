//! Waveform output formats

use crate::{SimError, SimResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Waveform dump formats, chosen by the requested file's extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaveformFormat {
    Vcd,
    Fst,
}

impl WaveformFormat {
    pub fn extension(self) -> &'static str {
        match self {
            WaveformFormat::Vcd => "vcd",
            WaveformFormat::Fst => "fst",
        }
    }

    pub fn from_path(path: &Path) -> SimResult<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        match extension {
            "vcd" => Ok(WaveformFormat::Vcd),
            "fst" => Ok(WaveformFormat::Fst),
            other => Err(SimError::InvalidWaveform {
                extension: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for WaveformFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
