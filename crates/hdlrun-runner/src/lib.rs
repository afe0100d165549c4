//! hdlrun run orchestration
//!
//! Turns [`RunOptions`] and an optional structured design into a validated
//! [`SimJob`](hdlrun_sim::SimJob): it resolves the simulator, collects HDL
//! sources, writes platform extra files and the design's HDL output into the
//! build directory, and hands the job to the simulator.

use hdlrun_ports::FlattenError;
use hdlrun_sim::{HdlLanguage, SimError, SimulatorKind};
use std::path::PathBuf;
use thiserror::Error;

pub mod design;
pub mod options;
pub mod platform;
pub mod run;
pub mod wrapper;

pub use design::{Design, DesignInput, EmitError};
pub use options::RunOptions;
pub use platform::Platform;
pub use run::{prepare, run, PreparedRun, DEFAULT_TOPLEVEL, DESIGN_OUTPUT_STEM};
pub use wrapper::WrapperDesign;

/// Run orchestration errors
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Top-level name must be provided if no design is given")]
    MissingToplevel,

    #[error("Unknown simulator: {0}")]
    UnknownSimulator(String),

    #[error("Simulator {simulator} only supports {supported}, can't use requested language {language}")]
    UnsupportedLanguage {
        simulator: SimulatorKind,
        language: HdlLanguage,
        supported: String,
    },

    #[error("Simulator {simulator} doesn't support {language} sources")]
    UnsupportedSources {
        simulator: SimulatorKind,
        language: HdlLanguage,
    },

    #[error("Name collision for file: {0}")]
    NameCollision(String),

    #[error("Failed to find language for simulator {simulator} that supports file {name}")]
    UnknownFileLanguage {
        simulator: SimulatorKind,
        name: String,
    },

    #[error("Failed to select HDL language for design output from options: {options}")]
    NoDesignLanguage { options: String },

    #[error("No HDL input specified")]
    NoHdlInput,

    #[error("Both waveform_file and vcd_file can't be used at the same time")]
    ConflictingWaveform,

    #[error("Invalid port specification: {0}")]
    Ports(#[from] FlattenError),

    #[error("Design emission failed: {0}")]
    Emit(#[from] EmitError),

    #[error(transparent)]
    Sim(#[from] SimError),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl RunnerError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| RunnerError::Io { path, source }
    }
}

/// Result type for run orchestration
pub type RunnerResult<T> = Result<T, RunnerError>;

/// Human-readable list of languages, e.g. `verilog or vhdl`
pub(crate) fn language_list(languages: &[HdlLanguage]) -> String {
    if languages.is_empty() {
        return "no language".to_string();
    }
    languages
        .iter()
        .map(|language| language.name())
        .collect::<Vec<_>>()
        .join(" or ")
}
