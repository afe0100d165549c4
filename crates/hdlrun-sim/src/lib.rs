//! hdlrun simulator dispatch
//!
//! This crate turns a uniform [`SimJob`] (sources, toplevel, parameters,
//! waveform target, seed, timescale, environment) into the command lines of
//! a specific simulator toolchain, and runs them.
//!
//! Supported toolchains:
//!
//! - Icarus Verilog (`iverilog` + `vvp`)
//! - Verilator (`verilator --binary`)
//! - GHDL (`ghdl`)
//! - NVC (`nvc`)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub mod exec;
pub mod job;
pub mod language;
pub mod plan;
pub mod simulators;
pub mod timescale;
pub mod waveform;

pub use exec::{execute, SimOutcome, StepReport};
pub use job::{ParamValue, SimJob};
pub use language::HdlLanguage;
pub use plan::{GeneratedFile, SimPlan, ToolInvocation, WaveformOutput};
pub use timescale::{TimeUnit, TimeValue, Timescale};
pub use waveform::WaveformFormat;

/// Simulator errors
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Unknown simulator: {0}. Supported: icarus, verilator, ghdl, nvc")]
    UnknownSimulator(String),
    #[error("Unknown HDL language: {0}")]
    UnknownLanguage(String),
    #[error("{simulator} does not support {language} sources")]
    UnsupportedLanguage {
        simulator: SimulatorKind,
        language: HdlLanguage,
    },
    #[error("No HDL sources given to {0}")]
    NoSources(SimulatorKind),
    #[error("Invalid extension for waveform: '{extension}'. Supported extensions are: vcd fst")]
    InvalidWaveform { extension: String },
    #[error("{simulator} doesn't support .{format} waveforms, only .{supported}")]
    UnsupportedWaveform {
        simulator: SimulatorKind,
        format: WaveformFormat,
        supported: WaveformFormat,
    },
    #[error("Invalid timescale: {0}")]
    InvalidTimescale(String),
    #[error("Tool not found: {0}")]
    ToolNotFound(String),
    #[error("Build failed: `{command}` exited with {status}\n{stderr}")]
    BuildFailed {
        command: String,
        status: String,
        stderr: String,
    },
    #[error("Test failed: `{command}` exited with {status}")]
    TestFailed { command: String, status: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for simulator operations
pub type SimResult<T> = Result<T, SimError>;

/// The simulator toolchains hdlrun can drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulatorKind {
    Icarus,
    Verilator,
    Ghdl,
    Nvc,
}

impl SimulatorKind {
    pub const ALL: [SimulatorKind; 4] = [
        SimulatorKind::Icarus,
        SimulatorKind::Verilator,
        SimulatorKind::Ghdl,
        SimulatorKind::Nvc,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SimulatorKind::Icarus => "icarus",
            SimulatorKind::Verilator => "verilator",
            SimulatorKind::Ghdl => "ghdl",
            SimulatorKind::Nvc => "nvc",
        }
    }

    /// Source languages the toolchain compiles
    pub fn languages(self) -> &'static [HdlLanguage] {
        match self {
            SimulatorKind::Icarus | SimulatorKind::Verilator => &[HdlLanguage::Verilog],
            SimulatorKind::Ghdl | SimulatorKind::Nvc => &[HdlLanguage::Vhdl],
        }
    }

    pub fn supports(self, language: HdlLanguage) -> bool {
        self.languages().contains(&language)
    }
}

impl fmt::Display for SimulatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SimulatorKind {
    type Err = SimError;

    fn from_str(s: &str) -> SimResult<Self> {
        SimulatorKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| SimError::UnknownSimulator(s.to_string()))
    }
}

/// A simulator toolchain integration
#[async_trait::async_trait]
pub trait Simulator: Send + Sync {
    /// Which toolchain this is
    fn kind(&self) -> SimulatorKind;

    /// Toolchain name
    fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Source languages the toolchain compiles
    fn languages(&self) -> &'static [HdlLanguage] {
        self.kind().languages()
    }

    /// Build the files and commands for a job without running anything
    fn plan(&self, job: &SimJob) -> SimResult<SimPlan>;

    /// Plan the job, then build and run it
    async fn build_and_run(&self, job: &SimJob) -> SimResult<SimOutcome> {
        let plan = self.plan(job)?;
        execute(&plan).await
    }
}

/// Create the simulator integration for a toolchain
pub fn create_simulator(kind: SimulatorKind) -> Box<dyn Simulator> {
    match kind {
        SimulatorKind::Icarus => Box::new(simulators::icarus::Icarus),
        SimulatorKind::Verilator => Box::new(simulators::verilator::Verilator),
        SimulatorKind::Ghdl => Box::new(simulators::ghdl::Ghdl),
        SimulatorKind::Nvc => Box::new(simulators::nvc::Nvc),
    }
}

/// List all supported simulators
pub fn available_simulators() -> Vec<SimulatorKind> {
    SimulatorKind::ALL.to_vec()
}
