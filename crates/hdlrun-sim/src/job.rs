//! Simulator-independent description of a simulation

use crate::{HdlLanguage, SimError, SimResult, SimulatorKind, Timescale, WaveformFormat};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Value of a design parameter (Verilog) or generic (VHDL)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl ParamValue {
    /// Literal accepted by Verilog toolchains on the command line
    pub fn verilog_literal(&self) -> String {
        match self {
            ParamValue::Bool(value) => u8::from(*value).to_string(),
            ParamValue::Int(value) => value.to_string(),
            ParamValue::Str(value) => format!("\"{}\"", value.replace('"', "\\\"")),
        }
    }

    /// Value accepted by VHDL toolchains as a generic override
    pub fn vhdl_literal(&self) -> String {
        match self {
            ParamValue::Bool(value) => value.to_string(),
            ParamValue::Int(value) => value.to_string(),
            ParamValue::Str(value) => value.clone(),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(value) => write!(f, "{}", value),
            ParamValue::Int(value) => write!(f, "{}", value),
            ParamValue::Str(value) => write!(f, "{}", value),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Int(value.into())
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

/// Everything a simulator needs to build and run one design
#[derive(Debug, Clone)]
pub struct SimJob {
    /// Name of the toplevel module or entity
    pub toplevel: String,
    /// Source files per language, in compilation order
    pub sources: IndexMap<HdlLanguage, Vec<PathBuf>>,
    /// Toplevel parameters or generics
    pub parameters: IndexMap<String, ParamValue>,
    /// Requested waveform file
    pub waveform: Option<PathBuf>,
    /// Seed for simulation randomness
    pub seed: Option<u64>,
    pub timescale: Timescale,
    /// Extra environment variables for every tool invocation
    pub extra_env: IndexMap<String, String>,
    /// Directory holding all build artifacts
    pub build_dir: PathBuf,
    /// Extra compilation arguments
    pub extra_args: Vec<String>,
}

impl SimJob {
    pub fn new(toplevel: impl Into<String>, build_dir: impl Into<PathBuf>) -> Self {
        Self {
            toplevel: toplevel.into(),
            sources: IndexMap::new(),
            parameters: IndexMap::new(),
            waveform: None,
            seed: None,
            timescale: Timescale::default(),
            extra_env: IndexMap::new(),
            build_dir: build_dir.into(),
            extra_args: Vec::new(),
        }
    }

    pub fn with_source(mut self, language: HdlLanguage, path: impl Into<PathBuf>) -> Self {
        self.sources.entry(language).or_default().push(path.into());
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn with_waveform(mut self, path: impl Into<PathBuf>) -> Self {
        self.waveform = Some(path.into());
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_timescale(mut self, timescale: Timescale) -> Self {
        self.timescale = timescale;
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_env.insert(key.into(), value.into());
        self
    }

    pub fn with_extra_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Source files of one language
    pub fn sources_for(&self, language: HdlLanguage) -> &[PathBuf] {
        self.sources
            .get(&language)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn has_sources(&self) -> bool {
        self.sources.values().any(|files| !files.is_empty())
    }

    /// Format of the requested waveform, if any
    pub fn waveform_format(&self) -> SimResult<Option<WaveformFormat>> {
        self.waveform
            .as_deref()
            .map(WaveformFormat::from_path)
            .transpose()
    }

    /// Requested waveform as an absolute path
    pub fn absolute_waveform(&self) -> SimResult<Option<PathBuf>> {
        self.waveform
            .as_deref()
            .map(std::path::absolute)
            .transpose()
            .map_err(SimError::from)
    }

    /// Environment passed to every tool invocation
    pub fn environment(&self) -> IndexMap<String, String> {
        let mut env = self.extra_env.clone();
        if let Some(seed) = self.seed {
            env.insert("RANDOM_SEED".to_string(), seed.to_string());
        }
        env
    }

    /// Check that every source language can be compiled by `simulator`
    pub fn check_languages(&self, simulator: SimulatorKind) -> SimResult<()> {
        for (language, files) in &self.sources {
            if !files.is_empty() && !simulator.supports(*language) {
                return Err(SimError::UnsupportedLanguage {
                    simulator,
                    language: *language,
                });
            }
        }
        if !self.has_sources() {
            return Err(SimError::NoSources(simulator));
        }
        Ok(())
    }

    pub fn build_path(&self, name: impl AsRef<Path>) -> PathBuf {
        self.build_dir.join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_literals() {
        assert_eq!(ParamValue::Int(8).verilog_literal(), "8");
        assert_eq!(ParamValue::Bool(true).verilog_literal(), "1");
        assert_eq!(ParamValue::from("fast").verilog_literal(), "\"fast\"");
        assert_eq!(ParamValue::Bool(false).vhdl_literal(), "false");
        assert_eq!(ParamValue::from("fast").vhdl_literal(), "fast");
    }

    #[test]
    fn test_param_value_untagged() {
        let params: IndexMap<String, ParamValue> =
            serde_json::from_str(r#"{"WIDTH": 8, "MODE": "fast", "DEBUG": true}"#).unwrap();
        assert_eq!(params["WIDTH"], ParamValue::Int(8));
        assert_eq!(params["MODE"], ParamValue::from("fast"));
        assert_eq!(params["DEBUG"], ParamValue::Bool(true));
    }

    #[test]
    fn test_language_check() {
        let job = SimJob::new("top", "/tmp/build").with_source(HdlLanguage::Vhdl, "top.vhd");
        assert!(job.check_languages(SimulatorKind::Ghdl).is_ok());
        assert!(matches!(
            job.check_languages(SimulatorKind::Icarus),
            Err(SimError::UnsupportedLanguage {
                language: HdlLanguage::Vhdl,
                ..
            })
        ));

        let empty = SimJob::new("top", "/tmp/build");
        assert!(matches!(
            empty.check_languages(SimulatorKind::Icarus),
            Err(SimError::NoSources(SimulatorKind::Icarus))
        ));
    }

    #[test]
    fn test_environment_includes_seed() {
        let job = SimJob::new("top", "/tmp/build")
            .with_env("N_TESTS", "10")
            .with_seed(1234);
        let env = job.environment();
        assert_eq!(env["N_TESTS"], "10");
        assert_eq!(env["RANDOM_SEED"], "1234");
    }
}
