//! Run manifest structure definitions

use crate::error::{ConfigError, Result};
use crate::ports::ports_from_toml;
use hdlrun_ports::PortValue;
use hdlrun_runner::{DesignInput, Platform, RunOptions, WrapperDesign};
use hdlrun_sim::{HdlLanguage, ParamValue, SimulatorKind, Timescale, WaveformFormat};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Complete `hdlrun.toml` manifest
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunManifest {
    /// What to run and how
    #[serde(default)]
    pub run: RunSection,

    /// HDL source files per language name
    #[serde(default)]
    pub sources: IndexMap<String, Vec<PathBuf>>,

    /// Toplevel parameters or generics
    #[serde(default)]
    pub parameters: IndexMap<String, ParamValue>,

    /// Extra environment variables for the simulator
    #[serde(default)]
    pub env: IndexMap<String, String>,

    #[serde(default)]
    pub platform: PlatformSection,

    /// Structured design wrapping an HDL module
    #[serde(default)]
    pub design: Option<DesignSection>,
}

/// `[run]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunSection {
    #[serde(default)]
    pub toplevel: Option<String>,

    /// Simulator name (default: icarus)
    #[serde(default)]
    pub simulator: Option<String>,

    /// Language to emit the design in
    #[serde(default)]
    pub lang: Option<HdlLanguage>,

    /// Waveform output file (.vcd or .fst)
    #[serde(default)]
    pub waveform: Option<PathBuf>,

    /// Deprecated spelling of `waveform`
    #[serde(default)]
    pub vcd_file: Option<PathBuf>,

    #[serde(default)]
    pub seed: Option<u64>,

    /// HDL timescale, e.g. "1ns/1ps"
    #[serde(default)]
    pub timescale: Option<Timescale>,

    /// Build directory (default: a temporary directory)
    #[serde(default)]
    pub build_dir: Option<PathBuf>,

    #[serde(default)]
    pub extra_args: Vec<String>,
}

/// `[platform]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlatformSection {
    /// Extra files written into the build directory, by name
    #[serde(default)]
    pub extra_files: IndexMap<String, String>,
}

/// `[design]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DesignSection {
    /// HDL module wrapped by the generated toplevel
    pub module: String,

    /// Languages the wrapper may be emitted in (default: all)
    #[serde(default)]
    pub languages: Vec<HdlLanguage>,

    /// Port specification of the toplevel
    pub ports: toml::Value,
}

impl RunManifest {
    /// Validate the manifest
    pub fn validate(&self) -> Result<()> {
        let simulator = self.simulator()?;

        if self.run.toplevel.is_none() && self.design.is_none() {
            return Err(ConfigError::Validation(
                "run.toplevel is required when there is no [design] section".to_string(),
            ));
        }

        if self.run.waveform.is_some() && self.run.vcd_file.is_some() {
            return Err(ConfigError::Validation(
                "run.waveform and run.vcd_file can't be used at the same time".to_string(),
            ));
        }
        if let Some(file) = self.run.waveform.as_ref().or(self.run.vcd_file.as_ref()) {
            WaveformFormat::from_path(file)
                .map_err(|e| ConfigError::Validation(e.to_string()))?;
        }

        for (language, files) in self.languages()? {
            if !files.is_empty() && !simulator.supports(language) {
                return Err(ConfigError::Validation(format!(
                    "simulator {} doesn't support {} sources",
                    simulator, language
                )));
            }
        }

        if let Some(design) = &self.design {
            if design.module.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "design.module must not be empty".to_string(),
                ));
            }
            if let Some(language) = self.run.lang {
                if !simulator.supports(language) {
                    return Err(ConfigError::Validation(format!(
                        "simulator {} can't emit the design as {}",
                        simulator, language
                    )));
                }
            }
        }

        Ok(())
    }

    /// Source files keyed by parsed language
    pub fn languages(&self) -> Result<Vec<(HdlLanguage, &[PathBuf])>> {
        self.sources
            .iter()
            .map(|(name, files)| {
                let language = name
                    .parse::<HdlLanguage>()
                    .map_err(|e| ConfigError::Validation(e.to_string()))?;
                Ok((language, files.as_slice()))
            })
            .collect()
    }

    /// The configured simulator, defaulting to Icarus Verilog
    pub fn simulator(&self) -> Result<SimulatorKind> {
        match &self.run.simulator {
            Some(name) => name
                .parse()
                .map_err(|e: hdlrun_sim::SimError| ConfigError::Validation(e.to_string())),
            None => Ok(SimulatorKind::Icarus),
        }
    }

    /// Port specification of the design, if there is one
    pub fn port_spec(&self) -> Result<Option<PortValue>> {
        self.design
            .as_ref()
            .map(|design| ports_from_toml(&design.ports))
            .transpose()
    }

    /// The structured design described by the `[design]` section
    pub fn design_input(&self) -> Result<Option<DesignInput>> {
        let Some(design) = &self.design else {
            return Ok(None);
        };
        let mut wrapper = WrapperDesign::new(&design.module);
        if !design.languages.is_empty() {
            wrapper = wrapper.with_languages(design.languages.iter().copied());
        }
        let ports = ports_from_toml(&design.ports)?;
        Ok(Some(DesignInput::new(wrapper, ports)))
    }

    /// Convert into run options, resolving relative paths against `base_dir`
    pub fn into_options(self, base_dir: &Path) -> Result<RunOptions> {
        let simulator = self.simulator()?;
        let resolve = |path: PathBuf| base_dir.join(path);
        let sources: Vec<(HdlLanguage, Vec<PathBuf>)> = self
            .languages()?
            .into_iter()
            .map(|(language, files)| (language, files.iter().cloned().map(resolve).collect()))
            .collect();

        let mut options = RunOptions::new().with_simulator(simulator.name());
        options.toplevel = self.run.toplevel;
        options.language = self.run.lang;
        options.waveform_file = self.run.waveform.map(resolve);
        options.vcd_file = self.run.vcd_file.map(resolve);
        options.seed = self.run.seed;
        options.build_dir = self.run.build_dir.map(resolve);
        if let Some(timescale) = self.run.timescale {
            options.timescale = timescale;
        }
        options.extra_args = self.run.extra_args;
        options.parameters = self.parameters;
        options.extra_env = self.env;

        for (language, files) in sources {
            options = options.with_sources(language, files);
        }

        if !self.platform.extra_files.is_empty() {
            let mut platform = Platform::new();
            for (name, contents) in self.platform.extra_files {
                platform.add_file(name, contents);
            }
            options.platform = Some(platform);
        }

        debug!(
            "Run options: {} sources, simulator {}",
            options.sources.values().map(Vec::len).sum::<usize>(),
            options.simulator
        );
        Ok(options)
    }
}
