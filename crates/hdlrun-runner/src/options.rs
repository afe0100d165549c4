//! Run options

use crate::platform::Platform;
use hdlrun_sim::{HdlLanguage, ParamValue, SimulatorKind, Timescale};
use indexmap::IndexMap;
use std::path::PathBuf;

/// Everything that describes one run, before validation
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Toplevel module or entity; defaults to `top` for structured designs
    pub toplevel: Option<String>,
    /// Simulator name, resolved case-insensitively
    pub simulator: String,
    /// Language to emit the design in
    pub language: Option<HdlLanguage>,
    pub sources: IndexMap<HdlLanguage, Vec<PathBuf>>,
    pub waveform_file: Option<PathBuf>,
    /// Older spelling of `waveform_file`; setting both is an error
    pub vcd_file: Option<PathBuf>,
    pub seed: Option<u64>,
    pub extra_env: IndexMap<String, String>,
    /// Build directory; a temporary one is used when unset
    pub build_dir: Option<PathBuf>,
    pub parameters: IndexMap<String, ParamValue>,
    pub timescale: Timescale,
    pub extra_args: Vec<String>,
    pub platform: Option<Platform>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            toplevel: None,
            simulator: SimulatorKind::Icarus.name().to_string(),
            language: None,
            sources: IndexMap::new(),
            waveform_file: None,
            vcd_file: None,
            seed: None,
            extra_env: IndexMap::new(),
            build_dir: None,
            parameters: IndexMap::new(),
            timescale: Timescale::default(),
            extra_args: Vec::new(),
            platform: None,
        }
    }
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_toplevel(mut self, toplevel: impl Into<String>) -> Self {
        self.toplevel = Some(toplevel.into());
        self
    }

    pub fn with_simulator(mut self, simulator: impl Into<String>) -> Self {
        self.simulator = simulator.into();
        self
    }

    pub fn with_language(mut self, language: HdlLanguage) -> Self {
        self.language = Some(language);
        self
    }

    /// Append source files of one language
    pub fn with_sources<I, P>(mut self, language: HdlLanguage, files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.sources
            .entry(language)
            .or_default()
            .extend(files.into_iter().map(Into::into));
        self
    }

    pub fn with_waveform(mut self, path: impl Into<PathBuf>) -> Self {
        self.waveform_file = Some(path.into());
        self
    }

    #[deprecated(note = "use `with_waveform`")]
    pub fn with_vcd_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.vcd_file = Some(path.into());
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_env.insert(key.into(), value.into());
        self
    }

    pub fn with_build_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.build_dir = Some(dir.into());
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn with_timescale(mut self, timescale: Timescale) -> Self {
        self.timescale = timescale;
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

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }
}
