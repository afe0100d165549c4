//! Planned tool invocations

use crate::SimulatorKind;
use indexmap::IndexMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Render a path as a command-line argument
pub(crate) fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// One external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub env: IndexMap<String, String>,
}

impl ToolInvocation {
    pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
            env: IndexMap::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn path(self, path: &Path) -> Self {
        self.arg(path_arg(path))
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn paths<'a, I>(self, paths: I) -> Self
    where
        I: IntoIterator<Item = &'a PathBuf>,
    {
        self.args(paths.into_iter().map(|path| path_arg(path)))
    }

    pub fn envs(mut self, env: &IndexMap<String, String>) -> Self {
        self.env
            .extend(env.iter().map(|(key, value)| (key.clone(), value.clone())));
        self
    }

    /// Whether any argument equals `arg`
    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }

    /// Shell-like rendering for logs and dry runs
    pub fn command_line(&self) -> String {
        std::iter::once(&self.program)
            .chain(self.args.iter())
            .map(|word| quote(word))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=+:,@%".contains(c));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

impl fmt::Display for ToolInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

/// A file the simulator integration writes before building
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub contents: String,
}

impl GeneratedFile {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }
}

/// How the requested waveform file comes into existence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaveformOutput {
    /// The simulator writes the requested file itself
    Direct(PathBuf),
    /// The simulator writes `from` inside the build directory; it is copied
    /// to `to` after the run
    Copy { from: PathBuf, to: PathBuf },
}

impl WaveformOutput {
    /// Path of the requested waveform file
    pub fn target(&self) -> &Path {
        match self {
            WaveformOutput::Direct(path) => path,
            WaveformOutput::Copy { to, .. } => to,
        }
    }
}

/// The files and commands of one simulation
#[derive(Debug, Clone)]
pub struct SimPlan {
    pub simulator: SimulatorKind,
    pub files: Vec<GeneratedFile>,
    pub build: Vec<ToolInvocation>,
    pub run: Vec<ToolInvocation>,
    pub waveform: Option<WaveformOutput>,
}

impl SimPlan {
    pub fn new(simulator: SimulatorKind) -> Self {
        Self {
            simulator,
            files: Vec::new(),
            build: Vec::new(),
            run: Vec::new(),
            waveform: None,
        }
    }

    /// All commands in execution order
    pub fn commands(&self) -> impl Iterator<Item = &ToolInvocation> {
        self.build.iter().chain(self.run.iter())
    }
}
