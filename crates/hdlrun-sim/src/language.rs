//! HDL source languages

use crate::{SimError, SimResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Hardware description languages understood by the simulators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HdlLanguage {
    Verilog,
    Vhdl,
}

impl HdlLanguage {
    pub const ALL: [HdlLanguage; 2] = [HdlLanguage::Verilog, HdlLanguage::Vhdl];

    pub fn name(self) -> &'static str {
        match self {
            HdlLanguage::Verilog => "verilog",
            HdlLanguage::Vhdl => "vhdl",
        }
    }

    /// File extensions recognized for this language, without the dot
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            HdlLanguage::Verilog => &["v", "sv"],
            HdlLanguage::Vhdl => &["vhd", "vhdl"],
        }
    }

    /// Extension used for generated files
    pub fn default_extension(self) -> &'static str {
        self.extensions()[0]
    }

    /// Language of a file extension (without the dot), case-insensitive
    pub fn from_extension(extension: &str) -> Option<Self> {
        HdlLanguage::ALL.into_iter().find(|language| {
            language
                .extensions()
                .iter()
                .any(|ext| ext.eq_ignore_ascii_case(extension))
        })
    }

    /// Language of a file, judged by its extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

impl fmt::Display for HdlLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HdlLanguage {
    type Err = SimError;

    fn from_str(s: &str) -> SimResult<Self> {
        HdlLanguage::ALL
            .into_iter()
            .find(|language| language.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| SimError::UnknownLanguage(s.to_string()))
    }
}
