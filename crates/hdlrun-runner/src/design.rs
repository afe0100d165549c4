//! Structured designs

use hdlrun_ports::{IntoPorts, PortList, PortValue};
use hdlrun_sim::HdlLanguage;
use std::fmt;
use thiserror::Error;

/// Errors raised while emitting HDL for a design
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EmitError {
    #[error("design '{design}' cannot be emitted as {language}")]
    UnsupportedLanguage {
        design: String,
        language: HdlLanguage,
    },

    #[error("port '{port}' has zero width")]
    ZeroWidth { port: String },

    #[error("inner port '{inner}' is bound by both '{first}' and '{second}'")]
    DuplicateBinding {
        inner: String,
        first: String,
        second: String,
    },
}

/// A design that can render itself as HDL source
///
/// Emission receives the already flattened toplevel ports; each
/// [`PortEntry`](hdlrun_ports::PortEntry) becomes one port of `toplevel`
/// under its emitted name.
pub trait Design: Send + Sync {
    /// Short name used in logs and errors
    fn name_hint(&self) -> &str;

    /// Languages this design can be emitted in, in order of preference
    fn languages(&self) -> &[HdlLanguage];

    /// Emit the design as a module or entity named `toplevel`
    fn emit(
        &self,
        language: HdlLanguage,
        toplevel: &str,
        ports: &PortList,
    ) -> Result<String, EmitError>;

    fn can_emit(&self, language: HdlLanguage) -> bool {
        self.languages().contains(&language)
    }
}

/// A design together with the port specification of its toplevel
pub struct DesignInput {
    pub design: Box<dyn Design>,
    pub ports: PortValue,
}

impl DesignInput {
    pub fn new(design: impl Design + 'static, ports: impl IntoPorts) -> Self {
        Self {
            design: Box::new(design),
            ports: ports.into_ports(),
        }
    }
}

impl fmt::Debug for DesignInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DesignInput")
            .field("design", &self.design.name_hint())
            .field("ports", &self.ports)
            .finish()
    }
}
