//! Toplevel signals

use serde::{Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

/// Direction of a toplevel signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Input,
    Output,
    Inout,
}

impl Direction {
    /// Verilog port keyword
    pub fn verilog_keyword(self) -> &'static str {
        match self {
            Direction::Input => "input",
            Direction::Output => "output",
            Direction::Inout => "inout",
        }
    }

    /// VHDL port mode
    pub fn vhdl_mode(self) -> &'static str {
        match self {
            Direction::Input => "in",
            Direction::Output => "out",
            Direction::Inout => "inout",
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "in" | "input" => Ok(Direction::Input),
            "out" | "output" => Ok(Direction::Output),
            "inout" => Ok(Direction::Inout),
            other => Err(format!(
                "invalid direction '{}', expected one of: in, out, inout",
                other
            )),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.vhdl_mode())
    }
}

/// Bit width and signedness of a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Shape {
    pub width: u32,
    pub signed: bool,
}

impl Shape {
    pub fn unsigned(width: u32) -> Self {
        Self {
            width,
            signed: false,
        }
    }

    pub fn signed(width: u32) -> Self {
        Self {
            width,
            signed: true,
        }
    }
}

#[derive(Debug)]
struct SignalData {
    name: String,
    shape: Shape,
    direction: Direction,
}

/// A named terminal of a design
///
/// `Signal` is a handle: clones refer to the same signal, and equality and
/// hashing follow that identity rather than the name. Two signals created
/// separately with the same name are different signals.
#[derive(Clone)]
pub struct Signal(Arc<SignalData>);

impl Signal {
    /// Unsigned input signal of the given width
    pub fn new(name: impl Into<String>, width: u32) -> Self {
        Self::with_shape(name, Shape::unsigned(width), Direction::Input)
    }

    pub fn with_shape(name: impl Into<String>, shape: Shape, direction: Direction) -> Self {
        Self(Arc::new(SignalData {
            name: name.into(),
            shape,
            direction,
        }))
    }

    pub fn input(name: impl Into<String>, width: u32) -> Self {
        Self::with_shape(name, Shape::unsigned(width), Direction::Input)
    }

    pub fn output(name: impl Into<String>, width: u32) -> Self {
        Self::with_shape(name, Shape::unsigned(width), Direction::Output)
    }

    pub fn inout(name: impl Into<String>, width: u32) -> Self {
        Self::with_shape(name, Shape::unsigned(width), Direction::Inout)
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn shape(&self) -> Shape {
        self.0.shape
    }

    pub fn width(&self) -> u32 {
        self.0.shape.width
    }

    pub fn is_signed(&self) -> bool {
        self.0.shape.signed
    }

    pub fn direction(&self) -> Direction {
        self.0.direction
    }

    /// Whether both handles refer to the same signal
    pub fn ptr_eq(&self, other: &Signal) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn identity(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

impl PartialEq for Signal {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Signal {}

impl Hash for Signal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Signal({} {} {}{})",
            self.name(),
            self.direction(),
            if self.is_signed() { "s" } else { "u" },
            self.width()
        )
    }
}

impl Serialize for Signal {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Signal", 4)?;
        state.serialize_field("name", self.name())?;
        state.serialize_field("width", &self.width())?;
        state.serialize_field("signed", &self.is_signed())?;
        state.serialize_field("direction", &self.direction())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_identity() {
        let a = Signal::new("a", 8);
        let also_a = a.clone();
        let other_a = Signal::new("a", 8);

        assert_eq!(a, also_a);
        assert_ne!(a, other_a);
        assert!(a.ptr_eq(&also_a));
    }

    #[test]
    fn test_direction_parsing() {
        assert_eq!("in".parse::<Direction>(), Ok(Direction::Input));
        assert_eq!("OUTPUT".parse::<Direction>(), Ok(Direction::Output));
        assert_eq!("inout".parse::<Direction>(), Ok(Direction::Inout));
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn test_signal_debug() {
        let o = Signal::with_shape("o", Shape::signed(9), Direction::Output);
        assert_eq!(format!("{:?}", o), "Signal(o out s9)");
    }
}
