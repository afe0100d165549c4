//! Verilog-style timescales

use crate::{SimError, SimResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Time units accepted in a timescale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    S,
    Ms,
    Us,
    Ns,
    Ps,
    Fs,
}

impl TimeUnit {
    pub fn suffix(self) -> &'static str {
        match self {
            TimeUnit::S => "s",
            TimeUnit::Ms => "ms",
            TimeUnit::Us => "us",
            TimeUnit::Ns => "ns",
            TimeUnit::Ps => "ps",
            TimeUnit::Fs => "fs",
        }
    }

    /// Power of ten of one unit expressed in femtoseconds
    fn exponent(self) -> u32 {
        match self {
            TimeUnit::S => 15,
            TimeUnit::Ms => 12,
            TimeUnit::Us => 9,
            TimeUnit::Ns => 6,
            TimeUnit::Ps => 3,
            TimeUnit::Fs => 0,
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "s" => Some(TimeUnit::S),
            "ms" => Some(TimeUnit::Ms),
            "us" => Some(TimeUnit::Us),
            "ns" => Some(TimeUnit::Ns),
            "ps" => Some(TimeUnit::Ps),
            "fs" => Some(TimeUnit::Fs),
            _ => None,
        }
    }
}

/// A magnitude of 1, 10 or 100 followed by a unit, e.g. `10ns`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeValue {
    pub magnitude: u32,
    pub unit: TimeUnit,
}

impl TimeValue {
    pub fn new(magnitude: u32, unit: TimeUnit) -> Self {
        Self { magnitude, unit }
    }

    fn femtoseconds(self) -> u64 {
        u64::from(self.magnitude) * 10u64.pow(self.unit.exponent())
    }
}

impl fmt::Display for TimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.magnitude, self.unit.suffix())
    }
}

impl FromStr for TimeValue {
    type Err = SimError;

    fn from_str(s: &str) -> SimResult<Self> {
        let s = s.trim();
        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(s.len());
        let (digits, suffix) = s.split_at(split);

        let magnitude = match digits {
            "1" => 1,
            "10" => 10,
            "100" => 100,
            _ => {
                return Err(SimError::InvalidTimescale(format!(
                    "'{}': magnitude must be 1, 10 or 100",
                    s
                )))
            }
        };
        let unit = TimeUnit::from_suffix(suffix.trim()).ok_or_else(|| {
            SimError::InvalidTimescale(format!(
                "'{}': unit must be one of s, ms, us, ns, ps, fs",
                s
            ))
        })?;
        Ok(Self { magnitude, unit })
    }
}

/// Time unit and precision of a simulation, `1ns/1ps` by default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timescale {
    pub unit: TimeValue,
    pub precision: TimeValue,
}

impl Timescale {
    pub fn new(unit: TimeValue, precision: TimeValue) -> SimResult<Self> {
        if precision.femtoseconds() > unit.femtoseconds() {
            return Err(SimError::InvalidTimescale(format!(
                "precision {} is coarser than unit {}",
                precision, unit
            )));
        }
        Ok(Self { unit, precision })
    }
}

impl Default for Timescale {
    fn default() -> Self {
        Self {
            unit: TimeValue::new(1, TimeUnit::Ns),
            precision: TimeValue::new(1, TimeUnit::Ps),
        }
    }
}

impl fmt::Display for Timescale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.unit, self.precision)
    }
}

impl FromStr for Timescale {
    type Err = SimError;

    fn from_str(s: &str) -> SimResult<Self> {
        let (unit, precision) = s.split_once('/').ok_or_else(|| {
            SimError::InvalidTimescale(format!("'{}': expected <unit>/<precision>", s))
        })?;
        Timescale::new(unit.parse()?, precision.parse()?)
    }
}

impl TryFrom<String> for Timescale {
    type Error = SimError;

    fn try_from(value: String) -> SimResult<Self> {
        value.parse()
    }
}

impl From<Timescale> for String {
    fn from(timescale: Timescale) -> Self {
        timescale.to_string()
    }
}
