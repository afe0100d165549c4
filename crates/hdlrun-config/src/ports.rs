//! Port specifications written in TOML
//!
//! ```toml
//! ports = [
//!   { signal = "clk" },
//!   { bus = { data = { signal = "d", width = 8 }, ack = { signal = "a", dir = "out" } } },
//! ]
//! ```
//!
//! A table with a string `signal` key is a signal. Any other table is a
//! mapping whose keys keep their order, and an array is a sequence. Every
//! other value becomes a scalar, which flattening later rejects with its
//! path.

use crate::error::{ConfigError, Result};
use hdlrun_ports::{Direction, PortPath, PortValue, Scalar, Shape, Signal};
use toml::Value;

const SIGNAL_KEYS: [&str; 4] = ["signal", "width", "signed", "dir"];

/// Convert a TOML port specification into a [`PortValue`]
pub fn ports_from_toml(value: &Value) -> Result<PortValue> {
    convert(value, &PortPath::root())
}

fn convert(value: &Value, path: &PortPath) -> Result<PortValue> {
    Ok(match value {
        Value::Table(table) => match table.get("signal") {
            Some(Value::String(name)) => PortValue::from(signal(name, table, path)?),
            _ => PortValue::mapping(
                table
                    .iter()
                    .map(|(key, value)| Ok((key.clone(), convert(value, &path.key(key))?)))
                    .collect::<Result<Vec<_>>>()?,
            ),
        },
        Value::Array(items) => PortValue::sequence(
            items
                .iter()
                .enumerate()
                .map(|(index, item)| convert(item, &path.index(index)))
                .collect::<Result<Vec<_>>>()?,
        ),
        Value::String(value) => Scalar::Str(value.clone()).into(),
        Value::Integer(value) => Scalar::Int(*value).into(),
        Value::Float(value) => Scalar::Float(*value).into(),
        Value::Boolean(value) => Scalar::Bool(*value).into(),
        Value::Datetime(value) => Scalar::Str(value.to_string()).into(),
    })
}

fn signal(name: &str, table: &toml::Table, path: &PortPath) -> Result<Signal> {
    let invalid = |message: String| ConfigError::InvalidSignal {
        path: path.clone(),
        message,
    };

    if let Some(key) = table.keys().find(|key| !SIGNAL_KEYS.contains(&key.as_str())) {
        return Err(invalid(format!("unknown key '{}' for signal '{}'", key, name)));
    }

    let width = match table.get("width") {
        None => 1,
        Some(Value::Integer(width)) => u32::try_from(*width)
            .map_err(|_| invalid(format!("width {} is out of range", width)))?,
        Some(other) => {
            return Err(invalid(format!(
                "width must be an integer, found {}",
                other.type_str()
            )))
        }
    };
    let signed = match table.get("signed") {
        None => false,
        Some(Value::Boolean(signed)) => *signed,
        Some(other) => {
            return Err(invalid(format!(
                "signed must be a boolean, found {}",
                other.type_str()
            )))
        }
    };
    let direction = match table.get("dir") {
        None => Direction::default(),
        Some(Value::String(dir)) => dir.parse::<Direction>().map_err(invalid)?,
        Some(other) => {
            return Err(invalid(format!(
                "dir must be a string, found {}",
                other.type_str()
            )))
        }
    };

    Ok(Signal::with_shape(name, Shape { width, signed }, direction))
}
