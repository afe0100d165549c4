//! Port specification flattening

use crate::error::{FlattenError, Result};
use crate::path::PortPath;
use crate::signal::Signal;
use crate::value::PortValue;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, trace};

/// One toplevel port produced by [`flatten_ports`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortEntry {
    /// Emitted port name
    pub name: String,
    /// The signal bound to the port
    pub signal: Signal,
    /// Where the signal was found in the port specification
    pub path: PortPath,
}

/// Flat, ordered, uniquely named list of toplevel ports
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PortList {
    entries: Vec<PortEntry>,
}

impl PortList {
    /// Number of ports
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no ports
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in order
    pub fn iter(&self) -> std::slice::Iter<'_, PortEntry> {
        self.entries.iter()
    }

    /// Port names in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    /// Signals in order
    pub fn signals(&self) -> impl Iterator<Item = &Signal> {
        self.entries.iter().map(|entry| &entry.signal)
    }

    /// Look up a port by its emitted name
    pub fn get(&self, name: &str) -> Option<&PortEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// Take the entries in order
    pub fn into_vec(self) -> Vec<PortEntry> {
        self.entries
    }
}

impl std::ops::Index<usize> for PortList {
    type Output = PortEntry;

    fn index(&self, index: usize) -> &PortEntry {
        &self.entries[index]
    }
}

impl IntoIterator for PortList {
    type Item = PortEntry;
    type IntoIter = std::vec::IntoIter<PortEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a PortList {
    type Item = &'a PortEntry;
    type IntoIter = std::slice::Iter<'a, PortEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

enum Frame {
    /// Visit `value`, found at `path`; `key` is the name imposed by the
    /// immediate container, if any
    Enter {
        value: PortValue,
        path: PortPath,
        key: Option<String>,
    },
    /// All children of the container with this identity are done
    Leave(usize),
}

/// Flatten a port specification into an ordered list of named signals
///
/// Traversal is depth-first and pre-order: sequences and tuples in index
/// order, mappings in insertion order, aggregates in field order. A signal
/// is named by the key or field of its immediate mapping or aggregate, and
/// by its own name otherwise. Shared nodes are transparent.
///
/// Fails on the first cycle, non-port leaf, or name conflict; no partial
/// list is ever returned. The same signal reached twice under the same
/// name is emitted once.
pub fn flatten_ports(spec: &PortValue) -> Result<PortList> {
    let mut stack = vec![Frame::Enter {
        value: spec.clone(),
        path: PortPath::root(),
        key: None,
    }];
    // Containers on the current path, with the path they were entered at
    let mut ancestors: HashMap<usize, PortPath> = HashMap::new();
    // Emitted name -> index into `entries`
    let mut names: HashMap<String, usize> = HashMap::new();
    let mut entries: Vec<PortEntry> = Vec::new();

    while let Some(frame) = stack.pop() {
        let (value, path, key) = match frame {
            Frame::Leave(identity) => {
                ancestors.remove(&identity);
                continue;
            }
            Frame::Enter { value, path, key } => (value, path, key),
        };

        if let Some(identity) = value.identity() {
            if let Some(ancestor) = ancestors.get(&identity) {
                return Err(FlattenError::CyclicStructure {
                    path,
                    ancestor: ancestor.clone(),
                });
            }
            ancestors.insert(identity, path.clone());
            stack.push(Frame::Leave(identity));
        }

        match value {
            PortValue::Signal(signal) => {
                let name = key.unwrap_or_else(|| signal.name().to_string());
                if let Some(&index) = names.get(&name) {
                    let first = &entries[index];
                    if first.signal.ptr_eq(&signal) {
                        trace!("skipping repeated port '{}' at {}", name, path);
                        continue;
                    }
                    return Err(FlattenError::DuplicatePortName {
                        name,
                        first: first.path.clone(),
                        second: path,
                    });
                }
                trace!("port '{}' at {}", name, path);
                names.insert(name.clone(), entries.len());
                entries.push(PortEntry { name, signal, path });
            }
            PortValue::Sequence(items) | PortValue::Tuple(items) => {
                for (index, item) in items.iter().enumerate().rev() {
                    stack.push(Frame::Enter {
                        value: item.clone(),
                        path: path.index(index),
                        key: None,
                    });
                }
            }
            PortValue::Mapping(map) => {
                for (name, item) in map.iter().rev() {
                    stack.push(Frame::Enter {
                        value: item.clone(),
                        path: path.key(name.as_str()),
                        key: Some(name.clone()),
                    });
                }
            }
            PortValue::Aggregate(aggregate) => {
                let fields: Vec<(&str, &PortValue)> = aggregate.fields().collect();
                for (name, item) in fields.into_iter().rev() {
                    stack.push(Frame::Enter {
                        value: item.clone(),
                        path: path.field(name),
                        key: Some(name.to_string()),
                    });
                }
            }
            PortValue::Shared(port_ref) => {
                stack.push(Frame::Enter {
                    value: port_ref.get(),
                    path,
                    key,
                });
            }
            PortValue::Scalar(scalar) => {
                return Err(FlattenError::UnsupportedPortType {
                    path,
                    found: scalar.to_string(),
                });
            }
            PortValue::Null => {
                return Err(FlattenError::UnsupportedPortType {
                    path,
                    found: "null".to_string(),
                });
            }
        }
    }

    debug!("flattened port specification into {} ports", entries.len());
    Ok(PortList { entries })
}
