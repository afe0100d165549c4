//! Port structures for hdlrun
//!
//! A structured design exposes its toplevel through a *port specification*:
//! a single [`Signal`] or any nesting of sequences, tuples, mappings and
//! aggregates holding signals. [`flatten_ports`] turns such a specification
//! into a [`PortList`], the flat, ordered, uniquely named list that design
//! emission binds to toplevel ports.

pub mod error;
pub mod flatten;
pub mod path;
pub mod signal;
pub mod value;

pub use error::{FlattenError, Result};
pub use flatten::{flatten_ports, PortEntry, PortList};
pub use path::{PathSegment, PortPath};
pub use signal::{Direction, Shape, Signal};
pub use value::{Aggregate, IntoPorts, PortRef, PortValue, Scalar};
