//! Port specification values
//!
//! [`PortValue`] is the closed set of shapes a port specification can take.
//! Caller types are converted into it once, through [`IntoPorts`], before
//! any traversal happens; the flattener never probes arbitrary values.

use crate::signal::Signal;
use indexmap::IndexMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// A node of a port specification
///
/// Containers are reference counted, so cloning a `PortValue` is cheap and
/// keeps container identity: two clones of a mapping are the same mapping
/// for cycle detection purposes.
#[derive(Debug, Clone)]
pub enum PortValue {
    /// A terminal signal
    Signal(Signal),
    /// Ordered sequence, children named by their own signal names
    Sequence(Arc<Vec<PortValue>>),
    /// Fixed-size tuple, children named by their own signal names
    Tuple(Arc<Vec<PortValue>>),
    /// String-keyed mapping in insertion order, children named by key
    Mapping(Arc<IndexMap<String, PortValue>>),
    /// Record-like value, children named by field
    Aggregate(Arc<Aggregate>),
    /// Shared, mutable reference to another value
    Shared(PortRef),
    /// A stray scalar, never a valid port
    Scalar(Scalar),
    /// Absent value, never a valid port
    Null,
}

impl PortValue {
    pub fn sequence<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoPorts,
    {
        PortValue::Sequence(Arc::new(
            items.into_iter().map(IntoPorts::into_ports).collect(),
        ))
    }

    pub fn tuple<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoPorts,
    {
        PortValue::Tuple(Arc::new(
            items.into_iter().map(IntoPorts::into_ports).collect(),
        ))
    }

    pub fn mapping<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: IntoPorts,
    {
        PortValue::Mapping(Arc::new(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into_ports()))
                .collect(),
        ))
    }

    pub fn aggregate(aggregate: Aggregate) -> Self {
        PortValue::Aggregate(Arc::new(aggregate))
    }

    pub fn shared(value: impl IntoPorts) -> Self {
        PortValue::Shared(PortRef::new(value))
    }

    /// Empty sequence
    pub fn empty() -> Self {
        PortValue::Sequence(Arc::new(Vec::new()))
    }

    /// Short name of the variant
    pub fn kind_name(&self) -> &'static str {
        match self {
            PortValue::Signal(_) => "signal",
            PortValue::Sequence(_) => "sequence",
            PortValue::Tuple(_) => "tuple",
            PortValue::Mapping(_) => "mapping",
            PortValue::Aggregate(_) => "aggregate",
            PortValue::Shared(_) => "shared reference",
            PortValue::Scalar(scalar) => scalar.kind_name(),
            PortValue::Null => "null",
        }
    }

    /// Identity of a container or shared node, `None` for leaves
    pub(crate) fn identity(&self) -> Option<usize> {
        match self {
            PortValue::Sequence(items) | PortValue::Tuple(items) => {
                Some(Arc::as_ptr(items) as usize)
            }
            PortValue::Mapping(entries) => Some(Arc::as_ptr(entries) as usize),
            PortValue::Aggregate(aggregate) => Some(Arc::as_ptr(aggregate) as usize),
            PortValue::Shared(port_ref) => Some(port_ref.identity()),
            PortValue::Signal(_) | PortValue::Scalar(_) | PortValue::Null => None,
        }
    }
}

impl Default for PortValue {
    fn default() -> Self {
        PortValue::empty()
    }
}

impl From<Signal> for PortValue {
    fn from(signal: Signal) -> Self {
        PortValue::Signal(signal)
    }
}

impl From<&Signal> for PortValue {
    fn from(signal: &Signal) -> Self {
        PortValue::Signal(signal.clone())
    }
}

impl From<Scalar> for PortValue {
    fn from(scalar: Scalar) -> Self {
        PortValue::Scalar(scalar)
    }
}

impl From<Aggregate> for PortValue {
    fn from(aggregate: Aggregate) -> Self {
        PortValue::aggregate(aggregate)
    }
}

impl From<PortRef> for PortValue {
    fn from(port_ref: PortRef) -> Self {
        PortValue::Shared(port_ref)
    }
}

impl From<&PortRef> for PortValue {
    fn from(port_ref: &PortRef) -> Self {
        PortValue::Shared(port_ref.clone())
    }
}

/// Non-port leaf values that can appear in a specification
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Scalar {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Scalar::Bool(_) => "boolean",
            Scalar::Int(_) => "integer",
            Scalar::Float(_) => "float",
            Scalar::Str(_) => "string",
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(value) => write!(f, "boolean {}", value),
            Scalar::Int(value) => write!(f, "integer {}", value),
            Scalar::Float(value) => write!(f, "float {}", value),
            Scalar::Str(value) => write!(f, "string {:?}", value),
        }
    }
}

/// A record-like value with named fields in declaration order
#[derive(Debug, Clone, Default)]
pub struct Aggregate {
    type_name: String,
    fields: IndexMap<String, PortValue>,
}

impl Aggregate {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: IndexMap::new(),
        }
    }

    /// Append a field, replacing any earlier field of the same name in place
    pub fn field(mut self, name: impl Into<String>, value: impl IntoPorts) -> Self {
        self.fields.insert(name.into(), value.into_ports());
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &PortValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Shared, mutable node of a port specification
///
/// This is the only way to build a graph that refers back to itself.
/// Clones share the same node.
#[derive(Clone)]
pub struct PortRef(Arc<RwLock<PortValue>>);

impl PortRef {
    pub fn new(value: impl IntoPorts) -> Self {
        Self(Arc::new(RwLock::new(value.into_ports())))
    }

    /// Snapshot of the referenced value
    pub fn get(&self) -> PortValue {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the referenced value
    pub fn set(&self, value: impl IntoPorts) {
        let value = value.into_ports();
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = value;
    }

    pub fn ptr_eq(&self, other: &PortRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn identity(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

// Never print the referenced value: it may contain this node.
impl fmt::Debug for PortRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PortRef({:#x})", self.identity())
    }
}

/// Conversion of caller values into a port specification
///
/// Implement this for design-specific bundles (typically by building an
/// [`Aggregate`]) so they can be passed wherever ports are expected.
pub trait IntoPorts {
    fn into_ports(self) -> PortValue;
}

impl IntoPorts for PortValue {
    fn into_ports(self) -> PortValue {
        self
    }
}

impl IntoPorts for &PortValue {
    fn into_ports(self) -> PortValue {
        self.clone()
    }
}

impl IntoPorts for Signal {
    fn into_ports(self) -> PortValue {
        PortValue::Signal(self)
    }
}

impl IntoPorts for &Signal {
    fn into_ports(self) -> PortValue {
        PortValue::Signal(self.clone())
    }
}

impl IntoPorts for Aggregate {
    fn into_ports(self) -> PortValue {
        PortValue::aggregate(self)
    }
}

impl IntoPorts for PortRef {
    fn into_ports(self) -> PortValue {
        PortValue::Shared(self)
    }
}

impl IntoPorts for &PortRef {
    fn into_ports(self) -> PortValue {
        PortValue::Shared(self.clone())
    }
}

impl IntoPorts for Scalar {
    fn into_ports(self) -> PortValue {
        PortValue::Scalar(self)
    }
}

/// The empty tuple
impl IntoPorts for () {
    fn into_ports(self) -> PortValue {
        PortValue::Tuple(Arc::new(Vec::new()))
    }
}

impl<T: IntoPorts> IntoPorts for Option<T> {
    fn into_ports(self) -> PortValue {
        match self {
            Some(value) => value.into_ports(),
            None => PortValue::Null,
        }
    }
}

impl<T: IntoPorts> IntoPorts for Vec<T> {
    fn into_ports(self) -> PortValue {
        PortValue::sequence(self)
    }
}

impl<T: IntoPorts, const N: usize> IntoPorts for [T; N] {
    fn into_ports(self) -> PortValue {
        PortValue::sequence(self)
    }
}

impl<T> IntoPorts for &[T]
where
    for<'a> &'a T: IntoPorts,
{
    fn into_ports(self) -> PortValue {
        PortValue::sequence(self.iter())
    }
}

impl<K: Into<String>, T: IntoPorts> IntoPorts for IndexMap<K, T> {
    fn into_ports(self) -> PortValue {
        PortValue::mapping(self)
    }
}

macro_rules! impl_into_ports_for_tuple {
    ($($name:ident),+) => {
        impl<$($name: IntoPorts),+> IntoPorts for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_ports(self) -> PortValue {
                let ($($name,)+) = self;
                PortValue::Tuple(Arc::new(vec![$($name.into_ports()),+]))
            }
        }
    };
}

impl_into_ports_for_tuple!(A);
impl_into_ports_for_tuple!(A, B);
impl_into_ports_for_tuple!(A, B, C);
impl_into_ports_for_tuple!(A, B, C, D);
