//! Positions inside a port specification

use serde::Serialize;
use std::fmt;

/// One step from a container to one of its children
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "at", rename_all = "snake_case")]
pub enum PathSegment {
    /// Position in a sequence or tuple
    Index(usize),
    /// Key in a mapping
    Key(String),
    /// Field of an aggregate
    Field(String),
}

/// Path from the root of a port specification to one of its values
///
/// Rendered as `ports[1]["bus"].data` for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PortPath(Vec<PathSegment>);

impl PortPath {
    /// The root of the port specification
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Path of a child reached through `segment`
    pub fn child(&self, segment: PathSegment) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        Self(segments)
    }

    pub fn index(&self, index: usize) -> Self {
        self.child(PathSegment::Index(index))
    }

    pub fn key(&self, key: impl Into<String>) -> Self {
        self.child(PathSegment::Key(key.into()))
    }

    pub fn field(&self, field: impl Into<String>) -> Self {
        self.child(PathSegment::Field(field.into()))
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Last segment, if the path is not the root
    pub fn last(&self) -> Option<&PathSegment> {
        self.0.last()
    }
}

impl From<Vec<PathSegment>> for PortPath {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }
}

impl fmt::Display for PortPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ports")?;
        for segment in &self.0 {
            match segment {
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
                PathSegment::Key(key) => write!(f, "[{:?}]", key)?,
                PathSegment::Field(field) => write!(f, ".{}", field)?,
            }
        }
        Ok(())
    }
}
