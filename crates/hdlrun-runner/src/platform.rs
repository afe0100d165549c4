//! Extra files shipped alongside a design

use indexmap::IndexMap;

/// Files written into the build directory before building
///
/// Each file is compiled as a source of the language its extension names, so
/// every name needs an extension the chosen simulator understands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Platform {
    extra_files: IndexMap<String, Vec<u8>>,
}

impl Platform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        self.add_file(name, contents);
        self
    }

    /// Add a file, replacing any earlier file of the same name
    pub fn add_file(&mut self, name: impl Into<String>, contents: impl Into<Vec<u8>>) {
        self.extra_files.insert(name.into(), contents.into());
    }

    pub fn extra_files(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.extra_files
            .iter()
            .map(|(name, contents)| (name.as_str(), contents.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.extra_files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extra_files.is_empty()
    }
}
