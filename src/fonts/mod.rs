//! Font encodings and the per-page font table.
//!
//! The core never parses font programs. It consumes resolved
//! [`FontEncoding`] values — bidirectional code↔Unicode tables — supplied
//! by the object-graph layer, keyed by resource name in a [`FontTable`].

pub mod encoding;

pub use encoding::{CodeWidth, DecodedChar, FontEncoding};

use indexmap::IndexMap;

/// The fonts available to one page, keyed by resource name (`F1`, `TT0`,
/// ...), in document order.
///
/// Read-only to the core for the duration of an edit.
#[derive(Debug, Clone, Default)]
pub struct FontTable {
    fonts: IndexMap<String, FontEncoding>,
}

impl FontTable {
    /// Create an empty font table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a font encoding under a resource name.
    ///
    /// Re-inserting a name replaces the previous encoding.
    pub fn insert(&mut self, resource_name: impl Into<String>, encoding: FontEncoding) {
        self.fonts.insert(resource_name.into(), encoding);
    }

    /// Look up the encoding for a resource name.
    pub fn get(&self, resource_name: &str) -> Option<&FontEncoding> {
        self.fonts.get(resource_name)
    }

    /// Number of registered fonts.
    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    /// Whether the table has no fonts.
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Iterate over (resource name, encoding) pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FontEncoding)> {
        self.fonts.iter().map(|(k, v)| (k.as_str(), v))
    }
}
