//! Tag name filtering

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Set of tag display names a report is restricted to
///
/// An empty filter passes everything. A non-empty filter passes an item iff
/// one of its tags is in the filter, so untagged items are excluded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagFilter {
    names: BTreeSet<String>,
}

impl TagFilter {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Filter that passes everything
    pub fn all() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn passes_name(&self, tag_name: &str) -> bool {
        self.names.is_empty() || self.names.contains(tag_name)
    }

    pub fn passes<'a, I>(&self, tag_names: I) -> bool
    where
        I: IntoIterator<Item = &'a String>,
    {
        self.names.is_empty() || tag_names.into_iter().any(|t| self.names.contains(t))
    }

    /// Comma-separated filter names, for section comments
    pub fn describe(&self) -> String {
        self.names.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}
