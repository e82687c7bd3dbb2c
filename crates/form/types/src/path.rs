//! Control paths: addressing descendants of a control

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// One step of a [`ControlPath`]
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathSegment {
    /// A group child key
    Key(String),
    /// An array position
    Index(usize),
}

impl PathSegment {
    /// The segment as a group key. Indices are rendered in decimal.
    pub fn as_key(&self) -> Cow<'_, str> {
        match self {
            PathSegment::Key(key) => Cow::Borrowed(key),
            PathSegment::Index(index) => Cow::Owned(index.to_string()),
        }
    }

    /// The segment as an array position, parsing numeric keys.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathSegment::Key(key) => key.parse().ok(),
            PathSegment::Index(index) => Some(*index),
        }
    }

    fn parse(raw: &str) -> Self {
        match raw.parse::<usize>() {
            Ok(index) => PathSegment::Index(index),
            Err(_) => PathSegment::Key(raw.to_string()),
        }
    }
}

impl std::fmt::Display for PathSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{}", key),
            PathSegment::Index(index) => write!(f, "{}", index),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// A path from a control to one of its descendants.
///
/// Parsed from dotted strings (`"items.0.name"`, numeric parts become
/// indices) or assembled from segments. The empty path addresses the
/// control itself.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ControlPath(Vec<PathSegment>);

impl ControlPath {
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }

    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split('.')
                .filter(|part| !part.is_empty())
                .map(PathSegment::parse)
                .collect(),
        )
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Append a segment
    pub fn join(mut self, segment: impl Into<PathSegment>) -> Self {
        self.0.push(segment.into());
        self
    }
}

impl std::fmt::Display for ControlPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

impl From<&str> for ControlPath {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<&String> for ControlPath {
    fn from(raw: &String) -> Self {
        Self::parse(raw)
    }
}

impl From<String> for ControlPath {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<usize> for ControlPath {
    fn from(index: usize) -> Self {
        Self(vec![PathSegment::Index(index)])
    }
}

impl From<Vec<PathSegment>> for ControlPath {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }
}

impl From<&[PathSegment]> for ControlPath {
    fn from(segments: &[PathSegment]) -> Self {
        Self(segments.to_vec())
    }
}

impl FromIterator<PathSegment> for ControlPath {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
