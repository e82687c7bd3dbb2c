//! Diagnostic identifiers for controls

use crate::{ControlKind, PathSegment};
use serde::{Deserialize, Serialize};

/// Derived identifier of a control.
///
/// Built by concatenating the parent identifier, the node's key or index and
/// its kind: `root:group/address:group/street:field`. Identifiers are for
/// logging and error reporting only; they are not guaranteed to be unique
/// (array items created at runtime reuse indices).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ControlId(pub String);

impl ControlId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier of a tree root
    pub fn root(name: &str, kind: ControlKind) -> Self {
        Self(format!("{}:{}", name, kind))
    }

    /// Identifier of a child reached through `segment`
    pub fn child(&self, segment: &PathSegment, kind: ControlKind) -> Self {
        Self(format!("{}/{}:{}", self.0, segment, kind))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ControlId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
