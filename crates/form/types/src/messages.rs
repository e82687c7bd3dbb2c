//! Message maps and extra metadata

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A single message descriptor
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Human-readable text
    pub message: String,
    /// Any further descriptor fields (limits, actual values, ...)
    #[serde(flatten, default)]
    pub details: Map<String, Value>,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: Map::new(),
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// A one-entry map keyed by `code`
    pub fn into_map(self, code: impl Into<String>) -> MessageMap {
        MessageMap::from([(code.into(), self)])
    }
}

/// Code-keyed messages. `None` in a message stream means "no messages".
pub type MessageMap = BTreeMap<String, Message>;

/// Extra metadata published by a control
pub type Extras = Map<String, Value>;

/// Shallow-merge message maps, later maps winning on duplicate codes.
///
/// `None` entries are skipped. Returns `None` when nothing contributed a
/// message.
pub fn merge_messages<I>(maps: I) -> Option<MessageMap>
where
    I: IntoIterator<Item = Option<MessageMap>>,
{
    let merged: MessageMap = maps.into_iter().flatten().flatten().collect();
    if merged.is_empty() {
        None
    } else {
        Some(merged)
    }
}

/// Shallow-merge extra records, later records winning.
pub fn merge_extras<I>(records: I) -> Extras
where
    I: IntoIterator<Item = Extras>,
{
    records.into_iter().flatten().collect()
}
