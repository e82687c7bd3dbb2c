//! Executable definitions attached to config nodes

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Behavior category an executable is registered under
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutableCategory {
    /// Produces a boolean hint flag
    Hint,
    /// Produces extra metadata
    Extra,
    /// Produces informational messages
    Messager,
    /// Produces a validator
    Validator,
    /// Produces the disabled flag
    Disabler,
    /// Runs for side effects
    Trigger,
}

impl ExecutableCategory {
    /// Every category, in installation order
    pub const ALL: [ExecutableCategory; 6] = [
        ExecutableCategory::Hint,
        ExecutableCategory::Extra,
        ExecutableCategory::Messager,
        ExecutableCategory::Validator,
        ExecutableCategory::Disabler,
        ExecutableCategory::Trigger,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutableCategory::Hint => "hint",
            ExecutableCategory::Extra => "extra",
            ExecutableCategory::Messager => "messager",
            ExecutableCategory::Validator => "validator",
            ExecutableCategory::Disabler => "disabler",
            ExecutableCategory::Trigger => "trigger",
        }
    }
}

impl std::fmt::Display for ExecutableCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to a registry entry plus the parameters it is invoked with
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExecutableDefinition {
    pub name: String,
    #[serde(default)]
    pub params: Value,
}

impl ExecutableDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Value::Null,
        }
    }

    pub fn with_params(mut self, params: Value) -> Self {
        self.params = params;
        self
    }

    /// Set a single parameter, turning `params` into an object if needed
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        if !self.params.is_object() {
            self.params = Value::Object(Default::default());
        }
        if let Value::Object(map) = &mut self.params {
            map.insert(key.into(), value.into());
        }
        self
    }

    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.param(key).and_then(Value::as_str)
    }
}
