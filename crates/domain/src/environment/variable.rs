//! Environment variable types

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::context::InterpolationContext;
use crate::id::generate_id;

/// A single environment variable.
///
/// Values are usually strings but may hold any JSON value; objects are
/// JSON-serialized when substituted into templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    /// The variable name referenced as `{{key}}`.
    pub key: String,
    /// The variable value.
    pub value: Value,
    /// Whether this variable is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

const fn default_enabled() -> bool {
    true
}

impl Variable {
    /// Creates a new enabled variable.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            enabled: true,
        }
    }

    /// Creates a disabled variable.
    #[must_use]
    pub fn disabled(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            enabled: false,
            ..Self::new(key, value)
        }
    }
}

/// A named set of variables, one of which is active per session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    /// Unique identifier.
    #[serde(default = "generate_id")]
    pub id: String,
    /// Display name (e.g., "staging").
    pub name: String,
    /// Variables in authored order.
    #[serde(default)]
    pub variables: Vec<Variable>,
}

impl Environment {
    /// Creates a new empty environment.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            name: name.into(),
            variables: Vec::new(),
        }
    }

    /// Adds a variable, returning self for chaining.
    #[must_use]
    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.push(Variable::new(key, value));
        self
    }

    /// Builds the interpolation context for a run.
    ///
    /// Disabled variables and blank keys are skipped; when a key repeats the
    /// later definition wins.
    #[must_use]
    pub fn context(&self) -> InterpolationContext {
        self.variables
            .iter()
            .filter(|v| v.enabled && !v.key.trim().is_empty())
            .map(|v| (v.key.trim().to_string(), v.value.clone()))
            .collect()
    }
}
