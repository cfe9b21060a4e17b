//! Pre-request and post-request scripting.
//!
//! Scripts run in a sandbox with a small capability surface. A run takes a
//! [`ScriptTask`] and always produces a [`ScriptResult`], including after a
//! failure or a timeout.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default script timeout in milliseconds.
pub const DEFAULT_SCRIPT_TIMEOUT_MS: u64 = 5_000;

/// Error reported when a script exceeds its deadline.
pub const SCRIPT_TIMEOUT_MESSAGE: &str = "Script execution timed out";

/// A user-authored script attached to a request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Script {
    /// The script content.
    pub content: String,
    /// Whether the script is enabled.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

const fn default_enabled() -> bool {
    true
}

impl Default for Script {
    fn default() -> Self {
        Self {
            content: String::new(),
            enabled: true,
        }
    }
}

impl Script {
    /// Create a new script with content.
    #[must_use]
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            enabled: true,
        }
    }

    /// Check if the script is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// Check if the script should run.
    #[must_use]
    pub fn should_run(&self) -> bool {
        self.enabled && !self.is_empty()
    }
}

/// Pre-request and post-request scripts for a request.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RequestScripts {
    /// Script to run before the request.
    #[serde(default, skip_serializing_if = "Script::is_empty")]
    pub pre_request: Script,
    /// Script to run after the response.
    #[serde(default, skip_serializing_if = "Script::is_empty")]
    pub post_request: Script,
}

impl RequestScripts {
    /// Check if both scripts are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pre_request.is_empty() && self.post_request.is_empty()
    }

    /// Set the pre-request script.
    #[must_use]
    pub fn with_pre_request(mut self, script: Script) -> Self {
        self.pre_request = script;
        self
    }

    /// Set the post-request script.
    #[must_use]
    pub fn with_post_request(mut self, script: Script) -> Self {
        self.post_request = script;
        self
    }
}

/// When a script runs relative to the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptKind {
    /// Before the request is sent.
    Pre,
    /// After the response is received.
    Post,
}

impl ScriptKind {
    /// Returns the kind as a lowercase label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pre => "pre",
            Self::Post => "post",
        }
    }
}

/// One script run request sent to the sandbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptTask {
    /// Pre or post.
    pub kind: ScriptKind,
    /// Script source.
    pub script: String,
    /// Resolved environment values.
    #[serde(default)]
    pub env: Map<String, Value>,
    /// Parsed variables object.
    #[serde(default)]
    pub vars: Map<String, Value>,
    /// Current enabled headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Response value, only for post scripts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    /// Deadline in milliseconds.
    pub timeout: u64,
}

impl ScriptTask {
    /// Creates a pre-request task.
    #[must_use]
    pub fn pre(script: impl Into<String>) -> Self {
        Self {
            kind: ScriptKind::Pre,
            script: script.into(),
            env: Map::new(),
            vars: Map::new(),
            headers: BTreeMap::new(),
            response: None,
            timeout: DEFAULT_SCRIPT_TIMEOUT_MS,
        }
    }

    /// Creates a post-request task exposing `response`.
    #[must_use]
    pub fn post(script: impl Into<String>, response: Value) -> Self {
        Self {
            kind: ScriptKind::Post,
            response: Some(response),
            ..Self::pre(script)
        }
    }

    /// Sets the environment values.
    #[must_use]
    pub fn with_env(mut self, env: Map<String, Value>) -> Self {
        self.env = env;
        self
    }

    /// Sets the variables object.
    #[must_use]
    pub fn with_vars(mut self, vars: Map<String, Value>) -> Self {
        self.vars = vars;
        self
    }

    /// Sets the current headers.
    #[must_use]
    pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    /// Sets the deadline.
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout = timeout_ms;
        self
    }
}

/// The complete outcome of one script run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptResult {
    /// Whether execution was successful.
    pub success: bool,
    /// Log lines in emission order.
    #[serde(default)]
    pub logs: Vec<String>,
    /// Staged environment overrides.
    #[serde(default)]
    pub env_overrides: Map<String, Value>,
    /// Staged variable overrides.
    #[serde(default)]
    pub vars_overrides: Map<String, Value>,
    /// Header map after the script ran.
    #[serde(default)]
    pub headers_overrides: BTreeMap<String, String>,
    /// Error message if execution failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScriptResult {
    /// Create a failed result with an error message and no state.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            ..Default::default()
        }
    }

    /// Returns true if the run failed because of its deadline.
    #[must_use]
    pub fn timed_out(&self) -> bool {
        self.error.as_deref() == Some(SCRIPT_TIMEOUT_MESSAGE)
    }
}
