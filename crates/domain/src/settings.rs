//! Client settings domain model
//!
//! Defines the tunable defaults for the GraphIt client core.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::request::DEFAULT_TIMEOUT_MS;
use crate::scripting::DEFAULT_SCRIPT_TIMEOUT_MS;

/// Client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Default request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Script sandbox deadline in milliseconds.
    #[serde(default = "default_script_timeout_ms")]
    pub script_timeout_ms: u64,

    /// Forwarding proxy endpoint used in proxy mode.
    #[serde(default = "default_proxy_url")]
    pub proxy_url: String,

    /// `User-Agent` sent on direct requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// WebSocket handshake timeout in milliseconds.
    #[serde(default = "default_ws_connect_timeout_ms")]
    pub ws_connect_timeout_ms: u64,

    /// WebSocket keep-alive ping interval in seconds; `None` disables pings.
    #[serde(default = "default_ws_keep_alive_secs")]
    pub ws_keep_alive_secs: Option<u64>,

    /// How long an SSE subscription may take to open, in milliseconds.
    #[serde(default = "default_sse_open_timeout_ms")]
    pub sse_open_timeout_ms: u64,
}

const fn default_request_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

const fn default_script_timeout_ms() -> u64 {
    DEFAULT_SCRIPT_TIMEOUT_MS
}

fn default_proxy_url() -> String {
    "http://localhost:3000/api/proxy".to_string()
}

fn default_user_agent() -> String {
    format!("GraphIt/{}", env!("CARGO_PKG_VERSION"))
}

const fn default_ws_connect_timeout_ms() -> u64 {
    10_000
}

const fn default_sse_open_timeout_ms() -> u64 {
    10_000
}

#[allow(clippy::unnecessary_wraps)]
const fn default_ws_keep_alive_secs() -> Option<u64> {
    Some(30)
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            request_timeout_ms: default_request_timeout_ms(),
            script_timeout_ms: default_script_timeout_ms(),
            proxy_url: default_proxy_url(),
            user_agent: default_user_agent(),
            ws_connect_timeout_ms: default_ws_connect_timeout_ms(),
            ws_keep_alive_secs: default_ws_keep_alive_secs(),
            sse_open_timeout_ms: default_sse_open_timeout_ms(),
        }
    }
}

impl ClientSettings {
    /// WebSocket handshake timeout.
    #[must_use]
    pub const fn ws_connect_timeout(&self) -> Duration {
        Duration::from_millis(self.ws_connect_timeout_ms)
    }

    /// SSE stream open timeout.
    #[must_use]
    pub const fn sse_open_timeout(&self) -> Duration {
        Duration::from_millis(self.sse_open_timeout_ms)
    }

    /// WebSocket ping interval, if enabled.
    #[must_use]
    pub const fn ws_keep_alive(&self) -> Option<Duration> {
        match self.ws_keep_alive_secs {
            Some(secs) if secs > 0 => Some(Duration::from_secs(secs)),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_settings() {
        let settings = ClientSettings::default();
        assert_eq!(settings.request_timeout_ms, 30_000);
        assert_eq!(settings.script_timeout_ms, 5_000);
        assert_eq!(settings.proxy_url, "http://localhost:3000/api/proxy");
        assert!(settings.user_agent.starts_with("GraphIt/"));
        assert_eq!(settings.ws_keep_alive(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn partial_json_uses_defaults() {
        let settings: ClientSettings =
            serde_json::from_str(r#"{"request_timeout_ms": 1000, "ws_keep_alive_secs": null}"#)
                .unwrap();
        assert_eq!(settings.request_timeout_ms, 1000);
        assert_eq!(settings.script_timeout_ms, 5_000);
        assert_eq!(settings.ws_keep_alive(), None);
    }

    #[test]
    fn zero_keep_alive_disables_pings() {
        let settings = ClientSettings {
            ws_keep_alive_secs: Some(0),
            ..ClientSettings::default()
        };
        assert_eq!(settings.ws_keep_alive(), None);
    }
}
