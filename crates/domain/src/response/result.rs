//! Request outcome types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::GraphQLResponse;
use crate::request::ResponseHeader;

/// Status text reported when a request never produced an HTTP response.
pub const FAILED_STATUS_TEXT: &str = "Error";

/// Timing and size statistics for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestStats {
    /// HTTP status code, 0 when no response was received.
    pub status: u16,
    /// HTTP reason phrase.
    pub status_text: String,
    /// Milliseconds from dispatch until the body was fully read.
    pub duration: u64,
    /// Body size in bytes.
    pub size: u64,
    /// When the request completed.
    pub timestamp: DateTime<Utc>,
}

impl RequestStats {
    /// Zeroed statistics for a request that failed before or during transport.
    #[must_use]
    pub fn failed() -> Self {
        Self {
            status: 0,
            status_text: FAILED_STATUS_TEXT.to_string(),
            duration: 0,
            size: 0,
            timestamp: Utc::now(),
        }
    }
}

/// The outcome of executing one GraphQL operation.
///
/// Exactly one of `response` or `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestResult {
    /// The parsed GraphQL response.
    pub response: Option<GraphQLResponse>,
    /// Response headers in arrival order.
    #[serde(default)]
    pub headers: Vec<ResponseHeader>,
    /// Request statistics; `None` when the run stopped before the request.
    pub stats: Option<RequestStats>,
    /// Failure description.
    pub error: Option<String>,
}

impl RequestResult {
    /// Creates a successful result.
    #[must_use]
    pub const fn success(
        response: GraphQLResponse,
        headers: Vec<ResponseHeader>,
        stats: RequestStats,
    ) -> Self {
        Self {
            response: Some(response),
            headers,
            stats: Some(stats),
            error: None,
        }
    }

    /// Creates a failed result with zeroed statistics.
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            response: None,
            headers: Vec::new(),
            stats: Some(RequestStats::failed()),
            error: Some(error.into()),
        }
    }

    /// Creates a failed result for a run that never reached the executor.
    #[must_use]
    pub fn aborted(error: impl Into<String>) -> Self {
        Self {
            response: None,
            headers: Vec::new(),
            stats: None,
            error: Some(error.into()),
        }
    }

    /// Returns true if a response was received.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.error.is_none() && self.response.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_has_zeroed_stats() {
        let result = RequestResult::failure("Invalid endpoint URL");
        let stats = result.stats.as_ref().map(|s| (s.status, s.status_text.as_str(), s.size));
        assert_eq!(stats, Some((0, "Error", 0)));
        assert!(result.response.is_none());
        assert!(!result.is_success());
    }

    #[test]
    fn test_aborted_has_no_stats() {
        let result = RequestResult::aborted("Pre-request script failed: x");
        assert!(result.stats.is_none());
    }

    #[test]
    fn test_stats_serialize_camel_case() {
        let json = serde_json::to_value(RequestStats::failed()).unwrap_or_default();
        assert_eq!(json["statusText"], "Error");
    }
}
