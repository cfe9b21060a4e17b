//! Execute Request Use Case
//!
//! Executes one GraphQL operation over HTTP and reports the outcome as a
//! [`RequestResult`]. Failures never escape as errors.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use graphit_domain::{ClientSettings, GraphQLResponse, RequestOptions, RequestResult, RequestStats};
use tracing::{debug, info, warn};

use crate::planning::plan_request;
use crate::ports::{HttpClient, HttpClientError, RawResponse};

/// Use case for executing GraphQL requests.
///
/// This struct encapsulates the business logic for sending requests
/// and handling responses. It uses the `HttpClient` port for actual
/// HTTP communication.
///
/// # Example
///
/// ```ignore
/// let http_client = ReqwestHttpClient::new()?;
/// let use_case = ExecuteRequest::new(Arc::new(http_client));
///
/// let options = RequestOptions::new("https://api.example.com/graphql", "{ me { id } }");
/// let result = use_case.execute(&options).await;
/// ```
pub struct ExecuteRequest<C: HttpClient> {
    client: Arc<C>,
    proxy_url: String,
}

impl<C: HttpClient> Clone for ExecuteRequest<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            proxy_url: self.proxy_url.clone(),
        }
    }
}

impl<C: HttpClient> ExecuteRequest<C> {
    /// Creates a new `ExecuteRequest` use case with the given HTTP client.
    #[must_use]
    pub fn new(client: Arc<C>) -> Self {
        Self {
            client,
            proxy_url: ClientSettings::default().proxy_url,
        }
    }

    /// Uses the proxy URL from the given settings.
    #[must_use]
    pub fn with_settings(mut self, settings: &ClientSettings) -> Self {
        self.proxy_url.clone_from(&settings.proxy_url);
        self
    }

    /// Sets the forwarding proxy URL.
    #[must_use]
    pub fn with_proxy_url(mut self, proxy_url: impl Into<String>) -> Self {
        self.proxy_url = proxy_url.into();
        self
    }

    /// Executes the operation.
    ///
    /// Pre-flight and transport failures produce `error` with zeroed stats.
    /// A non-JSON body still counts as a response.
    pub async fn execute(&self, options: &RequestOptions) -> RequestResult {
        let plan = match plan_request(options, &self.proxy_url) {
            Ok(plan) => plan,
            Err(e) => {
                warn!(error = %e, "Request rejected before sending");
                return RequestResult::failure(e.to_string());
            }
        };

        info!(
            method = %plan.request.method,
            encoding = %plan.encoding,
            url = %plan.target_url,
            proxied = plan.proxied,
            "Sending GraphQL request"
        );

        let timeout_ms = plan.request.timeout_ms;
        let outcome = tokio::time::timeout(
            Duration::from_millis(timeout_ms),
            self.client.execute(&plan.request),
        )
        .await
        .unwrap_or(Err(HttpClientError::Timeout { timeout_ms }));

        match outcome {
            Ok(raw) => Self::to_result(raw),
            Err(e) => {
                warn!(error = %e, "GraphQL request failed");
                RequestResult::failure(e.to_string())
            }
        }
    }

    fn to_result(raw: RawResponse) -> RequestResult {
        let text = raw.text();
        let response = GraphQLResponse::from_body(&text);

        #[allow(clippy::cast_possible_truncation)]
        let stats = RequestStats {
            status: raw.status,
            status_text: raw.status_text,
            duration: raw.duration.as_millis() as u64,
            size: raw.body.len() as u64,
            timestamp: Utc::now(),
        };

        debug!(
            status = stats.status,
            size = stats.size,
            duration_ms = stats.duration,
            "Received GraphQL response"
        );

        RequestResult::success(response, raw.headers, stats)
    }
}
