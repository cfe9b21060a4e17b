//! HTTP Client implementation using reqwest.
//!
//! This adapter implements the `HttpClient` port using the reqwest library.
//! It sends exactly the planned request: no extra headers, no retries.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use graphit_application::ports::{HttpClient, HttpClientError, OutboundBody, OutboundRequest, RawResponse};
use graphit_domain::{ClientSettings, HttpMethod, ResponseHeader};
use reqwest::{Client, Method, Url};
use tracing::debug;

use crate::http::build_form;

const MAX_REDIRECTS: usize = 10;

/// HTTP client implementation using reqwest.
///
/// This is the primary HTTP adapter for GraphIt. It wraps `reqwest::Client`
/// and implements the `HttpClient` port from the application layer.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    /// Creates a new HTTP client with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new() -> Result<Self, HttpClientError> {
        Self::with_settings(&ClientSettings::default())
    }

    /// Creates a client using the user agent from `settings`.
    ///
    /// Default configuration:
    /// - Follow redirects: up to 10
    /// - TLS verification: enabled
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn with_settings(settings: &ClientSettings) -> Result<Self, HttpClientError> {
        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| HttpClientError::Other(e.to_string()))?;

        Ok(Self { client })
    }

    /// Creates a new HTTP client with a custom reqwest client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// The underlying client, for sharing its connection pool.
    #[must_use]
    pub const fn client(&self) -> &Client {
        &self.client
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
        }
    }

    fn host_of(error: &reqwest::Error) -> String {
        error
            .url()
            .and_then(Url::host_str)
            .unwrap_or("unknown")
            .to_string()
    }

    /// Maps reqwest errors to `HttpClientError`.
    fn map_error(error: &reqwest::Error, timeout_ms: u64) -> HttpClientError {
        if error.is_timeout() {
            return HttpClientError::Timeout { timeout_ms };
        }

        if error.is_connect() {
            let message = error.to_string();
            let lower = format!("{error:?}").to_lowercase();
            if lower.contains("dns") || lower.contains("resolve") {
                return HttpClientError::DnsError {
                    host: Self::host_of(error),
                    message,
                };
            }
            if lower.contains("refused") {
                return HttpClientError::ConnectionRefused {
                    host: Self::host_of(error),
                    port: error
                        .url()
                        .and_then(Url::port_or_known_default)
                        .unwrap_or(80),
                };
            }
            return HttpClientError::ConnectionFailed(message);
        }

        if error.is_body() || error.is_decode() {
            return HttpClientError::Body(error.to_string());
        }

        HttpClientError::Other(error.to_string())
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: &OutboundRequest) -> Result<RawResponse, HttpClientError> {
        let url = Url::parse(&request.url)
            .map_err(|e| HttpClientError::InvalidUrl(format!("{e}: {}", request.url)))?;
        let timeout_ms = request.timeout_ms;

        let start = Instant::now();

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), url)
            .timeout(Duration::from_millis(timeout_ms));

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match &request.body {
            OutboundBody::Empty => builder,
            OutboundBody::Json(text) => builder.body(text.clone()),
            OutboundBody::Multipart(parts) => builder.multipart(build_form(parts)?),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| Self::map_error(&e, timeout_ms))?;

        let status = response.status();
        let status_text = status.canonical_reason().unwrap_or_default().to_string();

        let headers: Vec<ResponseHeader> = response
            .headers()
            .iter()
            .map(|(name, value)| ResponseHeader {
                key: name.to_string(),
                value: String::from_utf8_lossy(value.as_bytes()).into_owned(),
            })
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|e| match Self::map_error(&e, timeout_ms) {
                HttpClientError::Other(message) => {
                    HttpClientError::Body(format!("Failed to read body: {message}"))
                }
                other => other,
            })?
            .to_vec();

        let duration = start.elapsed();
        debug!(status = status.as_u16(), bytes = body.len(), "Read response body");

        Ok(RawResponse {
            status: status.as_u16(),
            status_text,
            headers,
            body,
            duration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_reqwest_method() {
        assert_eq!(
            ReqwestHttpClient::to_reqwest_method(HttpMethod::Get),
            Method::GET
        );
        assert_eq!(
            ReqwestHttpClient::to_reqwest_method(HttpMethod::Post),
            Method::POST
        );
    }

    #[test]
    fn test_client_creation() {
        assert!(ReqwestHttpClient::new().is_ok());
    }

    #[tokio::test]
    async fn test_invalid_url_is_rejected_before_sending() {
        let client = ReqwestHttpClient::new().unwrap_or_else(|_| ReqwestHttpClient::with_client(Client::new()));
        let request = OutboundRequest {
            method: HttpMethod::Post,
            url: "not a url".to_string(),
            headers: Vec::new(),
            body: OutboundBody::Empty,
            timeout_ms: 1_000,
        };
        let result = client.execute(&request).await;
        assert!(matches!(result, Err(HttpClientError::InvalidUrl(_))));
    }
}
