//! HTTP client port

use std::time::Duration;

use async_trait::async_trait;
use graphit_domain::{FileHandle, HttpMethod, ResponseHeader};
use thiserror::Error;

/// Errors produced by an HTTP client adapter.
///
/// The `Display` text is what callers see in `RequestResult.error`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HttpClientError {
    /// The request exceeded its deadline and was aborted.
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout {
        /// The deadline that elapsed.
        timeout_ms: u64,
    },

    /// The URL could not be used.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// DNS resolution failed.
    #[error("Could not resolve host {host}: {message}")]
    DnsError {
        /// Host name.
        host: String,
        /// Resolver message.
        message: String,
    },

    /// The remote host refused the connection.
    #[error("Connection refused by {host}:{port}")]
    ConnectionRefused {
        /// Host name.
        host: String,
        /// Port.
        port: u16,
    },

    /// Any other connection failure.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The request or response body could not be handled.
    #[error("Body error: {0}")]
    Body(String),

    /// Anything else.
    #[error("Request failed: {0}")]
    Other(String),
}

/// Body of an outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundBody {
    /// No body.
    Empty,
    /// A JSON text body.
    Json(String),
    /// A `multipart/form-data` body; the adapter sets the boundary.
    Multipart(Vec<MultipartPart>),
}

/// One part of a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartPart {
    /// Form field name.
    pub name: String,
    /// Part content.
    pub content: PartContent,
}

/// Content of a multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartContent {
    /// A text field.
    Text(String),
    /// A binary file.
    File {
        /// File name reported to the server.
        file_name: String,
        /// File bytes.
        file: FileHandle,
    },
}

impl MultipartPart {
    /// A text part.
    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: PartContent::Text(value.into()),
        }
    }

    /// A file part.
    #[must_use]
    pub fn file(name: impl Into<String>, file_name: impl Into<String>, file: FileHandle) -> Self {
        Self {
            name: name.into(),
            content: PartContent::File {
                file_name: file_name.into(),
                file,
            },
        }
    }
}

/// A fully planned HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    /// Wire method.
    pub method: HttpMethod,
    /// Absolute URL, query string included.
    pub url: String,
    /// Headers in insertion order.
    pub headers: Vec<(String, String)>,
    /// Body.
    pub body: OutboundBody,
    /// Deadline in milliseconds.
    pub timeout_ms: u64,
}

impl OutboundRequest {
    /// Returns the first header value with the given name, ignoring case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A response as read off the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Reason phrase.
    pub status_text: String,
    /// Headers in arrival order.
    pub headers: Vec<ResponseHeader>,
    /// Full body.
    pub body: Vec<u8>,
    /// Time from dispatch until the body was fully read.
    pub duration: Duration,
}

impl RawResponse {
    /// The body decoded as UTF-8, lossy.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Port for executing HTTP requests.
///
/// This trait abstracts the HTTP client implementation, allowing
/// the application layer to be independent of specific HTTP libraries.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Sends the request and reads the full response body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails due to network issues,
    /// timeout, or other HTTP-related problems. Non-2xx statuses are not
    /// errors.
    async fn execute(&self, request: &OutboundRequest) -> Result<RawResponse, HttpClientError>;
}
