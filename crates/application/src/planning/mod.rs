//! Request planning: headers, proxy addressing, encoding selection and
//! GET/POST/multipart encoding.

pub mod body;
pub mod encoding;
pub mod headers;
pub mod plan;

use thiserror::Error;

pub use encoding::{Encoding, select_encoding};
pub use headers::{HeaderList, apply_proxy_addressing, auth_header, build_headers};
pub use plan::{RequestPlan, parse_endpoint, plan_request};

/// Errors detected before a request reaches the network.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlanError {
    /// The resolved endpoint is empty or not an absolute HTTP(S) URL.
    #[error("Invalid endpoint URL")]
    InvalidEndpoint,

    /// The variables text is not valid JSON.
    #[error("Invalid variables JSON: {0}")]
    InvalidVariables(String),

    /// The configured proxy URL is invalid.
    #[error("Invalid proxy URL: {0}")]
    InvalidProxyUrl(String),

    /// A file mapping's variable path points past the end of an array.
    #[error("Invalid file variable path: {0}")]
    InvalidFilePath(String),
}
