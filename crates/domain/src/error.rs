//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The HTTP method is not supported for GraphQL transport.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// The subscription protocol is unknown.
    #[error("unsupported subscription protocol: {0}")]
    UnsupportedProtocol(String),

    /// An introspection payload could not be decoded.
    #[error("invalid introspection result: {0}")]
    InvalidIntrospection(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
