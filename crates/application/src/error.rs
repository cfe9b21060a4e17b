//! Application error types

use graphit_domain::DomainError;
use thiserror::Error;

use crate::document::DocumentError;

/// Application-level errors.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// A domain validation error occurred.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// An HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The endpoint answered with GraphQL errors only.
    #[error("GraphQL error: {0}")]
    GraphQL(String),

    /// A GraphQL document could not be processed.
    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
