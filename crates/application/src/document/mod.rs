//! GraphQL document utilities.
//!
//! Operation discovery and selection on top of `async-graphql-parser`, a
//! pretty printer on top of `graphql-parser`, and a token-based minifier.

mod format;
mod operations;

use thiserror::Error;

pub use format::{minify, pretty_print};
pub use operations::{
    OperationInfo, OperationKind, detect_operation_kind, operation_names, parse_operations,
    select_operation,
};

/// Errors raised while processing a GraphQL document.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DocumentError {
    /// The document does not parse.
    #[error("Syntax error: {0}")]
    Syntax(String),

    /// The document has no operation definitions.
    #[error("Document contains no operations")]
    NoOperations,

    /// Several operations and no name to pick one.
    #[error("Operation name required")]
    OperationNameRequired,

    /// The requested operation is not in the document.
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),
}

/// Result type alias for document operations.
pub type DocumentResult<T> = Result<T, DocumentError>;
