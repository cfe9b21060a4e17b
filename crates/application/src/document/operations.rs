//! Operation discovery and selection.

use std::fmt;

use async_graphql_parser::types::{ExecutableDocument, OperationType};
use serde::Serialize;

use super::{DocumentError, DocumentResult};

/// Root operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// A query.
    Query,
    /// A mutation.
    Mutation,
    /// A subscription.
    Subscription,
}

impl OperationKind {
    /// Returns the keyword for this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
            Self::Subscription => "subscription",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<OperationType> for OperationKind {
    fn from(ty: OperationType) -> Self {
        match ty {
            OperationType::Query => Self::Query,
            OperationType::Mutation => Self::Mutation,
            OperationType::Subscription => Self::Subscription,
        }
    }
}

/// One operation definition of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationInfo {
    /// Operation name; `None` for anonymous operations.
    pub name: Option<String>,
    /// Operation kind.
    pub kind: OperationKind,
    /// 1-based line of the definition.
    pub line: usize,
    /// 1-based column of the definition.
    pub column: usize,
}

pub(super) fn parse(document: &str) -> DocumentResult<ExecutableDocument> {
    async_graphql_parser::parse_query(document).map_err(|e| DocumentError::Syntax(e.to_string()))
}

/// Lists the operations of a document in source order.
///
/// # Errors
///
/// Returns [`DocumentError::Syntax`] if the document does not parse.
pub fn parse_operations(document: &str) -> DocumentResult<Vec<OperationInfo>> {
    let doc = parse(document)?;

    let mut operations: Vec<OperationInfo> = doc
        .operations
        .iter()
        .map(|(name, op)| OperationInfo {
            name: name.map(ToString::to_string),
            kind: op.node.ty.into(),
            line: op.pos.line,
            column: op.pos.column,
        })
        .collect();
    operations.sort_by_key(|op| (op.line, op.column));
    Ok(operations)
}

/// Names of the named operations, in source order.
///
/// # Errors
///
/// Returns [`DocumentError::Syntax`] if the document does not parse.
pub fn operation_names(document: &str) -> DocumentResult<Vec<String>> {
    Ok(parse_operations(document)?
        .into_iter()
        .filter_map(|op| op.name)
        .collect())
}

/// Picks the operation a request would run.
///
/// An explicit, non-blank name must match. Without one, a document with a
/// single operation implies it.
///
/// # Errors
///
/// Returns an error if the document does not parse, has no operations, the
/// name is unknown, or the choice is ambiguous.
pub fn select_operation(document: &str, operation_name: Option<&str>) -> DocumentResult<OperationInfo> {
    let mut operations = parse_operations(document)?;
    if operations.is_empty() {
        return Err(DocumentError::NoOperations);
    }

    match operation_name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => operations
            .into_iter()
            .find(|op| op.name.as_deref() == Some(name))
            .ok_or_else(|| DocumentError::UnknownOperation(name.to_string())),
        None if operations.len() == 1 => Ok(operations.remove(0)),
        None => Err(DocumentError::OperationNameRequired),
    }
}

/// Kind of the operation [`select_operation`] picks.
///
/// # Errors
///
/// Same as [`select_operation`].
pub fn detect_operation_kind(document: &str, operation_name: Option<&str>) -> DocumentResult<OperationKind> {
    select_operation(document, operation_name).map(|op| op.kind)
}
