//! Application use cases (business logic orchestration).

mod execute_request;
mod fetch_schema;
mod run_operation;
mod validate_request;

pub use execute_request::ExecuteRequest;
pub use fetch_schema::{FetchSchema, INTROSPECTION_OPERATION, INTROSPECTION_QUERY};
pub use run_operation::{OperationOutcome, OverrideError, RunOperation, apply_overrides};
pub use validate_request::{MissingVariable, PlaceholderSite, validate_request};
