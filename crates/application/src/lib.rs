//! GraphIt Application - Use cases and ports
//!
//! This crate holds the client core logic: interpolation, request planning,
//! document utilities, the subscription manager and the use cases that tie
//! them together. I/O happens behind the traits in [`ports`].

pub mod document;
pub mod error;
pub mod planning;
pub mod ports;
pub mod subscription;
pub mod use_cases;
pub mod variable_resolver;

pub use document::{DocumentError, OperationInfo, OperationKind};
pub use error::{ApplicationError, ApplicationResult};
pub use subscription::{SubscriptionHandle, SubscriptionListener, SubscriptionManager};
pub use use_cases::{
    ExecuteRequest, FetchSchema, OperationOutcome, OverrideError, RunOperation, validate_request,
};
