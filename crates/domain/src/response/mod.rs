//! Response domain types

mod graphql;
mod result;

pub use graphql::{ErrorLocation, GraphQLError, GraphQLResponse, PARSE_FAILURE_MESSAGE};
pub use result::{FAILED_STATUS_TEXT, RequestResult, RequestStats};
