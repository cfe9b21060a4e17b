//! Request domain types

mod file;
mod header;
mod method;
mod options;

pub use file::{FileHandle, FileMapping};
pub use header::{Header, ResponseHeader};
pub use method::HttpMethod;
pub use options::{DEFAULT_TIMEOUT_MS, RequestOptions, SubscriptionOptions};
