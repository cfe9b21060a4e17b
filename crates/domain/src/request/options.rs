//! Request options

use serde::{Deserialize, Serialize};

use super::{FileMapping, Header, HttpMethod};
use crate::auth::AuthConfig;
use crate::environment::InterpolationContext;
use crate::subscription::SubscriptionProtocol;

/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

const fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// Everything needed to execute one GraphQL operation.
///
/// String fields are templates; `{{name}}` placeholders are resolved against
/// `context` at execution time. The executor never mutates options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOptions {
    /// Endpoint URL template.
    pub endpoint: String,
    /// GraphQL document text.
    pub query: String,
    /// Variables as JSON text.
    #[serde(default)]
    pub variables: String,
    /// Operation to execute when the document holds several.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
    /// Header list, disabled entries included.
    #[serde(default)]
    pub headers: Vec<Header>,
    /// Authentication configuration.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Configured HTTP method.
    #[serde(default)]
    pub method: HttpMethod,
    /// File upload mappings.
    #[serde(default)]
    pub file_mappings: Vec<FileMapping>,
    /// Route the request through the forwarding proxy.
    #[serde(default)]
    pub use_proxy: bool,
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Values for `{{name}}` placeholders.
    #[serde(default)]
    pub context: InterpolationContext,
}

impl RequestOptions {
    /// Creates POST options with defaults.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            query: query.into(),
            variables: String::new(),
            operation_name: None,
            headers: Vec::new(),
            auth: AuthConfig::None,
            method: HttpMethod::Post,
            file_mappings: Vec::new(),
            use_proxy: false,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            context: InterpolationContext::new(),
        }
    }

    /// Sets the variables JSON text.
    #[must_use]
    pub fn with_variables(mut self, variables: impl Into<String>) -> Self {
        self.variables = variables.into();
        self
    }

    /// Sets the operation name.
    #[must_use]
    pub fn with_operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    /// Appends a header.
    #[must_use]
    pub fn with_header(mut self, header: Header) -> Self {
        self.headers.push(header);
        self
    }

    /// Sets the auth configuration.
    #[must_use]
    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self
    }

    /// Sets the HTTP method.
    #[must_use]
    pub const fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Appends a file mapping.
    #[must_use]
    pub fn with_file_mapping(mut self, mapping: FileMapping) -> Self {
        self.file_mappings.push(mapping);
        self
    }

    /// Enables or disables proxy mode.
    #[must_use]
    pub const fn with_proxy(mut self, use_proxy: bool) -> Self {
        self.use_proxy = use_proxy;
        self
    }

    /// Sets the timeout.
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Sets the interpolation context.
    #[must_use]
    pub fn with_context(mut self, context: InterpolationContext) -> Self {
        self.context = context;
        self
    }

    /// Returns true if any file mapping has a bound file.
    #[must_use]
    pub fn has_bound_files(&self) -> bool {
        self.file_mappings.iter().any(FileMapping::is_bound)
    }

    /// Iterates over headers that participate in the request.
    pub fn active_headers(&self) -> impl Iterator<Item = &Header> {
        self.headers.iter().filter(|h| h.is_active())
    }
}

/// Everything needed to open one subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionOptions {
    /// Endpoint URL template (`http(s)://`, converted for WebSocket).
    pub endpoint: String,
    /// GraphQL subscription document.
    pub query: String,
    /// Variables as JSON text.
    #[serde(default)]
    pub variables: String,
    /// Operation to execute when the document holds several.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
    /// Header list, disabled entries included.
    #[serde(default)]
    pub headers: Vec<Header>,
    /// Authentication configuration.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Transport protocol.
    #[serde(default)]
    pub protocol: SubscriptionProtocol,
    /// Values for `{{name}}` placeholders.
    #[serde(default)]
    pub context: InterpolationContext,
}

impl SubscriptionOptions {
    /// Creates options for the given protocol.
    #[must_use]
    pub fn new(
        endpoint: impl Into<String>,
        query: impl Into<String>,
        protocol: SubscriptionProtocol,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            query: query.into(),
            variables: String::new(),
            operation_name: None,
            headers: Vec::new(),
            auth: AuthConfig::None,
            protocol,
            context: InterpolationContext::new(),
        }
    }

    /// Sets the variables JSON text.
    #[must_use]
    pub fn with_variables(mut self, variables: impl Into<String>) -> Self {
        self.variables = variables.into();
        self
    }

    /// Sets the operation name.
    #[must_use]
    pub fn with_operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    /// Appends a header.
    #[must_use]
    pub fn with_header(mut self, header: Header) -> Self {
        self.headers.push(header);
        self
    }

    /// Sets the auth configuration.
    #[must_use]
    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self
    }

    /// Sets the interpolation context.
    #[must_use]
    pub fn with_context(mut self, context: InterpolationContext) -> Self {
        self.context = context;
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::request::FileHandle;

    #[test]
    fn test_defaults_from_json() {
        let options: RequestOptions =
            serde_json::from_str(r#"{"endpoint":"{{API_URL}}/graphql","query":"{ me { id } }"}"#)
                .unwrap();
        assert_eq!(options.method, HttpMethod::Post);
        assert_eq!(options.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert!(!options.use_proxy);
        assert!(options.variables.is_empty());
    }

    #[test]
    fn test_has_bound_files() {
        let options = RequestOptions::new("http://x.test", "mutation { a }")
            .with_file_mapping(FileMapping::new("file"));
        assert!(!options.has_bound_files());

        let options = options.with_file_mapping(
            FileMapping::new("other").with_file("a.bin", FileHandle::new(vec![1_u8])),
        );
        assert!(options.has_bound_files());
    }

    #[test]
    fn test_active_headers() {
        let options = RequestOptions::new("http://x.test", "{ a }")
            .with_header(Header::new("A", "1"))
            .with_header(Header::disabled("B", "2"))
            .with_header(Header::new("  ", "3"));
        let keys: Vec<_> = options.active_headers().map(|h| h.key.as_str()).collect();
        assert_eq!(keys, vec!["A"]);
    }
}
