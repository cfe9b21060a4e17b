//! Outbound header construction and proxy addressing

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use graphit_domain::{ApiKeyLocation, AuthConfig, Header};

/// `Content-Type` header name.
pub const CONTENT_TYPE: &str = "Content-Type";
/// JSON media type.
pub const JSON_CONTENT_TYPE: &str = "application/json";
/// Prefix applied to every application header in proxy mode.
pub const PROXY_HEADER_PREFIX: &str = "X-GraphIt-Header-";
/// Header carrying the real destination URL in proxy mode.
pub const PROXY_TARGET_HEADER: &str = "X-GraphIt-Target";
/// Header asking the forwarder to re-issue the request with another method.
pub const PROXY_METHOD_HEADER: &str = "X-GraphIt-Method";

/// Ordered header list with case-insensitive names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderList {
    entries: Vec<(String, String)>,
}

impl HeaderList {
    /// Creates an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Sets a header, replacing an existing one with the same name in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&name))
        {
            *entry = (name, value);
        } else {
            self.entries.push((name, value));
        }
    }

    /// Removes a header by name.
    pub fn remove(&mut self, name: &str) {
        self.entries.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    }

    /// Returns a header value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of headers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consumes the list.
    #[must_use]
    pub fn into_vec(self) -> Vec<(String, String)> {
        self.entries
    }
}

/// Derives the single header produced by the active auth mode.
///
/// Query-located API keys produce no header.
#[must_use]
pub fn auth_header(auth: &AuthConfig) -> Option<(String, String)> {
    match auth {
        AuthConfig::None => None,
        AuthConfig::Bearer { token } if !token.is_empty() => {
            Some(("Authorization".to_string(), format!("Bearer {token}")))
        }
        AuthConfig::Basic { username, password } if !username.is_empty() || !password.is_empty() => {
            let encoded = STANDARD.encode(format!("{username}:{password}"));
            Some(("Authorization".to_string(), format!("Basic {encoded}")))
        }
        AuthConfig::ApiKey {
            key,
            value,
            add_to: ApiKeyLocation::Header,
        } if !key.is_empty() => Some((key.clone(), value.clone())),
        _ => None,
    }
}

/// Builds the application header map from resolved headers and auth.
///
/// Starts with `Content-Type: application/json`, then every active header,
/// then the auth header. Later entries replace earlier ones with the same name.
#[must_use]
pub fn build_headers(headers: &[Header], auth: &AuthConfig) -> HeaderList {
    let mut list = HeaderList::new();
    list.set(CONTENT_TYPE, JSON_CONTENT_TYPE);

    for header in headers.iter().filter(|h| h.is_active()) {
        list.set(header.key.trim(), header.value.as_str());
    }

    if let Some((name, value)) = auth_header(auth) {
        list.set(name, value);
    }

    list
}

/// Rewrites headers for the forwarding proxy.
///
/// Every header except `Content-Type` is renamed with the
/// `X-GraphIt-Header-` prefix; the real destination goes in
/// `X-GraphIt-Target`. Tunnelled GETs also carry `X-GraphIt-Method: GET`.
#[must_use]
pub fn apply_proxy_addressing(headers: HeaderList, target: &str, tunneled_get: bool) -> HeaderList {
    let mut proxied = HeaderList::new();

    for (name, value) in headers.into_vec() {
        if name.eq_ignore_ascii_case(CONTENT_TYPE) {
            proxied.set(name, value);
        } else {
            proxied.set(format!("{PROXY_HEADER_PREFIX}{name}"), value);
        }
    }

    proxied.set(PROXY_TARGET_HEADER, target);
    if tunneled_get {
        proxied.set(PROXY_METHOD_HEADER, "GET");
    }

    proxied
}
