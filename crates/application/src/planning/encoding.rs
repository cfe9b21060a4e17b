//! Wire encoding selection

use std::fmt;

use graphit_domain::HttpMethod;

/// How an operation is put on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// `multipart/form-data` with `operations`, `map` and file parts.
    Multipart,
    /// Query-string GET.
    Get,
    /// GET intent sent to the proxy as a JSON POST with `X-GraphIt-Method: GET`.
    TunneledGet,
    /// JSON POST body.
    PostJson,
}

impl Encoding {
    /// The method used on the wire.
    #[must_use]
    pub const fn wire_method(self) -> HttpMethod {
        match self {
            Self::Get => HttpMethod::Get,
            Self::Multipart | Self::TunneledGet | Self::PostJson => HttpMethod::Post,
        }
    }

    /// Returns a short label for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Multipart => "multipart",
            Self::Get => "get",
            Self::TunneledGet => "tunneled-get",
            Self::PostJson => "post-json",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Picks the encoding.
///
/// Bound files always win, since only multipart can carry binary payloads.
/// GET becomes a tunnelled POST under proxy mode.
#[must_use]
pub const fn select_encoding(method: HttpMethod, has_bound_files: bool, use_proxy: bool) -> Encoding {
    if has_bound_files {
        return Encoding::Multipart;
    }
    match (method, use_proxy) {
        (HttpMethod::Get, false) => Encoding::Get,
        (HttpMethod::Get, true) => Encoding::TunneledGet,
        (HttpMethod::Post, _) => Encoding::PostJson,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_win_over_method() {
        assert_eq!(select_encoding(HttpMethod::Get, true, false), Encoding::Multipart);
        assert_eq!(select_encoding(HttpMethod::Get, true, true), Encoding::Multipart);
        assert_eq!(select_encoding(HttpMethod::Post, true, false), Encoding::Multipart);
    }

    #[test]
    fn test_get_selection() {
        assert_eq!(select_encoding(HttpMethod::Get, false, false), Encoding::Get);
        assert_eq!(select_encoding(HttpMethod::Get, false, true), Encoding::TunneledGet);
    }

    #[test]
    fn test_post_selection() {
        assert_eq!(select_encoding(HttpMethod::Post, false, false), Encoding::PostJson);
        assert_eq!(select_encoding(HttpMethod::Post, false, true), Encoding::PostJson);
    }

    #[test]
    fn test_wire_method() {
        assert_eq!(Encoding::Get.wire_method(), HttpMethod::Get);
        assert_eq!(Encoding::TunneledGet.wire_method(), HttpMethod::Post);
        assert_eq!(Encoding::Multipart.wire_method(), HttpMethod::Post);
    }
}
