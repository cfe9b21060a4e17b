//! Request planning
//!
//! Turns [`RequestOptions`] into a wire-ready [`OutboundRequest`] without any
//! I/O, so every encoding decision can be tested in isolation.

use graphit_domain::RequestOptions;
use url::Url;

use super::PlanError;
use super::body::{encode_get, encode_multipart, operation_payload, parse_variables, set_query_param};
use super::encoding::{Encoding, select_encoding};
use super::headers::{CONTENT_TYPE, apply_proxy_addressing, build_headers};
use crate::ports::{OutboundBody, OutboundRequest};
use crate::variable_resolver::VariableResolver;

/// A planned request and the decisions that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPlan {
    /// Selected encoding.
    pub encoding: Encoding,
    /// The real destination URL, query-located API key included.
    pub target_url: String,
    /// Whether the request goes through the forwarding proxy.
    pub proxied: bool,
    /// The request to send.
    pub request: OutboundRequest,
}

/// Parses and checks a resolved endpoint.
///
/// # Errors
///
/// Returns [`PlanError::InvalidEndpoint`] for empty, relative or non-HTTP URLs.
pub fn parse_endpoint(endpoint: &str) -> Result<Url, PlanError> {
    let endpoint = endpoint.trim();
    if endpoint.is_empty() {
        return Err(PlanError::InvalidEndpoint);
    }
    let url = Url::parse(endpoint).map_err(|_| PlanError::InvalidEndpoint)?;
    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(url),
        _ => Err(PlanError::InvalidEndpoint),
    }
}

/// Plans one request.
///
/// `proxy_url` is only consulted when `options.use_proxy` is set.
///
/// # Errors
///
/// Returns an error for an invalid endpoint, invalid POST variables, an
/// unreachable file path or an invalid proxy URL.
pub fn plan_request(options: &RequestOptions, proxy_url: &str) -> Result<RequestPlan, PlanError> {
    let resolver = VariableResolver::new(&options.context);

    let mut target = parse_endpoint(&resolver.interpolate(&options.endpoint))?;
    let headers = resolver.interpolate_headers(&options.headers);
    let auth = resolver.interpolate_auth(&options.auth);
    let variables = resolver.interpolate(&options.variables);
    let operation_name = options
        .operation_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    let encoding = select_encoding(options.method, options.has_bound_files(), options.use_proxy);
    let mut header_list = build_headers(&headers, &auth);

    let body = match encoding {
        Encoding::Get => {
            encode_get(&mut target, &options.query, &variables, operation_name);
            header_list.remove(CONTENT_TYPE);
            OutboundBody::Empty
        }
        Encoding::Multipart => {
            header_list.remove(CONTENT_TYPE);
            OutboundBody::Multipart(encode_multipart(
                &options.query,
                &variables,
                operation_name,
                &options.file_mappings,
            )?)
        }
        Encoding::PostJson | Encoding::TunneledGet => {
            let payload =
                operation_payload(&options.query, parse_variables(&variables)?, operation_name);
            OutboundBody::Json(payload.to_string())
        }
    };

    if let Some((key, value)) = auth.query_param() {
        set_query_param(&mut target, key, value);
    }

    let (url, header_list) = if options.use_proxy {
        let proxy = Url::parse(proxy_url.trim())
            .map_err(|e| PlanError::InvalidProxyUrl(format!("{e}: {proxy_url}")))?;
        let proxied = apply_proxy_addressing(
            header_list,
            target.as_str(),
            encoding == Encoding::TunneledGet,
        );
        (proxy.to_string(), proxied)
    } else {
        (target.to_string(), header_list)
    };

    Ok(RequestPlan {
        encoding,
        target_url: target.to_string(),
        proxied: options.use_proxy,
        request: OutboundRequest {
            method: encoding.wire_method(),
            url,
            headers: header_list.into_vec(),
            body,
            timeout_ms: options.timeout_ms,
        },
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::planning::headers::{PROXY_METHOD_HEADER, PROXY_TARGET_HEADER};
    use graphit_domain::{
        AuthConfig, FileHandle, FileMapping, Header, HttpMethod, InterpolationContext,
    };
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    const PROXY: &str = "http://localhost:3000/api/proxy";

    fn ctx() -> InterpolationContext {
        [("API_URL", json!("https://x.test")), ("TOKEN", json!("abc"))]
            .into_iter()
            .collect()
    }

    fn json_body(plan: &RequestPlan) -> Value {
        match &plan.request.body {
            OutboundBody::Json(text) => serde_json::from_str(text).unwrap(),
            other => panic!("expected JSON body, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_endpoint() {
        for endpoint in ["not a url", "", "   ", "{{MISSING}}/graphql", "ftp://x.test", "/graphql"] {
            let options = RequestOptions::new(endpoint, "{ a }");
            assert_eq!(plan_request(&options, PROXY), Err(PlanError::InvalidEndpoint), "{endpoint}");
        }
        assert_eq!(PlanError::InvalidEndpoint.to_string(), "Invalid endpoint URL");
    }

    #[test]
    fn test_post_json_end_to_end() {
        let options = RequestOptions::new("{{API_URL}}/graphql", "query Q { me { id } }")
            .with_variables(r#"{"id": "1"}"#)
            .with_operation_name("Q")
            .with_context(ctx());
        let plan = plan_request(&options, PROXY).unwrap();

        assert_eq!(plan.encoding, Encoding::PostJson);
        assert_eq!(plan.request.url, "https://x.test/graphql");
        assert_eq!(plan.request.method, HttpMethod::Post);
        assert_eq!(plan.request.header("content-type"), Some("application/json"));
        match &plan.request.body {
            OutboundBody::Json(text) => assert_eq!(
                text,
                r#"{"query":"query Q { me { id } }","variables":{"id":"1"},"operationName":"Q"}"#
            ),
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn test_post_without_variables_omits_member() {
        let options = RequestOptions::new("https://x.test/graphql", "{ a }");
        let plan = plan_request(&options, PROXY).unwrap();
        assert_eq!(json_body(&plan), json!({"query": "{ a }"}));
    }

    #[test]
    fn test_post_invalid_variables() {
        let options = RequestOptions::new("https://x.test/graphql", "{ a }").with_variables("{oops");
        let err = plan_request(&options, PROXY).unwrap_err();
        assert!(err.to_string().starts_with("Invalid variables JSON: "));
    }

    #[test]
    fn test_variables_are_interpolated() {
        let options = RequestOptions::new("https://x.test/graphql", "{ a }")
            .with_variables(r#"{"token": "{{TOKEN}}"}"#)
            .with_context(ctx());
        let plan = plan_request(&options, PROXY).unwrap();
        assert_eq!(json_body(&plan)["variables"], json!({"token": "abc"}));
    }

    #[test]
    fn test_get_direct() {
        let options = RequestOptions::new("https://x.test/graphql", "{ a }")
            .with_method(HttpMethod::Get)
            .with_variables("{}")
            .with_auth(AuthConfig::api_key_query("api_key", "{{TOKEN}}"))
            .with_context(ctx());
        let plan = plan_request(&options, PROXY).unwrap();

        assert_eq!(plan.encoding, Encoding::Get);
        assert_eq!(plan.request.method, HttpMethod::Get);
        assert_eq!(plan.request.body, OutboundBody::Empty);
        assert_eq!(plan.request.header(CONTENT_TYPE), None);
        let url = Url::parse(&plan.request.url).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("query".to_string(), "{ a }".to_string()),
                ("api_key".to_string(), "abc".to_string()),
            ]
        );
    }

    #[test]
    fn test_get_through_proxy_is_tunneled() {
        let options = RequestOptions::new("{{API_URL}}/graphql", "{ a }")
            .with_method(HttpMethod::Get)
            .with_proxy(true)
            .with_header(Header::new("X-Trace", "1"))
            .with_auth(AuthConfig::bearer("{{TOKEN}}"))
            .with_context(ctx());
        let plan = plan_request(&options, PROXY).unwrap();

        assert_eq!(plan.encoding, Encoding::TunneledGet);
        assert_eq!(plan.request.method, HttpMethod::Post);
        assert_eq!(plan.request.url, PROXY);
        assert_eq!(plan.request.header(PROXY_METHOD_HEADER), Some("GET"));
        assert_eq!(plan.request.header(PROXY_TARGET_HEADER), Some("https://x.test/graphql"));
        assert_eq!(plan.request.header("X-GraphIt-Header-X-Trace"), Some("1"));
        assert_eq!(plan.request.header("X-GraphIt-Header-Authorization"), Some("Bearer abc"));
        assert_eq!(plan.request.header("Authorization"), None);
        assert_eq!(plan.request.header(CONTENT_TYPE), Some("application/json"));
        assert_eq!(json_body(&plan), json!({"query": "{ a }"}));
    }

    #[test]
    fn test_proxy_target_carries_query_api_key() {
        let options = RequestOptions::new("https://x.test/graphql", "{ a }")
            .with_proxy(true)
            .with_auth(AuthConfig::api_key_query("key", "k 1"));
        let plan = plan_request(&options, PROXY).unwrap();
        assert_eq!(
            plan.request.header(PROXY_TARGET_HEADER),
            Some("https://x.test/graphql?key=k+1")
        );
        assert_eq!(plan.request.header(PROXY_METHOD_HEADER), None);
    }

    #[test]
    fn test_disabled_headers_not_sent() {
        let options = RequestOptions::new("https://x.test/graphql", "{ a }")
            .with_header(Header::disabled("X-Off", "1"));
        let plan = plan_request(&options, PROXY).unwrap();
        assert_eq!(plan.request.header("X-Off"), None);
    }

    #[test]
    fn test_files_force_multipart_even_for_get() {
        let options = RequestOptions::new("https://x.test/graphql", "mutation { up }")
            .with_method(HttpMethod::Get)
            .with_file_mapping(
                FileMapping::new("file.upload").with_file("a.txt", FileHandle::new(b"x".to_vec())),
            );
        let plan = plan_request(&options, PROXY).unwrap();
        assert_eq!(plan.encoding, Encoding::Multipart);
        assert_eq!(plan.request.method, HttpMethod::Post);
        assert_eq!(plan.request.header(CONTENT_TYPE), None);
        assert!(matches!(&plan.request.body, OutboundBody::Multipart(parts) if parts.len() == 3));
    }

    #[test]
    fn test_invalid_proxy_url() {
        let options = RequestOptions::new("https://x.test/graphql", "{ a }").with_proxy(true);
        assert!(matches!(
            plan_request(&options, "nope"),
            Err(PlanError::InvalidProxyUrl(_))
        ));
    }
}
