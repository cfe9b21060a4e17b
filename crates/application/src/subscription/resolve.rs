//! Resolution of subscription options into a transport request.

use graphit_domain::{SubscriptionOptions, SubscriptionRequest};
use serde_json::Value;

use crate::planning::body::{parse_variables, set_query_param};
use crate::planning::headers::CONTENT_TYPE;
use crate::planning::{PlanError, build_headers, parse_endpoint};
use crate::ports::SubscriptionError;
use crate::variable_resolver::VariableResolver;

/// Interpolates endpoint, headers, auth and variables of `options`.
///
/// A query-located API key is appended to the endpoint.
///
/// # Errors
///
/// Returns an error if the endpoint is not an absolute HTTP(S) URL or the
/// variables are not a JSON object.
pub fn resolve_subscription(options: &SubscriptionOptions) -> Result<SubscriptionRequest, SubscriptionError> {
    let resolver = VariableResolver::new(&options.context);

    let mut url = parse_endpoint(&resolver.interpolate(&options.endpoint))
        .map_err(|_| SubscriptionError::InvalidEndpoint)?;
    let auth = resolver.interpolate_auth(&options.auth);
    if let Some((key, value)) = auth.query_param() {
        set_query_param(&mut url, key, value);
    }

    let mut headers = build_headers(&resolver.interpolate_headers(&options.headers), &auth);
    headers.remove(CONTENT_TYPE);

    let variables = match parse_variables(&resolver.interpolate(&options.variables)) {
        Ok(None | Some(Value::Null)) => None,
        Ok(Some(Value::Object(map))) => Some(map),
        Ok(Some(_)) => {
            return Err(SubscriptionError::InvalidVariables(
                "expected a JSON object".to_string(),
            ));
        }
        Err(PlanError::InvalidVariables(detail)) => {
            return Err(SubscriptionError::InvalidVariables(detail));
        }
        Err(_) => return Err(SubscriptionError::InvalidEndpoint),
    };

    Ok(SubscriptionRequest {
        url: url.to_string(),
        query: options.query.clone(),
        variables,
        operation_name: options
            .operation_name
            .clone()
            .filter(|name| !name.trim().is_empty()),
        headers: headers.into_vec(),
        protocol: options.protocol,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use graphit_domain::{AuthConfig, Header, InterpolationContext, SubscriptionProtocol};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn context() -> InterpolationContext {
        [
            ("API_URL", json!("https://x.test")),
            ("TOKEN", json!("abc")),
            ("ROOM", json!(7)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_resolves_everything() {
        let options = SubscriptionOptions::new(
            "{{API_URL}}/graphql",
            "subscription { tick }",
            SubscriptionProtocol::Ws,
        )
        .with_variables(r#"{"room": {{ROOM}}}"#)
        .with_operation_name("Ticks")
        .with_header(Header::new("X-Client", "graphit"))
        .with_header(Header::disabled("X-Off", "1"))
        .with_auth(AuthConfig::bearer("{{TOKEN}}"))
        .with_context(context());

        let request = resolve_subscription(&options).unwrap();
        assert_eq!(request.url, "https://x.test/graphql");
        assert_eq!(
            request.headers,
            vec![
                ("X-Client".to_string(), "graphit".to_string()),
                ("Authorization".to_string(), "Bearer abc".to_string()),
            ]
        );
        assert_eq!(
            request.payload(),
            json!({"query": "subscription { tick }", "variables": {"room": 7}, "operationName": "Ticks"})
        );
    }

    #[test]
    fn test_query_api_key_goes_on_url() {
        let options = SubscriptionOptions::new("https://x.test/graphql", "subscription { a }", SubscriptionProtocol::Sse)
            .with_auth(AuthConfig::api_key_query("api_key", "k1"));
        let request = resolve_subscription(&options).unwrap();
        assert_eq!(request.url, "https://x.test/graphql?api_key=k1");
        assert!(request.headers.is_empty());
    }

    #[test]
    fn test_rejects_bad_input() {
        let bad_url = SubscriptionOptions::new("{{MISSING}}/graphql", "subscription { a }", SubscriptionProtocol::Ws);
        assert_eq!(
            resolve_subscription(&bad_url).unwrap_err(),
            SubscriptionError::InvalidEndpoint
        );

        let bad_vars = SubscriptionOptions::new("https://x.test", "subscription { a }", SubscriptionProtocol::Ws)
            .with_variables("[1]");
        assert!(matches!(
            resolve_subscription(&bad_vars),
            Err(SubscriptionError::InvalidVariables(_))
        ));
    }
}
