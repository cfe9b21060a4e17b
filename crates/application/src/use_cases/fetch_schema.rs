//! Fetch Schema Use Case
//!
//! Loads a schema by sending the introspection query through the regular
//! executor, so interpolation, auth and proxy addressing all apply.

use graphit_domain::{HttpMethod, IntrospectionSchema, RequestOptions};
use tracing::info;

use super::ExecuteRequest;
use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::HttpClient;

/// Operation name of [`INTROSPECTION_QUERY`].
pub const INTROSPECTION_OPERATION: &str = "IntrospectionQuery";

/// The standard introspection query.
pub const INTROSPECTION_QUERY: &str = r"query IntrospectionQuery {
  __schema {
    queryType { name }
    mutationType { name }
    subscriptionType { name }
    types { ...FullType }
    directives {
      name
      description
      locations
      args { ...InputValue }
    }
  }
}

fragment FullType on __Type {
  kind
  name
  description
  fields(includeDeprecated: true) {
    name
    description
    args { ...InputValue }
    type { ...TypeRef }
    isDeprecated
    deprecationReason
  }
  inputFields { ...InputValue }
  interfaces { ...TypeRef }
  enumValues(includeDeprecated: true) {
    name
    description
    isDeprecated
    deprecationReason
  }
  possibleTypes { ...TypeRef }
}

fragment InputValue on __InputValue {
  name
  description
  type { ...TypeRef }
  defaultValue
}

fragment TypeRef on __Type {
  kind
  name
  ofType {
    kind
    name
    ofType {
      kind
      name
      ofType {
        kind
        name
        ofType {
          kind
          name
          ofType {
            kind
            name
            ofType {
              kind
              name
              ofType { kind name }
            }
          }
        }
      }
    }
  }
}
";

/// Loads and decodes a remote schema.
pub struct FetchSchema<C: HttpClient> {
    executor: ExecuteRequest<C>,
}

impl<C: HttpClient> FetchSchema<C> {
    /// Creates a new `FetchSchema` use case.
    #[must_use]
    pub const fn new(executor: ExecuteRequest<C>) -> Self {
        Self { executor }
    }

    /// Fetches the schema of the endpoint described by `options`.
    ///
    /// Only the endpoint, headers, auth, proxy flag, timeout and context of
    /// `options` are used; the query is replaced by the introspection query.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the endpoint answers with
    /// errors and no data, or the payload does not decode.
    pub async fn execute(&self, options: &RequestOptions) -> ApplicationResult<IntrospectionSchema> {
        let request = RequestOptions {
            query: INTROSPECTION_QUERY.to_string(),
            variables: String::new(),
            operation_name: Some(INTROSPECTION_OPERATION.to_string()),
            method: HttpMethod::Post,
            file_mappings: Vec::new(),
            ..options.clone()
        };

        let result = self.executor.execute(&request).await;
        if let Some(error) = result.error {
            return Err(ApplicationError::Http(error));
        }
        let response = result
            .response
            .ok_or_else(|| ApplicationError::Http("empty response".to_string()))?;

        if response.data.is_none() && response.has_errors() {
            let messages: Vec<String> = response
                .errors
                .iter()
                .flatten()
                .map(|e| e.message.clone())
                .collect();
            return Err(ApplicationError::GraphQL(messages.join("; ")));
        }

        let schema = IntrospectionSchema::from_response(&response.to_value())?;
        info!(types = schema.types.len(), "Loaded schema");
        Ok(schema)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use graphit_domain::SchemaType;
    use serde_json::json;

    use crate::document::parse_operations;
    use crate::ports::{HttpClientError, OutboundBody, OutboundRequest, RawResponse};

    struct StaticClient(String);

    #[async_trait]
    impl crate::ports::HttpClient for StaticClient {
        async fn execute(&self, request: &OutboundRequest) -> Result<RawResponse, HttpClientError> {
            let OutboundBody::Json(body) = &request.body else {
                return Err(HttpClientError::Other("expected JSON".to_string()));
            };
            assert!(body.contains("IntrospectionQuery"));
            Ok(RawResponse {
                status: 200,
                status_text: "OK".to_string(),
                headers: Vec::new(),
                body: self.0.clone().into_bytes(),
                duration: Duration::from_millis(1),
            })
        }
    }

    fn fetch(body: serde_json::Value) -> FetchSchema<StaticClient> {
        FetchSchema::new(ExecuteRequest::new(Arc::new(StaticClient(body.to_string()))))
    }

    #[test]
    fn test_introspection_query_parses() {
        let operations = parse_operations(INTROSPECTION_QUERY).unwrap();
        assert_eq!(operations.len(), 1);
        assert_eq!(operations[0].name.as_deref(), Some(INTROSPECTION_OPERATION));
    }

    #[tokio::test]
    async fn test_decodes_schema() {
        let body = json!({"data": {"__schema": {
            "queryType": {"name": "Query"},
            "types": [{"kind": "OBJECT", "name": "Query", "fields": [
                {"name": "ping", "args": [], "type": {"kind": "SCALAR", "name": "String"},
                 "isDeprecated": false}
            ]}],
            "directives": []
        }}});
        let schema = fetch(body)
            .execute(&RequestOptions::new("https://x.test/graphql", ""))
            .await
            .unwrap();
        assert!(matches!(schema.query_root(), Some(SchemaType::Object(_))));
    }

    #[tokio::test]
    async fn test_graphql_errors_without_data() {
        let body = json!({"errors": [{"message": "introspection disabled"}]});
        let err = fetch(body)
            .execute(&RequestOptions::new("https://x.test/graphql", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::GraphQL(ref m) if m == "introspection disabled"));
    }

    #[tokio::test]
    async fn test_invalid_endpoint() {
        let err = fetch(json!({}))
            .execute(&RequestOptions::new("nope", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Http(ref m) if m == "Invalid endpoint URL"));
    }
}
