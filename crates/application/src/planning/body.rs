//! Request body and query-string encoding

use graphit_domain::FileMapping;
use serde_json::{Map, Value};
use url::Url;

use super::PlanError;
use crate::ports::MultipartPart;

const DEFAULT_FILE_NAME: &str = "upload";

/// Parses variables text for a JSON body.
///
/// Blank text means no variables.
///
/// # Errors
///
/// Returns [`PlanError::InvalidVariables`] if the text is not valid JSON.
pub fn parse_variables(text: &str) -> Result<Option<Value>, PlanError> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(text)
        .map(Some)
        .map_err(|e| PlanError::InvalidVariables(e.to_string()))
}

/// Builds the `{query, variables, operationName}` object, omitting absent members.
#[must_use]
pub fn operation_payload(
    query: &str,
    variables: Option<Value>,
    operation_name: Option<&str>,
) -> Value {
    let mut payload = Map::new();
    payload.insert("query".to_string(), Value::String(query.to_string()));
    if let Some(variables) = variables {
        payload.insert("variables".to_string(), variables);
    }
    if let Some(name) = operation_name {
        payload.insert("operationName".to_string(), Value::String(name.to_string()));
    }
    Value::Object(payload)
}

/// Returns true if the GET query string should carry `variables`.
#[must_use]
pub fn should_send_get_variables(text: &str) -> bool {
    !text.is_empty() && text != "{}"
}

/// Sets a query parameter, replacing any existing one with the same name.
pub fn set_query_param(url: &mut Url, key: &str, value: &str) {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != key)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut pairs = url.query_pairs_mut();
    pairs.clear();
    for (k, v) in &kept {
        pairs.append_pair(k, v);
    }
    pairs.append_pair(key, value);
}

/// Encodes the operation into the URL's query string.
pub fn encode_get(url: &mut Url, query: &str, variables: &str, operation_name: Option<&str>) {
    set_query_param(url, "query", query);
    if should_send_get_variables(variables) {
        set_query_param(url, "variables", variables);
    }
    if let Some(name) = operation_name {
        set_query_param(url, "operationName", name);
    }
}

/// Sets the value at a dot-path to `null`, creating intermediate objects.
///
/// Numeric segments index into existing arrays and may append one slot
/// past the end.
///
/// # Errors
///
/// Returns [`PlanError::InvalidFilePath`] if a numeric segment points
/// further past the end of an array.
pub fn set_path_null(root: &mut Value, path: &str) -> Result<(), PlanError> {
    let mut current = root;
    for segment in path.split('.').filter(|s| !s.is_empty()) {
        current = child_mut(current, segment)
            .ok_or_else(|| PlanError::InvalidFilePath(path.to_string()))?;
    }
    *current = Value::Null;
    Ok(())
}

fn child_mut<'a>(value: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    let index = segment.parse::<usize>().ok().filter(|_| value.is_array());
    if index.is_none() && !value.is_object() {
        *value = Value::Object(Map::new());
    }

    match value {
        Value::Array(items) => {
            let index = index?;
            if index == items.len() {
                items.push(Value::Null);
            }
            items.get_mut(index)
        }
        Value::Object(map) => Some(map.entry(segment).or_insert(Value::Null)),
        other => Some(other),
    }
}

/// Builds the parts of a GraphQL multipart request.
///
/// Malformed or non-object variables degrade to `{}`. Only bound mappings
/// are counted; each gets the next index, its slot in `variables` is nulled
/// and its path is recorded in `map`.
///
/// # Errors
///
/// Returns [`PlanError::InvalidFilePath`] for a path that cannot be nulled.
pub fn encode_multipart(
    query: &str,
    variables: &str,
    operation_name: Option<&str>,
    mappings: &[FileMapping],
) -> Result<Vec<MultipartPart>, PlanError> {
    let mut vars = match serde_json::from_str::<Value>(variables) {
        Ok(value @ Value::Object(_)) => value,
        _ => Value::Object(Map::new()),
    };

    let mut map = Map::new();
    let mut files = Vec::new();

    for (index, mapping) in mappings.iter().filter(|m| m.is_bound()).enumerate() {
        let Some(file) = &mapping.file else { continue };
        set_path_null(&mut vars, &mapping.variable_path)?;
        map.insert(
            index.to_string(),
            Value::Array(vec![Value::String(format!(
                "variables.{}",
                mapping.variable_path
            ))]),
        );
        let file_name = if mapping.file_name.is_empty() {
            DEFAULT_FILE_NAME
        } else {
            mapping.file_name.as_str()
        };
        files.push(MultipartPart::file(index.to_string(), file_name, file.clone()));
    }

    let operations = operation_payload(query, Some(vars), operation_name);

    let mut parts = Vec::with_capacity(files.len() + 2);
    parts.push(MultipartPart::text("operations", operations.to_string()));
    parts.push(MultipartPart::text("map", Value::Object(map).to_string()));
    parts.extend(files);
    Ok(parts)
}
