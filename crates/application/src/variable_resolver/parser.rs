//! Variable parser for {{variable}} syntax
//!
//! Parses strings to extract variable references with their positions.

use std::ops::Range;

/// Represents a parsed variable reference in a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableReference {
    /// The variable name (without {{ }}), trimmed.
    pub name: String,

    /// Byte range in the original string where this reference appears.
    pub span: Range<usize>,
}

impl VariableReference {
    /// Creates a new variable reference.
    #[must_use]
    pub fn new(name: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// Parses a string and extracts all variable references in order of appearance.
///
/// A reference is `{{` followed by one or more characters other than `}` and
/// then `}}`. Names are trimmed; blank names are skipped.
///
/// # Examples
///
/// ```
/// use graphit_application::variable_resolver::parser::parse_variables;
///
/// let refs = parse_variables("{{API_URL}}/graphql?key={{ KEY }}");
/// assert_eq!(refs.len(), 2);
/// assert_eq!(refs[0].name, "API_URL");
/// assert_eq!(refs[1].name, "KEY");
/// ```
#[must_use]
pub fn parse_variables(input: &str) -> Vec<VariableReference> {
    let bytes = input.as_bytes();
    let mut references = Vec::new();
    let mut i = 0;

    while i + 1 < bytes.len() {
        if bytes[i] != b'{' || bytes[i + 1] != b'{' {
            i += 1;
            continue;
        }

        let start = i;
        let name_start = i + 2;
        // Name runs until the first `}`
        let Some(offset) = input[name_start..].find('}') else {
            break;
        };
        let name_end = name_start + offset;

        if name_end > name_start && bytes.get(name_end + 1) == Some(&b'}') {
            let end = name_end + 2;
            let name = input[name_start..name_end].trim();
            if !name.is_empty() {
                references.push(VariableReference::new(name, start..end));
            }
            i = end;
        } else {
            i += 1;
        }
    }

    references
}

/// Returns true if the input string contains any variable references.
#[must_use]
pub fn has_variables(input: &str) -> bool {
    input.contains("{{") && input.contains("}}")
}

/// Extracts the distinct variable names in first-seen order.
#[must_use]
pub fn extract_variable_names(input: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for reference in parse_variables(input) {
        if !names.contains(&reference.name) {
            names.push(reference.name);
        }
    }
    names
}
