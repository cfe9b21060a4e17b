//! Variable resolution engine
//!
//! Resolves `{{variable}}` references against an [`InterpolationContext`].
//! Unknown names leave the placeholder text untouched.

use graphit_domain::{AuthConfig, Header, InterpolationContext};
use serde_json::Value;

use super::parser::{extract_variable_names, has_variables, parse_variables};

/// Result of variable resolution for a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionResult {
    /// The resolved string with all known variables substituted.
    pub resolved: String,

    /// Variable names that could not be resolved, in order of appearance.
    pub unresolved: Vec<String>,
}

impl ResolutionResult {
    /// Creates a result for input with no variables.
    #[must_use]
    pub fn no_variables(input: &str) -> Self {
        Self {
            resolved: input.to_string(),
            unresolved: Vec::new(),
        }
    }

    /// Whether all variables were successfully resolved.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Outcome of [`validate_interpolation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpolationValidation {
    /// True when every referenced name resolves.
    pub valid: bool,
    /// Names that do not resolve, deduplicated in first-seen order.
    pub missing: Vec<String>,
}

/// The variable resolution engine.
#[derive(Debug, Clone, Copy)]
pub struct VariableResolver<'a> {
    context: &'a InterpolationContext,
}

impl<'a> VariableResolver<'a> {
    /// Creates a new resolver over the given context.
    #[must_use]
    pub const fn new(context: &'a InterpolationContext) -> Self {
        Self { context }
    }

    /// Returns the context.
    #[must_use]
    pub const fn context(&self) -> &'a InterpolationContext {
        self.context
    }

    /// Resolves all variables in the input string.
    #[must_use]
    pub fn resolve(&self, input: &str) -> ResolutionResult {
        if !has_variables(input) {
            return ResolutionResult::no_variables(input);
        }

        let mut unresolved = Vec::new();
        let mut result = String::with_capacity(input.len());
        let mut last_end = 0;

        for var_ref in parse_variables(input) {
            // Append text before this variable
            result.push_str(&input[last_end..var_ref.span.start]);

            if let Some(value) = self.context.get(&var_ref.name) {
                result.push_str(&stringify(value));
            } else {
                // Keep the original {{variable}} for unresolved
                result.push_str(&input[var_ref.span.clone()]);
                unresolved.push(var_ref.name);
            }

            last_end = var_ref.span.end;
        }

        result.push_str(&input[last_end..]);

        ResolutionResult {
            resolved: result,
            unresolved,
        }
    }

    /// Substitutes known variables, leaving unknown placeholders as-is.
    #[must_use]
    pub fn interpolate(&self, input: &str) -> String {
        self.resolve(input).resolved
    }

    /// Interpolates `key` and `value` of every header, keeping ids and flags.
    #[must_use]
    pub fn interpolate_headers(&self, headers: &[Header]) -> Vec<Header> {
        headers
            .iter()
            .map(|h| Header {
                key: self.interpolate(&h.key),
                value: self.interpolate(&h.value),
                ..h.clone()
            })
            .collect()
    }

    /// Interpolates every string field of the auth configuration.
    #[must_use]
    pub fn interpolate_auth(&self, auth: &AuthConfig) -> AuthConfig {
        auth.map_strings(|s| self.interpolate(s))
    }

    /// Reports which referenced names do not resolve.
    #[must_use]
    pub fn validate(&self, input: &str) -> InterpolationValidation {
        let missing: Vec<String> = extract_variable_names(input)
            .into_iter()
            .filter(|name| !self.context.contains(name))
            .collect();
        InterpolationValidation {
            valid: missing.is_empty(),
            missing,
        }
    }
}

/// Substitutes `{{name}}` placeholders in `template` from `context`.
///
/// # Examples
///
/// ```
/// use graphit_application::variable_resolver::interpolate;
/// use graphit_domain::InterpolationContext;
/// use serde_json::json;
///
/// let ctx: InterpolationContext = [("API_URL", json!("https://x.test"))].into_iter().collect();
/// assert_eq!(interpolate("{{API_URL}}/graphql", &ctx), "https://x.test/graphql");
/// assert_eq!(interpolate("{{MISSING}}", &ctx), "{{MISSING}}");
/// ```
#[must_use]
pub fn interpolate(template: &str, context: &InterpolationContext) -> String {
    VariableResolver::new(context).interpolate(template)
}

/// Reports whether every name referenced in `template` resolves in `context`.
#[must_use]
pub fn validate_interpolation(
    template: &str,
    context: &InterpolationContext,
) -> InterpolationValidation {
    VariableResolver::new(context).validate(template)
}

/// Interpolates a header list.
#[must_use]
pub fn interpolate_headers(headers: &[Header], context: &InterpolationContext) -> Vec<Header> {
    VariableResolver::new(context).interpolate_headers(headers)
}

/// Interpolates an auth configuration.
#[must_use]
pub fn interpolate_auth(auth: &AuthConfig, context: &InterpolationContext) -> AuthConfig {
    VariableResolver::new(context).interpolate_auth(auth)
}

/// Converts a context value to its substitution text.
///
/// Strings are inserted raw, objects and arrays as compact JSON, other
/// primitives with their default text form.
#[must_use]
#[allow(clippy::float_cmp, clippy::cast_possible_truncation)]
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            // Integral floats print without a fraction
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        },
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}
