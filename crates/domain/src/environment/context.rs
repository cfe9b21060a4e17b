//! Interpolation context

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Immutable name → value mapping used to substitute `{{name}}` placeholders.
///
/// Built once per run from the active environment. Layering overrides produces
/// a new context instead of mutating this one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InterpolationContext {
    values: HashMap<String, Value>,
}

impl InterpolationContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Returns true if the name resolves.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the context has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over all entries in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// Returns a new context where `overrides` shadow existing entries.
    #[must_use]
    pub fn layered<'a, I>(&self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a Value)>,
    {
        let mut values = self.values.clone();
        for (name, value) in overrides {
            values.insert(name.clone(), value.clone());
        }
        Self { values }
    }

    /// Returns the entries as a JSON object.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Map<String, Value> {
        self.values
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for InterpolationContext {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_layered_overrides_do_not_mutate() {
        let base: InterpolationContext = [("A", json!("1")), ("B", json!("2"))].into_iter().collect();
        let overrides: HashMap<String, Value> = [("A".to_string(), json!("9"))].into_iter().collect();

        let layered = base.layered(&overrides);
        assert_eq!(layered.get("A"), Some(&json!("9")));
        assert_eq!(layered.get("B"), Some(&json!("2")));
        assert_eq!(base.get("A"), Some(&json!("1")));
    }

    #[test]
    fn test_unknown_name() {
        let ctx = InterpolationContext::new();
        assert!(ctx.get("missing").is_none());
        assert!(!ctx.contains("missing"));
        assert!(ctx.is_empty());
    }
}
