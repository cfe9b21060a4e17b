//! Introspection types

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{DomainError, DomainResult};

/// Deserializes `null` as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reference to a root operation type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedTypeRef {
    /// The type name.
    pub name: String,
}

/// The `__schema` payload of an introspection query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionSchema {
    /// Root query type.
    #[serde(default)]
    pub query_type: Option<NamedTypeRef>,
    /// Root mutation type.
    #[serde(default)]
    pub mutation_type: Option<NamedTypeRef>,
    /// Root subscription type.
    #[serde(default)]
    pub subscription_type: Option<NamedTypeRef>,
    /// Every named type, built-ins included.
    #[serde(default, deserialize_with = "null_as_default")]
    pub types: Vec<SchemaType>,
    /// Directive definitions.
    #[serde(default, deserialize_with = "null_as_default")]
    pub directives: Vec<Directive>,
}

impl IntrospectionSchema {
    /// Decodes an introspection response.
    ///
    /// Accepts either the full response (`{"data": {"__schema": ...}}`), the
    /// `data` member, or the bare `__schema` object.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidIntrospection`] if no schema is present or
    /// it does not decode.
    pub fn from_response(value: &Value) -> DomainResult<Self> {
        let schema = value
            .pointer("/data/__schema")
            .or_else(|| value.get("__schema"))
            .or_else(|| value.get("types").map(|_| value))
            .ok_or_else(|| DomainError::InvalidIntrospection("missing __schema".to_string()))?;

        serde_json::from_value(schema.clone())
            .map_err(|e| DomainError::InvalidIntrospection(e.to_string()))
    }

    /// Looks up a named type.
    #[must_use]
    pub fn get_type(&self, name: &str) -> Option<&SchemaType> {
        self.types.iter().find(|t| t.name() == name)
    }

    /// Returns the root query type.
    #[must_use]
    pub fn query_root(&self) -> Option<&SchemaType> {
        self.query_type.as_ref().and_then(|r| self.get_type(&r.name))
    }

    /// Returns the root mutation type.
    #[must_use]
    pub fn mutation_root(&self) -> Option<&SchemaType> {
        self.mutation_type.as_ref().and_then(|r| self.get_type(&r.name))
    }

    /// Returns the root subscription type.
    #[must_use]
    pub fn subscription_root(&self) -> Option<&SchemaType> {
        self.subscription_type
            .as_ref()
            .and_then(|r| self.get_type(&r.name))
    }

    /// Iterates over types that are not introspection built-ins (`__*`).
    pub fn user_types(&self) -> impl Iterator<Item = &SchemaType> {
        self.types.iter().filter(|t| !t.name().starts_with("__"))
    }
}

/// A named schema type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SchemaType {
    /// Output object.
    Object(ObjectType),
    /// Input object.
    InputObject(InputObjectType),
    /// Enumeration.
    Enum(EnumType),
    /// Scalar.
    Scalar(ScalarType),
    /// Interface.
    Interface(InterfaceType),
    /// Union.
    Union(UnionType),
}

impl SchemaType {
    /// The type name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Object(t) => &t.name,
            Self::InputObject(t) => &t.name,
            Self::Enum(t) => &t.name,
            Self::Scalar(t) => &t.name,
            Self::Interface(t) => &t.name,
            Self::Union(t) => &t.name,
        }
    }

    /// The type description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Object(t) => t.description.as_deref(),
            Self::InputObject(t) => t.description.as_deref(),
            Self::Enum(t) => t.description.as_deref(),
            Self::Scalar(t) => t.description.as_deref(),
            Self::Interface(t) => t.description.as_deref(),
            Self::Union(t) => t.description.as_deref(),
        }
    }

    /// The introspection kind tag.
    #[must_use]
    pub const fn kind(&self) -> TypeRefKind {
        match self {
            Self::Object(_) => TypeRefKind::Object,
            Self::InputObject(_) => TypeRefKind::InputObject,
            Self::Enum(_) => TypeRefKind::Enum,
            Self::Scalar(_) => TypeRefKind::Scalar,
            Self::Interface(_) => TypeRefKind::Interface,
            Self::Union(_) => TypeRefKind::Union,
        }
    }

    /// Output fields for objects and interfaces, empty otherwise.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        match self {
            Self::Object(t) => &t.fields,
            Self::Interface(t) => &t.fields,
            _ => &[],
        }
    }

    /// Looks up an output field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields().iter().find(|f| f.name == name)
    }
}

/// An output object type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectType {
    /// Type name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Fields.
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: Vec<Field>,
    /// Implemented interfaces.
    #[serde(default, deserialize_with = "null_as_default")]
    pub interfaces: Vec<TypeRef>,
}

/// An input object type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputObjectType {
    /// Type name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Input fields.
    #[serde(default, deserialize_with = "null_as_default")]
    pub input_fields: Vec<InputValue>,
}

/// An enum type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumType {
    /// Type name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Values.
    #[serde(default, deserialize_with = "null_as_default")]
    pub enum_values: Vec<EnumValue>,
}

/// A scalar type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalarType {
    /// Type name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Specification URL.
    #[serde(default, rename = "specifiedByURL", alias = "specifiedByUrl")]
    pub specified_by_url: Option<String>,
}

/// An interface type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceType {
    /// Type name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Fields.
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: Vec<Field>,
    /// Interfaces this interface implements.
    #[serde(default, deserialize_with = "null_as_default")]
    pub interfaces: Vec<TypeRef>,
    /// Implementing types.
    #[serde(default, deserialize_with = "null_as_default")]
    pub possible_types: Vec<TypeRef>,
}

/// A union type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnionType {
    /// Type name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Member types.
    #[serde(default, deserialize_with = "null_as_default")]
    pub possible_types: Vec<TypeRef>,
}

/// An output field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// Field name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Arguments.
    #[serde(default, deserialize_with = "null_as_default")]
    pub args: Vec<InputValue>,
    /// Field type.
    #[serde(rename = "type")]
    pub ty: TypeRef,
    /// Deprecation flag.
    #[serde(default)]
    pub is_deprecated: bool,
    /// Deprecation reason.
    #[serde(default)]
    pub deprecation_reason: Option<String>,
}

/// An argument or input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputValue {
    /// Name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Value type.
    #[serde(rename = "type")]
    pub ty: TypeRef,
    /// Default value in GraphQL syntax.
    #[serde(default)]
    pub default_value: Option<String>,
}

/// A value of an enum type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumValue {
    /// Value name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Deprecation flag.
    #[serde(default)]
    pub is_deprecated: bool,
    /// Deprecation reason.
    #[serde(default)]
    pub deprecation_reason: Option<String>,
}

/// A directive definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Directive {
    /// Directive name without `@`.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Valid locations.
    #[serde(default, deserialize_with = "null_as_default")]
    pub locations: Vec<String>,
    /// Arguments.
    #[serde(default, deserialize_with = "null_as_default")]
    pub args: Vec<InputValue>,
    /// Whether the directive may repeat.
    #[serde(default)]
    pub is_repeatable: bool,
}

/// Kind tag of a type reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeRefKind {
    /// Scalar.
    Scalar,
    /// Object.
    Object,
    /// Interface.
    Interface,
    /// Union.
    Union,
    /// Enum.
    Enum,
    /// Input object.
    InputObject,
    /// List wrapper.
    List,
    /// Non-null wrapper.
    NonNull,
}

/// A possibly wrapped type reference (`[String!]!`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeRef {
    /// Kind tag.
    pub kind: TypeRefKind,
    /// Name, for named kinds.
    #[serde(default)]
    pub name: Option<String>,
    /// Wrapped type, for `LIST` and `NON_NULL`.
    #[serde(default)]
    pub of_type: Option<Box<TypeRef>>,
}

impl TypeRef {
    /// A named reference.
    #[must_use]
    pub fn named(kind: TypeRefKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: Some(name.into()),
            of_type: None,
        }
    }

    /// Wraps in `NON_NULL`.
    #[must_use]
    pub fn non_null(inner: Self) -> Self {
        Self {
            kind: TypeRefKind::NonNull,
            name: None,
            of_type: Some(Box::new(inner)),
        }
    }

    /// Wraps in `LIST`.
    #[must_use]
    pub fn list(inner: Self) -> Self {
        Self {
            kind: TypeRefKind::List,
            name: None,
            of_type: Some(Box::new(inner)),
        }
    }

    /// The innermost named type.
    #[must_use]
    pub fn named_type(&self) -> Option<&str> {
        match (&self.name, &self.of_type) {
            (Some(name), _) => Some(name),
            (None, Some(inner)) => inner.named_type(),
            (None, None) => None,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind, &self.of_type) {
            (TypeRefKind::NonNull, Some(inner)) => write!(f, "{inner}!"),
            (TypeRefKind::List, Some(inner)) => write!(f, "[{inner}]"),
            _ => f.write_str(self.name.as_deref().unwrap_or("Unknown")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "data": {
                "__schema": {
                    "queryType": {"name": "Query"},
                    "mutationType": null,
                    "subscriptionType": null,
                    "types": [
                        {
                            "kind": "OBJECT", "name": "Query", "description": null,
                            "fields": [{
                                "name": "users", "description": null,
                                "args": [{"name": "first", "description": null,
                                          "type": {"kind": "SCALAR", "name": "Int", "ofType": null},
                                          "defaultValue": "10"}],
                                "type": {"kind": "NON_NULL", "name": null, "ofType":
                                    {"kind": "LIST", "name": null, "ofType":
                                        {"kind": "NON_NULL", "name": null, "ofType":
                                            {"kind": "OBJECT", "name": "User", "ofType": null}}}},
                                "isDeprecated": false, "deprecationReason": null
                            }],
                            "inputFields": null, "interfaces": [], "enumValues": null, "possibleTypes": null
                        },
                        {"kind": "SCALAR", "name": "Int", "description": null, "fields": null,
                         "inputFields": null, "interfaces": null, "enumValues": null, "possibleTypes": null},
                        {"kind": "ENUM", "name": "Role", "description": null, "fields": null,
                         "enumValues": [{"name": "ADMIN", "description": null, "isDeprecated": false, "deprecationReason": null}]},
                        {"kind": "UNION", "name": "Node", "possibleTypes": [{"kind": "OBJECT", "name": "User", "ofType": null}]}
                    ],
                    "directives": []
                }
            }
        })
    }

    #[test]
    fn test_decode_dispatches_by_kind() {
        let schema = IntrospectionSchema::from_response(&sample()).unwrap();
        assert_eq!(schema.types.len(), 4);
        assert!(matches!(schema.get_type("Query"), Some(SchemaType::Object(_))));
        assert!(matches!(schema.get_type("Int"), Some(SchemaType::Scalar(_))));
        assert!(matches!(schema.get_type("Role"), Some(SchemaType::Enum(e)) if e.enum_values.len() == 1));
        assert!(matches!(schema.get_type("Node"), Some(SchemaType::Union(u)) if u.possible_types.len() == 1));
        assert_eq!(schema.query_root().map(SchemaType::name), Some("Query"));
        assert!(schema.mutation_root().is_none());
    }

    #[test]
    fn test_type_ref_display() {
        let schema = IntrospectionSchema::from_response(&sample()).unwrap();
        let field = schema.get_type("Query").unwrap().field("users").unwrap();
        assert_eq!(field.ty.to_string(), "[User!]!");
        assert_eq!(field.ty.named_type(), Some("User"));
        assert_eq!(field.args[0].ty.to_string(), "Int");
    }

    #[test]
    fn test_missing_schema_is_error() {
        let err = IntrospectionSchema::from_response(&json!({"data": null})).unwrap_err();
        assert!(matches!(err, DomainError::InvalidIntrospection(_)));
    }

    #[test]
    fn test_accepts_bare_schema() {
        let bare = sample()["data"]["__schema"].clone();
        assert!(IntrospectionSchema::from_response(&bare).is_ok());
    }
}
