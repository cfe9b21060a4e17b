//! SDL rendering of an introspected schema

use std::fmt::Write;

use super::types::{
    Directive, EnumValue, Field, InputValue, IntrospectionSchema, NamedTypeRef, SchemaType,
    TypeRef,
};

const BUILTIN_SCALARS: [&str; 5] = ["String", "Int", "Float", "Boolean", "ID"];
const BUILTIN_DIRECTIVES: [&str; 5] = ["skip", "include", "deprecated", "specifiedBy", "oneOf"];
const DEFAULT_DEPRECATION: &str = "No longer supported";

impl IntrospectionSchema {
    /// Renders the schema as SDL.
    ///
    /// Built-in scalars, built-in directives and introspection types are
    /// omitted. A `schema` block is only emitted when root names differ from
    /// `Query`, `Mutation` and `Subscription`.
    #[must_use]
    pub fn to_sdl(&self) -> String {
        let mut blocks = Vec::new();

        if let Some(block) = self.schema_block() {
            blocks.push(block);
        }

        blocks.extend(
            self.directives
                .iter()
                .filter(|d| !BUILTIN_DIRECTIVES.contains(&d.name.as_str()))
                .map(render_directive),
        );

        blocks.extend(
            self.user_types()
                .filter(|t| !BUILTIN_SCALARS.contains(&t.name()))
                .map(render_type),
        );

        let mut sdl = blocks.join("\n\n");
        sdl.push('\n');
        sdl
    }

    fn schema_block(&self) -> Option<String> {
        let roots = [
            ("query", &self.query_type, "Query"),
            ("mutation", &self.mutation_type, "Mutation"),
            ("subscription", &self.subscription_type, "Subscription"),
        ];
        let is_default = roots
            .iter()
            .all(|(_, r, default)| r.as_ref().is_none_or(|r| r.name == *default));
        if is_default {
            return None;
        }

        let mut out = String::from("schema {\n");
        for (op, root, _) in roots {
            if let Some(NamedTypeRef { name }) = root {
                let _ = writeln!(out, "  {op}: {name}");
            }
        }
        out.push('}');
        Some(out)
    }
}

fn render_type(ty: &SchemaType) -> String {
    let mut out = description(ty.description(), "");
    match ty {
        SchemaType::Scalar(s) => {
            let _ = write!(out, "scalar {}", s.name);
            if let Some(url) = &s.specified_by_url {
                let _ = write!(out, " @specifiedBy(url: {})", quote(url));
            }
        }
        SchemaType::Object(o) => {
            let _ = write!(out, "type {}{}", o.name, implements(&o.interfaces));
            out.push_str(&fields_block(&o.fields));
        }
        SchemaType::Interface(i) => {
            let _ = write!(out, "interface {}{}", i.name, implements(&i.interfaces));
            out.push_str(&fields_block(&i.fields));
        }
        SchemaType::Union(u) => {
            let members: Vec<String> = u.possible_types.iter().map(ToString::to_string).collect();
            let _ = write!(out, "union {}", u.name);
            if !members.is_empty() {
                let _ = write!(out, " = {}", members.join(" | "));
            }
        }
        SchemaType::Enum(e) => {
            let _ = write!(out, "enum {} {{", e.name);
            for value in &e.enum_values {
                out.push('\n');
                out.push_str(&render_enum_value(value));
            }
            out.push_str("\n}");
        }
        SchemaType::InputObject(i) => {
            let _ = write!(out, "input {} {{", i.name);
            for field in &i.input_fields {
                out.push('\n');
                out.push_str(&description(field.description.as_deref(), "  "));
                let _ = write!(out, "  {}", render_input_value(field));
            }
            out.push_str("\n}");
        }
    }
    out
}

fn implements(interfaces: &[TypeRef]) -> String {
    if interfaces.is_empty() {
        return String::new();
    }
    let names: Vec<String> = interfaces.iter().map(ToString::to_string).collect();
    format!(" implements {}", names.join(" & "))
}

fn fields_block(fields: &[Field]) -> String {
    let mut out = String::from(" {");
    for field in fields {
        out.push('\n');
        out.push_str(&description(field.description.as_deref(), "  "));
        let _ = write!(out, "  {}{}: {}", field.name, arguments(&field.args), field.ty);
        out.push_str(&deprecated(field.is_deprecated, field.deprecation_reason.as_deref()));
    }
    out.push_str("\n}");
    out
}

fn render_enum_value(value: &EnumValue) -> String {
    let mut out = description(value.description.as_deref(), "  ");
    let _ = write!(out, "  {}", value.name);
    out.push_str(&deprecated(value.is_deprecated, value.deprecation_reason.as_deref()));
    out
}

fn render_input_value(value: &InputValue) -> String {
    let mut out = format!("{}: {}", value.name, value.ty);
    if let Some(default) = &value.default_value {
        let _ = write!(out, " = {default}");
    }
    out
}

fn arguments(args: &[InputValue]) -> String {
    if args.is_empty() {
        return String::new();
    }
    let rendered: Vec<String> = args.iter().map(render_input_value).collect();
    format!("({})", rendered.join(", "))
}

fn render_directive(directive: &Directive) -> String {
    let mut out = description(directive.description.as_deref(), "");
    let _ = write!(out, "directive @{}{}", directive.name, arguments(&directive.args));
    if directive.is_repeatable {
        out.push_str(" repeatable");
    }
    let _ = write!(out, " on {}", directive.locations.join(" | "));
    out
}

fn deprecated(is_deprecated: bool, reason: Option<&str>) -> String {
    match (is_deprecated, reason) {
        (false, _) => String::new(),
        (true, Some(reason)) if reason != DEFAULT_DEPRECATION => {
            format!(" @deprecated(reason: {})", quote(reason))
        }
        (true, _) => " @deprecated".to_string(),
    }
}

fn description(text: Option<&str>, indent: &str) -> String {
    match text {
        Some(text) if !text.is_empty() => {
            if text.contains('\n') {
                let body: Vec<String> = text.lines().map(|l| format!("{indent}{l}")).collect();
                format!(
                    "{indent}\"\"\"\n{}\n{indent}\"\"\"\n",
                    body.join("\n").replace("\"\"\"", "\\\"\"\"")
                )
            } else {
                format!("{indent}{}\n", quote(text))
            }
        }
        _ => String::new(),
    }
}

fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{text}\""))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::schema::{EnumType, ObjectType, ScalarType, TypeRefKind, UnionType};
    use pretty_assertions::assert_eq;

    fn field(name: &str, ty: TypeRef) -> Field {
        Field {
            name: name.to_string(),
            description: None,
            args: Vec::new(),
            ty,
            is_deprecated: false,
            deprecation_reason: None,
        }
    }

    #[test]
    fn test_render_basic_schema() {
        let mut legacy = field("legacy", TypeRef::named(TypeRefKind::Scalar, "String"));
        legacy.is_deprecated = true;
        legacy.deprecation_reason = Some("use name".to_string());

        let schema = IntrospectionSchema {
            query_type: Some(NamedTypeRef { name: "Query".to_string() }),
            mutation_type: None,
            subscription_type: None,
            types: vec![
                SchemaType::Object(ObjectType {
                    name: "Query".to_string(),
                    description: Some("Root query".to_string()),
                    fields: vec![
                        field(
                            "users",
                            TypeRef::non_null(TypeRef::list(TypeRef::named(
                                TypeRefKind::Object,
                                "User",
                            ))),
                        ),
                        legacy,
                    ],
                    interfaces: Vec::new(),
                }),
                SchemaType::Scalar(ScalarType {
                    name: "String".to_string(),
                    description: None,
                    specified_by_url: None,
                }),
                SchemaType::Enum(EnumType {
                    name: "Role".to_string(),
                    description: None,
                    enum_values: vec![EnumValue {
                        name: "ADMIN".to_string(),
                        description: None,
                        is_deprecated: false,
                        deprecation_reason: None,
                    }],
                }),
                SchemaType::Union(UnionType {
                    name: "Node".to_string(),
                    description: None,
                    possible_types: vec![TypeRef::named(TypeRefKind::Object, "User")],
                }),
            ],
            directives: Vec::new(),
        };

        let expected = "\"Root query\"\ntype Query {\n  users: [User]!\n  legacy: String @deprecated(reason: \"use name\")\n}\n\nenum Role {\n  ADMIN\n}\n\nunion Node = User\n";
        assert_eq!(schema.to_sdl(), expected);
    }

    #[test]
    fn test_custom_root_names_emit_schema_block() {
        let schema = IntrospectionSchema {
            query_type: Some(NamedTypeRef { name: "RootQuery".to_string() }),
            mutation_type: None,
            subscription_type: None,
            types: Vec::new(),
            directives: Vec::new(),
        };
        assert!(schema.to_sdl().starts_with("schema {\n  query: RootQuery\n}"));
    }
}
