//! Introspected schema model.
//!
//! Named types form a closed sum type dispatched by their `kind` tag.

mod sdl;
mod types;

pub use types::{
    Directive, EnumType, EnumValue, Field, InputObjectType, InputValue, InterfaceType,
    IntrospectionSchema, NamedTypeRef, ObjectType, ScalarType, SchemaType, TypeRef, TypeRefKind,
    UnionType,
};
