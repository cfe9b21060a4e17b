//! Variable resolution module
//!
//! Provides parsing and resolution of `{{variable}}` syntax in strings.
//!
//! # Usage
//!
//! ```
//! use graphit_application::variable_resolver::VariableResolver;
//! use graphit_domain::Environment;
//!
//! let env = Environment::new("development").with_variable("host", "localhost");
//! let ctx = env.context();
//! let resolver = VariableResolver::new(&ctx);
//!
//! let result = resolver.resolve("http://{{host}}/graphql");
//! assert_eq!(result.resolved, "http://localhost/graphql");
//! ```

pub mod engine;
pub mod parser;

pub use engine::{
    InterpolationValidation, ResolutionResult, VariableResolver, interpolate, interpolate_auth,
    interpolate_headers, stringify, validate_interpolation,
};
pub use parser::{VariableReference, extract_variable_names, has_variables, parse_variables};
