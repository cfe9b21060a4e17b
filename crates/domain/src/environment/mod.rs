//! Environment and interpolation context types

mod context;
mod variable;

pub use context::InterpolationContext;
pub use variable::{Environment, Variable};
