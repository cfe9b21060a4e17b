//! HTTP body helpers for the reqwest adapter.

mod body_builder;

pub use body_builder::build_form;
