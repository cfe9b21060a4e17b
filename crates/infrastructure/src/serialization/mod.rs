//! Stable JSON serialization for settings and environment files.
//!
//! Output uses 2-space indentation, a trailing newline and the declared
//! field order, so files diff cleanly between saves.

mod json;

pub use json::*;
