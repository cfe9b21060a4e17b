//! Sandboxed pre-request and post-request scripts.
//!
//! Scripts are written in [Rhai](https://rhai.rs) and run on a dedicated
//! thread with a deadline. The only capabilities exposed are `env`, `vars`,
//! `headers`, `log` and, for post scripts, a read-only `response`.

mod api;
mod sandbox;

pub use sandbox::{RhaiSandbox, SandboxLimits};
