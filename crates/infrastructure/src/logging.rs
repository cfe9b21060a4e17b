//! Tracing subscriber setup.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global subscriber: `RUST_LOG` filter (default `info`) and a
/// formatting layer on stderr.
///
/// Calling it twice is harmless; the second call is ignored.
pub fn init() {
    init_with_default("info");
}

/// Same as [`init`] with a custom fallback filter.
pub fn init_with_default(default_filter: &str) {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
