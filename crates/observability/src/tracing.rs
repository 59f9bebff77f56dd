//! Tracing/logging initialization.
//!
//! Trust decisions log through `tracing`: informational events for expected
//! authentication failures, warnings for authorization overreach and
//! unsupported algorithms. This wires those events to structured JSON
//! output, filterable via `RUST_LOG`.

use tracing_subscriber::EnvFilter;

/// Initialize tracing for the process, honoring `RUST_LOG` and falling back
/// to `info`.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    init_with_default_filter("info");
}

/// Initialize tracing with an explicit fallback filter directive.
pub fn init_with_default_filter(directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
