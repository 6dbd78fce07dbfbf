//! Telemetry helpers for structured logging.
//!
//! The pool logs through `tracing` with `pool_id`, `worker_id` and `item_id`
//! fields. Lifecycle events are at `info`, per-item events at `debug`.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "ctxpool=info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a default env-based subscriber unless one is already set.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let _ = tracing_subscriber::fmt().with_env_filter(env_filter()).try_init();
}

/// Like [`init_tracing`], but writes through the test harness so output is
/// captured per test. Safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_test_writer()
        .try_init();
}
