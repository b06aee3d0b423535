//! Tracing initialisation for binaries and tests.
//!
//! The library itself only emits events; installing a subscriber is
//! the embedding application's call.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Whether tracing has been initialized
static TRACING_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Install the default tracing subscriber.
///
/// Filtering follows `RUST_LOG`, defaulting to warnings globally and
/// info for this crate. Safe to call more than once; later calls and
/// calls made while another subscriber is installed are ignored.
pub fn init_default() {
    if TRACING_INITIALIZED
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::Relaxed)
        .is_ok()
    {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("warn,o3d_export=info"));

        let _ = tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .try_init();
    }
}
