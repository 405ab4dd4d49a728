//! Tracing subscriber installation.
//!
//! Library crates in this workspace only emit `tracing` events. A host
//! binary calls [`init_tracing`] once at startup to route them to stdout.

use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// Installs a global fmt subscriber filtered by `RUST_LOG`, falling back to
/// `default_directive` (e.g. `"info"`) when the variable is unset or invalid.
///
/// Repeated calls are no-ops, and an already installed global subscriber is
/// left in place.
pub fn init_tracing(default_directive: &str) {
    TRACING_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive));
        let fmt_layer = tracing_subscriber::fmt::layer().with_target(true);
        let _ = tracing_subscriber::registry().with(filter).with(fmt_layer).try_init();
    });
}
