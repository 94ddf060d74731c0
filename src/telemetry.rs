//! Tracing setup
//!
//! Embedders that already install their own subscriber skip this entirely;
//! `init` is a convenience for binaries and long-running hosts.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize console logging. `RUST_LOG` overrides the configured level.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init(log_level: &str) {
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(format!("info,catalog_core={}", log_level)));

	let _ = tracing_subscriber::registry()
		.with(filter)
		.with(fmt::layer())
		.try_init();
}
