//! Logging helper
//!
//! Used for all other binaries and tests to implement consistent logging

// Imports
use {
	std::env,
	tracing::level_filters::LevelFilter,
	tracing_subscriber::{EnvFilter, prelude::*},
};

/// Creates the env filter, defaulting to `INFO`
fn filter() -> EnvFilter {
	EnvFilter::builder()
		.with_default_directive(LevelFilter::INFO.into())
		.from_env_lossy()
}

/// Initializes logging
///
/// # Panics
/// Panics if a global subscriber was already set.
pub fn init() {
	// Check if we should use colors
	let log_use_color = env::var("RUST_LOG_COLOR").map_or(true, |value| {
		matches!(value.trim().to_uppercase().as_str(), "1" | "YES" | "TRUE")
	});

	let layer = tracing_subscriber::fmt::layer()
		.with_ansi(log_use_color)
		.with_filter(self::filter());

	tracing_subscriber::registry().with(layer).init();
}

/// Initializes logging for tests.
///
/// Output is captured by the test harness.
/// May be called any number of times, only the first one has an effect.
pub fn init_test() {
	let layer = tracing_subscriber::fmt::layer()
		.with_test_writer()
		.with_filter(self::filter());

	// Note: Every test calls this, so all but the first will fail.
	if tracing_subscriber::registry().with(layer).try_init().is_err() {
		tracing::trace!("Test logger was already initialized");
	}
}
