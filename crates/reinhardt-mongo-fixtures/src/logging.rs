//! Log output for fixture tests.
//!
//! The crate reports through `tracing`; with its `log` feature the events
//! reach whichever `log` backend is installed. [`init_test_logging`] installs
//! `env_logger` in test mode so output is captured per test.

use std::sync::Once;

use env_logger::Env;

static INIT: Once = Once::new();

/// Filter used when `RUST_LOG` is unset: fixture loads and wipes only.
pub const DEFAULT_FILTER: &str = "warn,reinhardt_mongo_fixtures=info";

/// Installs the test logger once per process.
///
/// Honors `RUST_LOG`, falling back to [`DEFAULT_FILTER`]. Calling it again,
/// or after another logger was installed, does nothing.
///
/// # Examples
///
/// ```
/// use reinhardt_mongo_fixtures::logging::init_test_logging;
///
/// init_test_logging();
/// init_test_logging();
/// ```
pub fn init_test_logging() {
	INIT.call_once(|| {
		let _ = env_logger::Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER))
			.is_test(true)
			.try_init();
	});
}
