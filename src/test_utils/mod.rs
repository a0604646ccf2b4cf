//! Test utilities for pkg-deps
//!
//! Helpers shared by unit tests and the integration tests under `tests/`:
//! - one-time logging setup
//! - a temporary environment with a project directory, a config file and
//!   fake package manager scripts wired in through `[tools]`
//!
//! # Example
//!
//! ```rust,no_run
//! use pkg_deps::test_utils::TestEnvironment;
//!
//! let mut env = TestEnvironment::new().unwrap();
//! env.add_fake_tool("pip", "touch \"$3/requests-2.32.3-py3-none-any.whl\"").unwrap();
//! env.write_config().unwrap();
//! // run `pkg-deps --config <env.config_path()> pip -p requests` in env.project_path()
//! ```

pub mod environment;

pub use environment::TestEnvironment;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` when given, otherwise
/// `RUST_LOG`; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=command=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}
