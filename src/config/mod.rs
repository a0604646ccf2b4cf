//! Configuration management for pkg-deps.
//!
//! Only a global, per-user configuration exists; see [`GlobalConfig`] for
//! its location and format. Command line options always take precedence over
//! values from the file.

mod global;

pub use global::{
    CONFIG_ENV_VAR, DEFAULT_OUTPUT_ROOT, GlobalConfig, RepositoryConfig,
};
