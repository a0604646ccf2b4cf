//! Core types for pkg-deps
//!
//! - [`PackageType`] - the six supported ecosystems
//! - [`BundleError`] - typed failures of the bundler
//! - [`ErrorContext`] / [`user_friendly_error`] - CLI error presentation

pub mod error;
pub mod error_formatting;
pub mod package_type;

pub use error::{BundleError, ErrorContext};
pub use error_formatting::{create_error_context, user_friendly_error};
pub use package_type::PackageType;
