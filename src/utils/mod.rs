//! Utility layer shared by the handlers.
//!
//! - [`command`] - package manager invocation with masking, timeouts and tool lookup
//! - [`console`] - colored status output honouring `--quiet`
//! - [`fs`] - output directory preparation and flattening
//! - [`http`] - metadata GET requests
//! - [`url`] - repository URL credential injection and redaction

pub mod command;
pub mod console;
pub mod fs;
pub mod http;
pub mod url;

pub use command::{CommandOutput, PackageCommand, Toolchain};
pub use console::Console;
