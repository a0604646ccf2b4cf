//! User-facing status output.
//!
//! Progress lines go to stdout, warnings and failures to stderr. `--quiet`
//! silences everything except warnings and errors. Diagnostic output belongs
//! in `tracing`, not here.

use colored::Colorize;
use std::fmt::Display;

/// Colored status printer shared by the dispatcher and the handlers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Console {
    quiet: bool,
}

impl Console {
    /// Create a console; `quiet` suppresses status, success and command lines.
    #[must_use]
    pub const fn new(quiet: bool) -> Self {
        Self {
            quiet,
        }
    }

    /// Progress message (blue).
    pub fn status(&self, message: impl Display) {
        if !self.quiet {
            println!("{}", message.to_string().blue());
        }
    }

    /// Completion message (green).
    pub fn success(&self, message: impl Display) {
        if !self.quiet {
            println!("{}", message.to_string().green());
        }
    }

    /// Secondary information such as echoed commands (dimmed).
    pub fn note(&self, message: impl Display) {
        if !self.quiet {
            println!("{}", message.to_string().dimmed());
        }
    }

    /// Recoverable problem (yellow, stderr, shown even when quiet).
    pub fn warn(&self, message: impl Display) {
        eprintln!("{}", message.to_string().yellow());
    }

    /// Failure of a handler (red, stderr).
    pub fn failure(&self, message: impl Display) {
        eprintln!("{}", message.to_string().red());
    }
}
