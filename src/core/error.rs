//! Error handling for pkg-deps
//!
//! The error system follows two rules:
//! 1. **Strongly-typed errors** ([`BundleError`]) for every failure the bundler
//!    can diagnose itself
//! 2. **User-friendly messages** ([`ErrorContext`]) with details and an
//!    actionable suggestion when the CLI reports a failure
//!
//! Library code returns `anyhow::Result` and attaches context with
//! `.context()`; the typed error stays reachable through the error chain so
//! [`user_friendly_error`](crate::core::user_friendly_error) can find it again.
//!
//! # Examples
//!
//! ```rust,no_run
//! use pkg_deps::core::{BundleError, ErrorContext};
//!
//! let context = ErrorContext::new(BundleError::ToolNotFound {
//!     tool: "mvn".to_string(),
//! })
//! .with_suggestion("Install Apache Maven and make sure `mvn` is on your PATH");
//!
//! context.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for bundling operations.
///
/// Each variant names one failure mode of the CLI, the dispatcher, a handler
/// or the utility layer. Messages are written for end users.
#[derive(Error, Debug)]
pub enum BundleError {
    /// The package type string does not name one of the six handlers
    #[error("Unsupported package type: {given}. Supported types: {supported}")]
    UnsupportedPackageType {
        /// The type string that was requested
        given: String,
        /// Comma separated list of supported types
        supported: String,
    },

    /// Neither a package nor a workspace was given
    #[error("You must specify either --package <name> or --workspace [path]")]
    MissingTarget,

    /// Both a package and a workspace were given
    #[error("You cannot specify both --package and --workspace. Pick one.")]
    ConflictingTarget,

    /// A package name that the handler cannot interpret
    #[error("{reason}")]
    InvalidPackageName {
        /// The rejected name
        name: String,
        /// Why it was rejected
        reason: String,
    },

    /// The repository URL could not be parsed
    #[error("Invalid repository URL: \"{url}\"")]
    InvalidRepositoryUrl {
        /// The rejected URL (credentials masked)
        url: String,
    },

    /// The package manager executable could not be located
    #[error("'{tool}' is not installed or not found in PATH")]
    ToolNotFound {
        /// Executable name or configured path
        tool: String,
    },

    /// A package manager invocation exited unsuccessfully
    #[error("Command failed: {command}")]
    CommandFailed {
        /// The command line with secrets masked
        command: String,
        /// Exit code, `None` when terminated by a signal
        code: Option<i32>,
    },

    /// A package manager invocation exceeded the configured timeout
    #[error("Command timed out after {seconds}s: {command}")]
    CommandTimedOut {
        /// The command line with secrets masked
        command: String,
        /// The timeout that elapsed
        seconds: u64,
    },

    /// The workspace directory does not exist
    #[error("Workspace directory not found: {path}")]
    WorkspaceNotFound {
        /// The workspace path
        path: String,
    },

    /// The workspace lacks the manifest the handler needs
    #[error("No {manifest} found in workspace: {path}")]
    WorkspaceManifestMissing {
        /// The workspace path
        path: String,
        /// The expected manifest file name
        manifest: String,
    },

    /// The handler has no workspace mode
    #[error("Workspace mode is not supported for {package_type} packages")]
    WorkspaceUnsupported {
        /// Package type name
        package_type: String,
    },

    /// An HTTP metadata request failed
    #[error("HTTP {status} from {url}")]
    HttpStatus {
        /// Response status code
        status: u16,
        /// Requested URL (credentials masked)
        url: String,
    },

    /// Repository metadata did not name a usable version
    #[error("Could not find latest version in metadata for {artifact}")]
    VersionNotResolved {
        /// `groupId:artifactId`
        artifact: String,
    },

    /// Global configuration problems
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the problem
        message: String,
    },

    /// Standard I/O errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parsing errors
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Anything else
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
    },
}

impl Clone for BundleError {
    fn clone(&self) -> Self {
        match self {
            Self::UnsupportedPackageType {
                given,
                supported,
            } => Self::UnsupportedPackageType {
                given: given.clone(),
                supported: supported.clone(),
            },
            Self::MissingTarget => Self::MissingTarget,
            Self::ConflictingTarget => Self::ConflictingTarget,
            Self::InvalidPackageName {
                name,
                reason,
            } => Self::InvalidPackageName {
                name: name.clone(),
                reason: reason.clone(),
            },
            Self::InvalidRepositoryUrl {
                url,
            } => Self::InvalidRepositoryUrl {
                url: url.clone(),
            },
            Self::ToolNotFound {
                tool,
            } => Self::ToolNotFound {
                tool: tool.clone(),
            },
            Self::CommandFailed {
                command,
                code,
            } => Self::CommandFailed {
                command: command.clone(),
                code: *code,
            },
            Self::CommandTimedOut {
                command,
                seconds,
            } => Self::CommandTimedOut {
                command: command.clone(),
                seconds: *seconds,
            },
            Self::WorkspaceNotFound {
                path,
            } => Self::WorkspaceNotFound {
                path: path.clone(),
            },
            Self::WorkspaceManifestMissing {
                path,
                manifest,
            } => Self::WorkspaceManifestMissing {
                path: path.clone(),
                manifest: manifest.clone(),
            },
            Self::WorkspaceUnsupported {
                package_type,
            } => Self::WorkspaceUnsupported {
                package_type: package_type.clone(),
            },
            Self::HttpStatus {
                status,
                url,
            } => Self::HttpStatus {
                status: *status,
                url: url.clone(),
            },
            Self::VersionNotResolved {
                artifact,
            } => Self::VersionNotResolved {
                artifact: artifact.clone(),
            },
            Self::ConfigError {
                message,
            } => Self::ConfigError {
                message: message.clone(),
            },
            // io and toml errors are not Clone; keep their message
            Self::IoError(e) => Self::Other {
                message: format!("IO error: {e}"),
            },
            Self::TomlError(e) => Self::Other {
                message: format!("TOML parsing error: {e}"),
            },
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

/// Error wrapper that adds user-facing details and a suggestion.
///
/// Displayed by `main` when a command fails:
/// - error message: red and bold
/// - details: yellow
/// - suggestion: green
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: BundleError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a context with no suggestion or details.
    #[must_use]
    pub const fn new(error: BundleError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error context to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}
