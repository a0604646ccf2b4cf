//! Error formatting utilities for pkg-deps
//!
//! Converts internal errors into clear, actionable messages for users.

use super::error::{BundleError, ErrorContext};
use crate::core::PackageType;

/// Keywords that indicate network-related errors
const NETWORK_ERROR_KEYWORDS: &[&str] = &["network", "connection", "timed out", "dns"];

/// Keywords that indicate permission-related errors
const PERMISSION_ERROR_KEYWORDS: &[&str] = &["permission", "denied", "access"];

/// Convert any error into a user-friendly format with contextual suggestions.
///
/// Walks the error chain looking for a [`BundleError`]; the outermost
/// message is kept as details when the typed error was wrapped with
/// additional context. Falls back to keyword matching on the message.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let mut current_error: &dyn std::error::Error = error.as_ref();
    loop {
        if let Some(bundle_error) = current_error.downcast_ref::<BundleError>() {
            let ctx = create_error_context(bundle_error);
            let outer = error.to_string();
            if outer != bundle_error.to_string() && ctx.details.is_none() {
                return ctx.with_details(outer);
            }
            return ctx;
        }

        match current_error.source() {
            Some(source) => current_error = source,
            None => break,
        }
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        return ErrorContext::new(BundleError::Other {
            message: format!("{error:#}"),
        })
        .with_suggestion(match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                "Check file permissions and try running with appropriate privileges"
            }
            std::io::ErrorKind::NotFound => "Check that the path exists",
            _ => "Check file permissions and disk space",
        });
    }

    let error_msg = format!("{error:#}");
    let lowered = error_msg.to_lowercase();

    if NETWORK_ERROR_KEYWORDS.iter().any(|&keyword| lowered.contains(keyword)) {
        return ErrorContext::new(BundleError::Other {
            message: error_msg,
        })
        .with_suggestion("Check your network connection and the repository URL, then try again");
    }

    if PERMISSION_ERROR_KEYWORDS.iter().any(|&keyword| lowered.contains(keyword)) {
        return ErrorContext::new(BundleError::Other {
            message: error_msg,
        })
        .with_suggestion("Check file permissions and try running with appropriate privileges");
    }

    ErrorContext::new(BundleError::Other {
        message: error_msg,
    })
}

/// Attach the suggestion that matches a specific [`BundleError`].
#[must_use]
pub fn create_error_context(error: &BundleError) -> ErrorContext {
    let ctx = ErrorContext::new(error.clone());
    match error {
        BundleError::UnsupportedPackageType {
            given,
            ..
        } => match PackageType::closest(given) {
            Some(candidate) => ctx.with_suggestion(format!("Did you mean '{candidate}'?")),
            None => ctx,
        },
        BundleError::MissingTarget | BundleError::ConflictingTarget => ctx.with_suggestion(
            "Use --package <name> to bundle one package or --workspace [path] to bundle a project's dependencies",
        ),
        BundleError::InvalidRepositoryUrl {
            ..
        } => ctx.with_suggestion(
            "Pass a full URL including the scheme, e.g. https://repo.example.com/simple",
        ),
        BundleError::ToolNotFound {
            tool,
        } => ctx
            .with_details(format!("pkg-deps drives '{tool}' to resolve and fetch packages"))
            .with_suggestion(format!(
                "Install '{tool}' and make sure it is on your PATH, or point [tools] in the pkg-deps config at it"
            )),
        BundleError::CommandFailed {
            code,
            ..
        } => {
            let ctx = ctx.with_suggestion(
                "Check the package manager output above; verify the package name, version and repository settings",
            );
            match code {
                Some(code) => ctx.with_details(format!("Process exited with status {code}")),
                None => ctx.with_details("Process was terminated by a signal"),
            }
        }
        BundleError::CommandTimedOut {
            ..
        } => ctx.with_suggestion(
            "Raise command_timeout_secs in the pkg-deps config or remove it to disable the timeout",
        ),
        BundleError::WorkspaceNotFound {
            ..
        } => ctx.with_suggestion("Pass an existing directory to --workspace"),
        BundleError::WorkspaceManifestMissing {
            manifest,
            ..
        } => ctx.with_suggestion(format!(
            "Run the command from the directory containing {manifest}, or pass its path to --workspace"
        )),
        BundleError::WorkspaceUnsupported {
            ..
        } => ctx.with_suggestion("Bundle packages one at a time with --package <name>"),
        BundleError::HttpStatus {
            status,
            ..
        } if *status == 401 || *status == 403 => {
            ctx.with_suggestion("Check the repository username and password")
        }
        BundleError::HttpStatus {
            ..
        } => ctx.with_suggestion("Verify the repository URL and that the artifact exists"),
        BundleError::VersionNotResolved {
            ..
        } => ctx.with_suggestion("Pass an explicit version with --version"),
        BundleError::ConfigError {
            ..
        }
        | BundleError::TomlError(_) => {
            ctx.with_suggestion("Fix the configuration file or run 'pkg-deps config init --force'")
        }
        _ => ctx,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_typed_error_found_through_context() {
        let err = anyhow::Error::from(BundleError::ToolNotFound {
            tool: "apk".to_string(),
        })
        .context("Failed to run apk fetch");

        let ctx = user_friendly_error(err);
        assert!(matches!(ctx.error, BundleError::ToolNotFound { .. }));
        assert!(ctx.suggestion.unwrap().contains("Install 'apk'"));
    }

    #[test]
    fn test_outer_context_kept_as_details() {
        let result: anyhow::Result<()> = Err(BundleError::VersionNotResolved {
            artifact: "junit:junit".to_string(),
        }
        .into());
        let err = result.context("Failed to resolve latest version for junit:junit").unwrap_err();

        let ctx = user_friendly_error(err);
        assert_eq!(ctx.details.as_deref(), Some("Failed to resolve latest version for junit:junit"));
    }

    #[test]
    fn test_unsupported_type_suggests_closest() {
        let ctx = create_error_context(&BundleError::UnsupportedPackageType {
            given: "nugt".to_string(),
            supported: String::new(),
        });
        assert_eq!(ctx.suggestion.as_deref(), Some("Did you mean 'nuget'?"));

        let ctx = create_error_context(&BundleError::UnsupportedPackageType {
            given: "cargo".to_string(),
            supported: String::new(),
        });
        assert!(ctx.suggestion.is_none());
    }

    #[test]
    fn test_network_keywords() {
        let ctx = user_friendly_error(anyhow::anyhow!("connection refused by host"));
        assert!(ctx.suggestion.unwrap().contains("network"));
    }

    #[test]
    fn test_fallback_has_message() {
        let ctx = user_friendly_error(anyhow::anyhow!("something odd"));
        assert_eq!(ctx.error.to_string(), "something odd");
        assert!(ctx.suggestion.is_none());
    }
}
