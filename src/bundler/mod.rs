//! Dispatch of bundling requests to the ecosystem handlers.
//!
//! [`Bundler`] is the entry point used by the CLI. It merges configured
//! repository defaults into a [`BundleRequest`], resolves the bundle
//! directory, picks the handler for the request's package type and runs it
//! through the shared lifecycle.
//!
//! # Examples
//!
//! ```rust,no_run
//! use pkg_deps::bundler::{BundleRequest, Bundler};
//! use pkg_deps::config::GlobalConfig;
//! use pkg_deps::core::PackageType;
//! use pkg_deps::utils::Console;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let bundler = Bundler::new(GlobalConfig::default(), Console::default())?;
//! let request = BundleRequest::package(PackageType::Pip, "requests").with_version("2.32.3");
//! let report = bundler.handle_package(request).await?;
//! println!("{} files in {}", report.files.len(), report.output_dir.display());
//! # Ok(())
//! # }
//! ```

mod request;

pub use request::{BundleRequest, Target, safe_name};

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::config::GlobalConfig;
use crate::core::PackageType;
use crate::handlers::{self, BundleContext};
use crate::utils::url::redact_url;
use crate::utils::{Console, Toolchain};

/// Outcome of a successful bundling run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleReport {
    pub package_type: PackageType,
    /// Absolute bundle directory
    pub output_dir: PathBuf,
    /// Files directly inside the bundle directory, sorted
    pub files: Vec<PathBuf>,
}

/// Routes requests to handlers using the global configuration.
#[derive(Debug, Clone)]
pub struct Bundler {
    config: GlobalConfig,
    console: Console,
    working_dir: PathBuf,
}

impl Bundler {
    /// Create a bundler resolving relative paths against the current directory.
    pub fn new(config: GlobalConfig, console: Console) -> Result<Self> {
        let working_dir = std::env::current_dir().context("Failed to determine current directory")?;
        Ok(Self {
            config,
            console,
            working_dir,
        })
    }

    /// Resolve relative output and workspace paths against `dir` instead.
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    /// Bundle the package or workspace described by `request`.
    pub async fn handle_package(&self, mut request: BundleRequest) -> Result<BundleReport> {
        request.validate()?;
        let package_type = request.package_type;
        let handler = handlers::handler_for(package_type);

        if let Some(workspace) = request.workspace.take() {
            request.workspace = Some(request::absolutize(&workspace, &self.working_dir));
        }

        match request.target()? {
            Target::Workspace(_) => {
                self.console.status(format!("Bundling {package_type} workspace dependencies..."));
            }
            Target::Package(name) => self.console.status(format!(
                "Bundling {package_type} package: {name}@{}...",
                request.version_label()
            )),
        }

        if let Some(defaults) = self.config.repository(package_type) {
            request.apply_defaults(defaults);
        }

        if !request.extra_args.is_empty() {
            self.console.note(format!("Extra arguments: {}", request.extra_args.join(" ")));
        }
        if let Some(repo) = request.repository.as_deref().filter(|r| !r.is_empty()) {
            self.console.note(format!("Using repository: {}", redact_url(repo)));
        }

        let output_dir =
            request.resolve_output_dir(&self.config.output_root_path(), &self.working_dir)?;
        tracing::debug!("Bundle directory for {}: {}", package_type, output_dir.display());

        let toolchain = Toolchain::from_config(&self.config, self.console);
        let ctx = BundleContext::new(request, output_dir, toolchain);
        let files = handlers::run(handler.as_ref(), &ctx).await?;

        match ctx.target()? {
            Target::Workspace(_) => {
                self.console.success(format!("Successfully bundled {package_type} workspace dependencies"));
            }
            Target::Package(name) => self.console.success(format!(
                "Successfully bundled {name}@{}",
                ctx.request.version_label()
            )),
        }

        Ok(BundleReport {
            package_type,
            output_dir: ctx.output_dir,
            files,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RepositoryConfig;
    use crate::core::BundleError;
    use tempfile::tempdir;

    fn quiet_bundler(config: GlobalConfig, dir: &std::path::Path) -> Bundler {
        Bundler::new(config, Console::new(true)).unwrap().with_working_dir(dir)
    }

    #[tokio::test]
    async fn test_missing_target_rejected_before_dispatch() {
        let temp = tempdir().unwrap();
        let bundler = quiet_bundler(GlobalConfig::default(), temp.path());
        let err = bundler.handle_package(BundleRequest::new(PackageType::Npm)).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<BundleError>(), Some(BundleError::MissingTarget)));
    }

    #[tokio::test]
    async fn test_docker_workspace_unsupported() {
        let temp = tempdir().unwrap();
        let bundler = quiet_bundler(GlobalConfig::default(), temp.path());
        let err = bundler
            .handle_package(BundleRequest::workspace(PackageType::Docker, "."))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BundleError>(),
            Some(BundleError::WorkspaceUnsupported { .. })
        ));
        assert!(!temp.path().join("bundles").exists());
    }

    #[tokio::test]
    async fn test_invalid_maven_name_fails_in_handler() {
        let temp = tempdir().unwrap();
        let mut config = GlobalConfig::default();
        config.tools.insert("mvn".to_string(), "/nonexistent/mvn".to_string());
        let bundler = quiet_bundler(config, temp.path());

        let err = bundler
            .handle_package(BundleRequest::package(PackageType::Maven, "junit"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Maven package name must be in format groupId:artifactId");
        // the output directory was prepared before execute failed
        assert!(temp.path().join("bundles/junit-latest-bundle").is_dir());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_configured_repository_reaches_tool() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempdir().unwrap();
        let log = temp.path().join("args.log");
        let script = temp.path().join("fake-pip");
        std::fs::write(
            &script,
            format!("#!/bin/sh\necho \"$@\" > '{}'\n", log.display()),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let mut config = GlobalConfig::default();
        config.tools.insert("pip".to_string(), script.display().to_string());
        config.repositories.insert(
            "pip".to_string(),
            RepositoryConfig {
                url: Some("https://pypi.example.com/simple".to_string()),
                username: None,
                password: None,
            },
        );

        let report = quiet_bundler(config, temp.path())
            .handle_package(BundleRequest::package(PackageType::Pip, "requests"))
            .await
            .unwrap();

        assert_eq!(report.output_dir, temp.path().join("bundles/requests-latest-bundle"));
        assert!(report.files.is_empty());
        let logged = std::fs::read_to_string(&log).unwrap();
        assert!(logged.contains("--index-url https://pypi.example.com/simple"));
        assert!(logged.contains("--trusted-host pypi.example.com"));
    }
}
