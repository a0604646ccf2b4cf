//! Ecosystem handlers and the lifecycle they share.
//!
//! Every backend implements [`PackageHandler`]. [`run`] drives a handler
//! through the same sequence for all ecosystems:
//!
//! 1. `pre_download` - reset the output directory
//! 2. `execute` - ecosystem-specific fetch through the native package manager
//! 3. `post_download` - normalize the bundle layout
//!
//! and then reports the files that ended up in the bundle. Scratch
//! directories are held by the handler for the duration of `execute` and
//! removed when their guard drops, so cleanup also happens on failure.

pub mod apk;
pub mod docker;
pub mod maven;
pub mod npm;
pub mod nuget;
pub mod pip;
pub mod workspace;

use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::bundler::{BundleRequest, Target};
use crate::core::{BundleError, PackageType};
use crate::utils::fs;
use crate::utils::http::Credentials;
use crate::utils::{Console, Toolchain};

pub use workspace::stage_workspace;

/// Everything a handler needs for one run.
#[derive(Debug, Clone)]
pub struct BundleContext {
    /// Normalized request, with configured defaults already merged
    pub request: BundleRequest,
    /// Absolute bundle directory
    pub output_dir: PathBuf,
    /// Command runner
    pub toolchain: Toolchain,
    /// Status printer
    pub console: Console,
}

impl BundleContext {
    /// Create a context writing to `output_dir`.
    #[must_use]
    pub fn new(request: BundleRequest, output_dir: impl Into<PathBuf>, toolchain: Toolchain) -> Self {
        let console = toolchain.console();
        Self {
            request,
            output_dir: output_dir.into(),
            toolchain,
            console,
        }
    }

    /// Validated target of the request.
    pub fn target(&self) -> Result<Target<'_>, BundleError> {
        self.request.target()
    }

    /// Requested version, if any.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.request.version.as_deref().filter(|v| !v.is_empty())
    }

    /// Repository URL, if any.
    #[must_use]
    pub fn repository(&self) -> Option<&str> {
        self.request.repository.as_deref().filter(|r| !r.is_empty())
    }

    /// Repository username, if any.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.request.username.as_deref().filter(|u| !u.is_empty())
    }

    /// Repository password, if any.
    #[must_use]
    pub fn password(&self) -> Option<&str> {
        self.request.password.as_deref().filter(|p| !p.is_empty())
    }

    /// Username and password, when both are given.
    #[must_use]
    pub fn credentials(&self) -> Option<Credentials<'_>> {
        Credentials::from_parts(self.username(), self.password())
    }

    /// Arguments passed through to the package manager.
    #[must_use]
    pub fn extra_args(&self) -> &[String] {
        &self.request.extra_args
    }

    /// Bundle directory as a string argument.
    #[must_use]
    pub fn output_arg(&self) -> String {
        self.output_dir.display().to_string()
    }

    /// `name@version` or `workspace@version` for status lines.
    #[must_use]
    pub fn display_target(&self) -> String {
        let label = match self.target() {
            Ok(Target::Package(name)) => name,
            _ => "workspace",
        };
        format!("{label}@{}", self.request.version_label())
    }
}

/// One ecosystem backend.
#[async_trait]
pub trait PackageHandler: Send + Sync {
    /// Ecosystem this handler serves.
    fn package_type(&self) -> PackageType;

    /// Whether `--workspace` is accepted.
    fn supports_workspace(&self) -> bool {
        false
    }

    /// Prepare the bundle directory: remove it if present, then create it.
    async fn pre_download(&self, ctx: &BundleContext) -> Result<()> {
        fs::reset_dir(&ctx.output_dir)
    }

    /// Fetch the package or workspace dependencies into the bundle directory.
    async fn execute(&self, ctx: &BundleContext) -> Result<()>;

    /// Normalize the bundle directory after fetching.
    async fn post_download(&self, _ctx: &BundleContext) -> Result<()> {
        Ok(())
    }
}

/// Look up the handler for `package_type`.
#[must_use]
pub fn handler_for(package_type: PackageType) -> Box<dyn PackageHandler> {
    match package_type {
        PackageType::Npm => Box::new(npm::NpmHandler),
        PackageType::Pip => Box::new(pip::PipHandler),
        PackageType::Maven => Box::new(maven::MavenHandler),
        PackageType::Nuget => Box::new(nuget::NugetHandler),
        PackageType::Docker => Box::new(docker::DockerHandler),
        PackageType::Apk => Box::new(apk::ApkHandler),
    }
}

/// Drive `handler` through the lifecycle and return the files in the bundle.
pub async fn run(handler: &dyn PackageHandler, ctx: &BundleContext) -> Result<Vec<PathBuf>> {
    let kind = handler.package_type();
    match run_steps(handler, ctx).await {
        Ok(files) => {
            ctx.console.success(format!("[{kind}] bundle ready in {}", ctx.output_dir.display()));
            Ok(files)
        }
        Err(e) => {
            ctx.console.failure(format!("[{kind}] failed: {e:#}"));
            Err(e)
        }
    }
}

async fn run_steps(handler: &dyn PackageHandler, ctx: &BundleContext) -> Result<Vec<PathBuf>> {
    let kind = handler.package_type();

    // refuse before the output directory is touched
    if matches!(ctx.target()?, Target::Workspace(_)) && !handler.supports_workspace() {
        return Err(BundleError::WorkspaceUnsupported {
            package_type: kind.to_string(),
        }
        .into());
    }

    handler.pre_download(ctx).await?;
    tracing::debug!("Prepared output directory {}", ctx.output_dir.display());

    ctx.console.status(format!("[{kind}] processing {}...", ctx.display_target()));
    handler.execute(ctx).await?;
    handler.post_download(ctx).await?;

    let files = bundle_files(&ctx.output_dir)?;
    if files.is_empty() {
        ctx.console.warn(format!(
            "[{kind}] bundle directory is empty: {}",
            ctx.output_dir.display()
        ));
    } else {
        tracing::debug!("{} file(s) in bundle {}", files.len(), ctx.output_dir.display());
    }
    Ok(files)
}

fn bundle_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if dir.is_dir() {
        fs::list_files(dir)
    } else {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::tempdir;

    struct RecordingHandler {
        workspace: bool,
        fail: bool,
        calls: Mutex<Vec<&'static str>>,
    }

    impl RecordingHandler {
        fn new(workspace: bool, fail: bool) -> Self {
            Self {
                workspace,
                fail,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PackageHandler for RecordingHandler {
        fn package_type(&self) -> PackageType {
            PackageType::Pip
        }

        fn supports_workspace(&self) -> bool {
            self.workspace
        }

        async fn pre_download(&self, ctx: &BundleContext) -> Result<()> {
            self.calls.lock().unwrap().push("pre");
            fs::reset_dir(&ctx.output_dir)
        }

        async fn execute(&self, ctx: &BundleContext) -> Result<()> {
            self.calls.lock().unwrap().push("execute");
            if self.fail {
                anyhow::bail!("download exploded");
            }
            std::fs::write(ctx.output_dir.join("requests-2.32.3-py3-none-any.whl"), "whl")?;
            Ok(())
        }

        async fn post_download(&self, _ctx: &BundleContext) -> Result<()> {
            self.calls.lock().unwrap().push("post");
            Ok(())
        }
    }

    fn quiet_context(request: BundleRequest, out: &Path) -> BundleContext {
        BundleContext::new(request, out, Toolchain::default())
            .with_console(Console::new(true))
    }

    impl BundleContext {
        fn with_console(mut self, console: Console) -> Self {
            self.console = console;
            self
        }
    }

    #[tokio::test]
    async fn test_lifecycle_order_and_report() {
        let temp = tempdir().unwrap();
        let out = temp.path().join("requests-latest-bundle");
        std::fs::create_dir_all(&out).unwrap();
        std::fs::write(out.join("stale.whl"), "old").unwrap();

        let handler = RecordingHandler::new(false, false);
        let ctx = quiet_context(BundleRequest::package(PackageType::Pip, "requests"), &out);

        let files = run(&handler, &ctx).await.unwrap();
        assert_eq!(handler.calls(), vec!["pre", "execute", "post"]);
        assert_eq!(files, vec![out.join("requests-2.32.3-py3-none-any.whl")]);
    }

    #[tokio::test]
    async fn test_failure_skips_post() {
        let temp = tempdir().unwrap();
        let out = temp.path().join("bundle");
        let handler = RecordingHandler::new(false, true);
        let ctx = quiet_context(BundleRequest::package(PackageType::Pip, "requests"), &out);

        let err = run(&handler, &ctx).await.unwrap_err();
        assert_eq!(err.to_string(), "download exploded");
        assert_eq!(handler.calls(), vec!["pre", "execute"]);
    }

    #[tokio::test]
    async fn test_workspace_unsupported_leaves_output_alone() {
        let temp = tempdir().unwrap();
        let out = temp.path().join("bundle");
        std::fs::create_dir_all(&out).unwrap();
        std::fs::write(out.join("keep.tar"), "data").unwrap();

        let handler = RecordingHandler::new(false, false);
        let ctx = quiet_context(BundleRequest::workspace(PackageType::Pip, temp.path()), &out);

        let err = run(&handler, &ctx).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BundleError>(),
            Some(BundleError::WorkspaceUnsupported { .. })
        ));
        assert!(handler.calls().is_empty());
        assert!(out.join("keep.tar").exists());
    }

    #[test]
    fn test_display_target() {
        let ctx = quiet_context(
            BundleRequest::package(PackageType::Npm, "lodash").with_version("4.17.21"),
            Path::new("/tmp/out"),
        );
        assert_eq!(ctx.display_target(), "lodash@4.17.21");

        let ctx = quiet_context(BundleRequest::workspace(PackageType::Npm, "."), Path::new("/tmp/out"));
        assert_eq!(ctx.display_target(), "workspace@latest");
    }

    #[test]
    fn test_handler_for_every_type() {
        for package_type in PackageType::ALL {
            assert_eq!(handler_for(package_type).package_type(), package_type);
        }
        assert!(handler_for(PackageType::Npm).supports_workspace());
        assert!(!handler_for(PackageType::Docker).supports_workspace());
        assert!(!handler_for(PackageType::Apk).supports_workspace());
    }
}
