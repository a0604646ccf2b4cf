//! NuGet backend: `nuget install` into the bundle, then flatten the
//! per-package folders so only `.nupkg` files remain.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::{BundleContext, PackageHandler, stage_workspace};
use crate::bundler::Target;
use crate::core::PackageType;
use crate::utils::fs::{hoist_files, remove_subdirs, scratch_dir};

const EMPTY_NUGET_CONFIG: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<configuration>
  <packageSources />
</configuration>
"#;

/// Bundles NuGet packages as `.nupkg` files.
#[derive(Debug, Default)]
pub struct NugetHandler;

/// A package source registered in a scratch `NuGet.Config`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporarySource {
    pub name: String,
    pub config_file: PathBuf,
}

impl TemporarySource {
    /// Fresh uniquely named source whose config lives in `dir`.
    #[must_use]
    pub fn new(dir: &Path) -> Self {
        Self {
            name: format!("pkg-deps-{}", uuid::Uuid::new_v4()),
            config_file: dir.join("NuGet.Config"),
        }
    }
}

/// Arguments for `nuget sources Add`.
#[must_use]
pub fn add_source_args(
    source: &TemporarySource,
    url: &str,
    username: Option<&str>,
    password: Option<&str>,
) -> Vec<String> {
    let mut args = vec![
        "sources".to_string(),
        "Add".to_string(),
        "-Name".to_string(),
        source.name.clone(),
        "-Source".to_string(),
        url.to_string(),
        "-ConfigFile".to_string(),
        source.config_file.display().to_string(),
    ];
    if let (Some(username), Some(password)) = (username, password) {
        args.extend([
            "-Username".to_string(),
            username.to_string(),
            "-Password".to_string(),
            password.to_string(),
            "-StorePasswordInClearText".to_string(),
        ]);
    }
    args
}

/// Arguments for `nuget install`; `target` is a package id or a `packages.config` path.
#[must_use]
pub fn install_args(
    target: &str,
    output_dir: &Path,
    version: Option<&str>,
    source: Option<&TemporarySource>,
    extra: &[String],
) -> Vec<String> {
    let mut args = vec![
        "install".to_string(),
        target.to_string(),
        "-OutputDirectory".to_string(),
        output_dir.display().to_string(),
        "-DependencyVersion".to_string(),
        "Highest".to_string(),
    ];
    if let Some(version) = version {
        args.extend(["-Version".to_string(), version.to_string()]);
    }
    if let Some(source) = source {
        args.extend([
            "-Source".to_string(),
            source.name.clone(),
            "-ConfigFile".to_string(),
            source.config_file.display().to_string(),
        ]);
    }
    args.extend(extra.iter().cloned());
    args
}

impl NugetHandler {
    /// Register `url` in a scratch config; `None` if nuget refuses it.
    async fn add_source(
        &self,
        ctx: &BundleContext,
        url: &str,
        dir: &Path,
    ) -> Result<Option<TemporarySource>> {
        let source = TemporarySource::new(dir);
        std::fs::write(&source.config_file, EMPTY_NUGET_CONFIG)
            .with_context(|| format!("Failed to write {}", source.config_file.display()))?;

        let credentials = ctx.credentials();
        let args = add_source_args(
            &source,
            url,
            credentials.map(|c| c.username),
            credentials.map(|c| c.password),
        );

        match ctx
            .toolchain
            .command(PackageType::Nuget.tool())
            .args(args)
            .secret(ctx.password())
            .execute_success()
            .await
        {
            Ok(()) => Ok(Some(source)),
            Err(e) => {
                ctx.console.warn(format!("Failed to add temporary source: {e:#}"));
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl PackageHandler for NugetHandler {
    fn package_type(&self) -> PackageType {
        PackageType::Nuget
    }

    fn supports_workspace(&self) -> bool {
        true
    }

    async fn execute(&self, ctx: &BundleContext) -> Result<()> {
        let install_target = match ctx.target()? {
            Target::Package(name) => name.to_string(),
            Target::Workspace(workspace) => {
                stage_workspace(workspace, "packages.config", &[], None)?.display().to_string()
            }
        };

        // the guard keeps the scratch NuGet.Config alive until install finishes
        let scratch = match ctx.repository() {
            Some(_) => Some(scratch_dir("pkg-deps-nuget-")?),
            None => None,
        };
        let source = match (ctx.repository(), scratch.as_ref()) {
            (Some(url), Some(dir)) => self.add_source(ctx, url, dir.path()).await?,
            _ => None,
        };

        ctx.console.status(format!("Installing {}...", ctx.display_target()));
        ctx.toolchain
            .command(PackageType::Nuget.tool())
            .args(install_args(
                &install_target,
                &ctx.output_dir,
                ctx.version(),
                source.as_ref(),
                ctx.extra_args(),
            ))
            .execute_success()
            .await
    }

    async fn post_download(&self, ctx: &BundleContext) -> Result<()> {
        ctx.console.status("Flattening package structure...");
        let moved = hoist_files(&ctx.output_dir, ".nupkg")?;
        remove_subdirs(&ctx.output_dir)?;
        tracing::debug!("Moved {} .nupkg file(s) to {}", moved, ctx.output_dir.display());
        Ok(())
    }
}
