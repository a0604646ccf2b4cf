//! npm backend: install into a scratch directory, then `npm pack` every
//! installed module into the bundle.

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::{Path, PathBuf};

use super::{BundleContext, PackageHandler, stage_workspace};
use crate::bundler::Target;
use crate::core::PackageType;
use crate::utils::fs::{scratch_dir, sorted_entries};

/// Files staged next to `package.json` in workspace mode.
const WORKSPACE_FILES: &[&str] = &["package-lock.json", "npm-shrinkwrap.json", "**/package.json"];

/// Bundles npm packages as `.tgz` tarballs.
#[derive(Debug, Default)]
pub struct NpmHandler;

/// `name@version`, or just `name` for latest.
#[must_use]
pub fn package_spec(name: &str, version: Option<&str>) -> String {
    match version {
        Some(version) => format!("{name}@{version}"),
        None => name.to_string(),
    }
}

/// Arguments for `npm install`; `spec` is `None` in workspace mode.
#[must_use]
pub fn install_args(spec: Option<&str>, extra: &[String]) -> Vec<String> {
    let mut args = vec!["install".to_string()];
    args.extend(spec.map(str::to_string));
    args.extend(["--ignore-scripts".to_string(), "--no-bin-links".to_string()]);
    args.extend(extra.iter().cloned());
    args
}

/// Contents of the scratch `.npmrc` pointing npm at `registry`.
#[must_use]
pub fn npmrc_content(registry: &str, username: Option<&str>, password: Option<&str>) -> String {
    let mut content = format!("registry={registry}\n");
    if let (Some(username), Some(password)) = (username, password) {
        let token = STANDARD.encode(format!("{username}:{password}"));
        content.push_str(&format!("_auth={token}\nalways-auth=true\n"));
    }
    content
}

/// Module directories under `node_modules` to pack, in sorted order.
///
/// Hidden entries such as `.bin` and `.package-lock.json` are skipped, and
/// `@scope` directories contribute each of their children.
pub fn pack_targets(node_modules: &Path) -> Result<Vec<PathBuf>> {
    let mut targets = Vec::new();
    for entry in sorted_entries(node_modules)? {
        let Some(name) = entry.file_name().map(|n| n.to_string_lossy().to_string()) else {
            continue;
        };
        if name.starts_with('.') || !entry.is_dir() {
            continue;
        }
        if name.starts_with('@') {
            targets.extend(sorted_entries(&entry)?.into_iter().filter(|p| p.is_dir()));
        } else {
            targets.push(entry);
        }
    }
    Ok(targets)
}

/// Arguments for `npm pack` of one module.
#[must_use]
pub fn pack_args(module: &Path, output_dir: &Path, extra: &[String]) -> Vec<String> {
    let mut args = vec![
        "pack".to_string(),
        module.display().to_string(),
        "--pack-destination".to_string(),
        output_dir.display().to_string(),
        "--ignore-scripts".to_string(),
    ];
    args.extend(extra.iter().cloned());
    args
}

impl NpmHandler {
    async fn pack_dependencies(&self, ctx: &BundleContext, scratch: &Path) -> Result<usize> {
        let node_modules = scratch.join("node_modules");
        if !node_modules.is_dir() {
            ctx.console.warn(
                "No node_modules found. This might be a single package with no dependencies or an error occurred.",
            );
            return Ok(0);
        }

        ctx.console.status("Packing dependencies...");
        let targets = pack_targets(&node_modules)?;
        for module in &targets {
            tracing::debug!("Packing {}", module.display());
            ctx.toolchain
                .command(PackageType::Npm.tool())
                .args(pack_args(module, &ctx.output_dir, ctx.extra_args()))
                .current_dir(scratch)
                .execute_success()
                .await?;
        }
        Ok(targets.len())
    }
}

#[async_trait]
impl PackageHandler for NpmHandler {
    fn package_type(&self) -> PackageType {
        PackageType::Npm
    }

    fn supports_workspace(&self) -> bool {
        true
    }

    async fn execute(&self, ctx: &BundleContext) -> Result<()> {
        let scratch = scratch_dir("pkg-deps-npm-")?;
        let scratch_path = scratch.path();

        let spec = match ctx.target()? {
            Target::Workspace(workspace) => {
                ctx.console.status("Installing dependencies from workspace to temporary directory...");
                stage_workspace(workspace, "package.json", WORKSPACE_FILES, Some(scratch_path))?;
                None
            }
            Target::Package(name) => {
                let spec = package_spec(name, ctx.version());
                ctx.console.status(format!("Installing {spec} to temporary directory..."));
                Some(spec)
            }
        };

        let mut args = install_args(spec.as_deref(), ctx.extra_args());
        if let Some(registry) = ctx.repository() {
            let npmrc = scratch_path.join(".npmrc");
            let credentials = ctx.credentials();
            let content = npmrc_content(
                registry,
                credentials.map(|c| c.username),
                credentials.map(|c| c.password),
            );
            std::fs::write(&npmrc, content)
                .with_context(|| format!("Failed to write {}", npmrc.display()))?;
            args.push("--userconfig".to_string());
            args.push(npmrc.display().to_string());
        }

        ctx.toolchain
            .command(PackageType::Npm.tool())
            .args(args)
            .current_dir(scratch_path)
            .secret(ctx.password())
            .execute_success()
            .await?;

        let packed = self.pack_dependencies(ctx, scratch_path).await?;
        tracing::debug!("Packed {} module(s)", packed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_package_spec() {
        assert_eq!(package_spec("lodash", Some("4.17.21")), "lodash@4.17.21");
        assert_eq!(package_spec("@angular/core", None), "@angular/core");
    }

    #[test]
    fn test_install_args() {
        let extra = vec!["--legacy-peer-deps".to_string()];
        assert_eq!(
            install_args(Some("express@4.18.2"), &extra),
            vec!["install", "express@4.18.2", "--ignore-scripts", "--no-bin-links", "--legacy-peer-deps"]
        );
        assert_eq!(install_args(None, &[]), vec!["install", "--ignore-scripts", "--no-bin-links"]);
    }

    #[test]
    fn test_npmrc_content() {
        assert_eq!(
            npmrc_content("https://npm.example.com/", None, None),
            "registry=https://npm.example.com/\n"
        );
        assert_eq!(
            npmrc_content("https://npm.example.com/", Some("ci"), Some("secret")),
            "registry=https://npm.example.com/\n_auth=Y2k6c2VjcmV0\nalways-auth=true\n"
        );
    }

    #[test]
    fn test_pack_targets() {
        let temp = tempdir().unwrap();
        let node_modules = temp.path();
        for dir in ["lodash", "@types/node", "@types/express", ".bin", "accepts"] {
            fs::create_dir_all(node_modules.join(dir)).unwrap();
        }
        fs::write(node_modules.join(".package-lock.json"), "{}").unwrap();
        fs::write(node_modules.join("@types/README"), "not a module").unwrap();

        let targets: Vec<String> = pack_targets(node_modules)
            .unwrap()
            .iter()
            .map(|p| p.strip_prefix(node_modules).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(targets, vec!["@types/express", "@types/node", "accepts", "lodash"]);
    }

    #[test]
    fn test_pack_args() {
        let args = pack_args(Path::new("/tmp/x/node_modules/lodash"), Path::new("/out"), &[]);
        assert_eq!(
            args,
            vec![
                "pack",
                "/tmp/x/node_modules/lodash",
                "--pack-destination",
                "/out",
                "--ignore-scripts"
            ]
        );
    }
}
