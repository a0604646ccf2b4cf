//! Alpine backend: `apk fetch -R` straight into the bundle.

use anyhow::Result;
use async_trait::async_trait;

use super::{BundleContext, PackageHandler};
use crate::bundler::Target;
use crate::core::{BundleError, PackageType};
use crate::utils::url::{authenticated_url, has_credentials};

/// Bundles Alpine packages as `.apk` files.
#[derive(Debug, Default)]
pub struct ApkHandler;

/// `name=version`, or just `name` for latest.
#[must_use]
pub fn package_spec(name: &str, version: Option<&str>) -> String {
    match version {
        Some(version) => format!("{name}={version}"),
        None => name.to_string(),
    }
}

impl ApkHandler {
    /// Full `apk` argument list for `ctx`.
    pub fn fetch_args(ctx: &BundleContext) -> Result<Vec<String>> {
        let Target::Package(name) = ctx.target()? else {
            return Err(BundleError::WorkspaceUnsupported {
                package_type: PackageType::Apk.to_string(),
            }
            .into());
        };

        let mut args = vec!["fetch".to_string(), "-o".to_string(), ctx.output_arg(), "-R".to_string()];

        if let Some(repo) = ctx.repository() {
            // anything that does not parse as a URL (a local path) is passed as is
            let url = match ctx.credentials() {
                Some(c) if !has_credentials(repo) => {
                    authenticated_url(repo, Some(c.username), Some(c.password))
                        .map_or_else(|_| repo.to_string(), |auth| auth.url)
                }
                _ => repo.to_string(),
            };
            args.extend(["--repository".to_string(), url]);
        }

        args.push(package_spec(name, ctx.version()));
        args.extend(ctx.extra_args().iter().cloned());
        Ok(args)
    }
}

#[async_trait]
impl PackageHandler for ApkHandler {
    fn package_type(&self) -> PackageType {
        PackageType::Apk
    }

    async fn execute(&self, ctx: &BundleContext) -> Result<()> {
        let args = Self::fetch_args(ctx)?;
        ctx.console.status(format!("Fetching {} with dependencies...", ctx.display_target()));

        ctx.toolchain
            .command(PackageType::Apk.tool())
            .args(args)
            .secret(ctx.password())
            .execute_success()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::BundleRequest;
    use crate::utils::Toolchain;

    fn context(request: BundleRequest) -> BundleContext {
        BundleContext::new(request, "/out/curl-bundle", Toolchain::default())
    }

    #[test]
    fn test_fetch_args() {
        let ctx = context(
            BundleRequest::package(PackageType::Apk, "curl")
                .with_version("8.5.0-r0")
                .with_extra_args(["--allow-untrusted"]),
        );
        assert_eq!(
            ApkHandler::fetch_args(&ctx).unwrap(),
            vec!["fetch", "-o", "/out/curl-bundle", "-R", "curl=8.5.0-r0", "--allow-untrusted"]
        );
    }

    #[test]
    fn test_fetch_args_injects_credentials() {
        let ctx = context(BundleRequest::package(PackageType::Apk, "curl").with_repository(
            "https://apk.example.com/alpine/v3.19/main",
            Some("ci".to_string()),
            Some("pw".to_string()),
        ));
        let args = ApkHandler::fetch_args(&ctx).unwrap();
        assert_eq!(args[4], "--repository");
        assert_eq!(args[5], "https://ci:pw@apk.example.com/alpine/v3.19/main");
    }

    #[test]
    fn test_fetch_args_keeps_existing_credentials() {
        let ctx = context(BundleRequest::package(PackageType::Apk, "curl").with_repository(
            "https://token@apk.example.com/main",
            Some("ci".to_string()),
            Some("pw".to_string()),
        ));
        let args = ApkHandler::fetch_args(&ctx).unwrap();
        assert_eq!(args[5], "https://token@apk.example.com/main");
    }

    #[test]
    fn test_local_repository_path() {
        let ctx = context(
            BundleRequest::package(PackageType::Apk, "curl").with_repository("/srv/apk/main", None, None),
        );
        let args = ApkHandler::fetch_args(&ctx).unwrap();
        assert_eq!(args[5], "/srv/apk/main");
    }

    #[test]
    fn test_local_repository_path_ignores_credentials() {
        let ctx = context(BundleRequest::package(PackageType::Apk, "curl").with_repository(
            "/srv/apk/main",
            Some("ci".to_string()),
            Some("pw".to_string()),
        ));
        let args = ApkHandler::fetch_args(&ctx).unwrap();
        assert_eq!(args[4..6], ["--repository", "/srv/apk/main"]);
    }
}
