//! Docker backend: pull an image and `docker save` it as a tarball.

use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;

use super::{BundleContext, PackageHandler};
use crate::bundler::Target;
use crate::core::{BundleError, PackageType};
use crate::utils::url::strip_scheme;

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^A-Za-z0-9_-]").expect("archive pattern is a valid regex")
});

/// Bundles container images as `docker save` archives.
#[derive(Debug, Default)]
pub struct DockerHandler;

/// What to pull and where to save it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePlan {
    /// Fully qualified image reference passed to `pull` and `save`
    pub image: String,
    /// Registry host to log into, when a repository was given
    pub registry: Option<String>,
    /// Archive file name inside the bundle
    pub archive: String,
}

/// Split `name` into repository and the tag or digest it already carries.
fn split_reference(name: &str) -> (&str, Option<&str>) {
    if let Some((repo, digest)) = name.split_once('@') {
        return (repo, Some(digest));
    }
    let last_segment = name.rfind('/').map_or(0, |i| i + 1);
    match name[last_segment..].rfind(':') {
        Some(i) => (&name[..last_segment + i], Some(&name[last_segment + i + 1..])),
        None => (name, None),
    }
}

/// Work out the image reference and archive name for `name`.
///
/// An explicit `version` becomes the tag. Without one, a tag or digest
/// already in `name` is kept and `latest` is used otherwise. With a
/// `registry`, the image is prefixed by its host unless already qualified.
#[must_use]
pub fn plan_image(name: &str, version: Option<&str>, registry: Option<&str>) -> ImagePlan {
    let (repository, pinned) = split_reference(name);

    let (mut image, repository, tag) = match (version, pinned) {
        (Some(version), _) => (format!("{name}:{version}"), name, version.to_string()),
        (None, Some(pinned)) => {
            let tag = pinned.rsplit(':').next().unwrap_or(pinned);
            (name.to_string(), repository, tag.chars().take(12).collect())
        }
        (None, None) => (format!("{name}:latest"), name, "latest".to_string()),
    };

    let registry = registry.map(strip_scheme).filter(|r| !r.is_empty()).map(str::to_string);
    if let Some(host) = &registry {
        if !image.starts_with(&format!("{host}/")) {
            image = format!("{host}/{image}");
        }
    }

    let archive = format!("{}-{tag}.tar", NON_WORD.replace_all(repository, "-"));
    ImagePlan {
        image,
        registry,
        archive,
    }
}

impl DockerHandler {
    async fn pull_and_save(&self, ctx: &BundleContext, plan: &ImagePlan) -> Result<()> {
        ctx.console.status(format!("Pulling {}...", plan.image));
        ctx.toolchain
            .command(PackageType::Docker.tool())
            .arg("pull")
            .arg(&plan.image)
            .args(ctx.extra_args().iter().cloned())
            .execute_success()
            .await?;

        let archive = ctx.output_dir.join(&plan.archive);
        ctx.console.status(format!("Saving {} to {}...", plan.image, archive.display()));
        ctx.toolchain
            .command(PackageType::Docker.tool())
            .args(["save".to_string(), "-o".to_string(), archive.display().to_string()])
            .arg(&plan.image)
            .execute_success()
            .await
    }
}

#[async_trait]
impl PackageHandler for DockerHandler {
    fn package_type(&self) -> PackageType {
        PackageType::Docker
    }

    async fn execute(&self, ctx: &BundleContext) -> Result<()> {
        let Target::Package(name) = ctx.target()? else {
            return Err(BundleError::WorkspaceUnsupported {
                package_type: PackageType::Docker.to_string(),
            }
            .into());
        };
        let plan = plan_image(name, ctx.version(), ctx.repository());

        let mut logged_in = None;
        if let (Some(host), Some(credentials)) = (plan.registry.as_deref(), ctx.credentials()) {
            ctx.console.status(format!("Logging in to {host}..."));
            ctx.toolchain
                .command(PackageType::Docker.tool())
                .args(["login", host, "-u", credentials.username, "--password-stdin"])
                .stdin(credentials.password)
                .secret(Some(credentials.password))
                .execute_success()
                .await?;
            logged_in = Some(host);
        }

        let result = self.pull_and_save(ctx, &plan).await;

        if let Some(host) = logged_in {
            let logout = ctx
                .toolchain
                .command(PackageType::Docker.tool())
                .args(["logout", host])
                .execute_success()
                .await;
            if let Err(e) = logout {
                ctx.console.warn(format!("Failed to log out from {host}: {e:#}"));
            }
        }

        result
    }
}
