//! Maven backend.
//!
//! A throwaway `pom.xml` declares the requested artifact as its only
//! dependency and `mvn dependency:copy-dependencies` copies the artifact,
//! its runtime closure and their POMs into the bundle. When no version is
//! given, the latest one is read from the repository's `maven-metadata.xml`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tera::{Tera, Value};

use super::{BundleContext, PackageHandler, stage_workspace};
use crate::bundler::Target;
use crate::core::{BundleError, PackageType};
use crate::utils::fs::scratch_dir;
use crate::utils::http::{Credentials, fetch_text};

/// Repository used when none is given.
pub const MAVEN_CENTRAL: &str = "https://repo1.maven.org/maven2";

/// `<id>` shared by the generated mirror and server entries.
const SERVER_ID: &str = "pkg-deps-repo";

const POM_TEMPLATE: &str = include_str!("templates/pom.xml.tera");
const SETTINGS_TEMPLATE: &str = include_str!("templates/settings.xml.tera");

/// Bundles Maven artifacts as JARs plus POMs.
#[derive(Debug, Default)]
pub struct MavenHandler;

/// Parsed `groupId:artifactId[:type[:classifier]]` coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coordinates {
    pub group_id: String,
    pub artifact_id: String,
    /// Dependency `<type>`, e.g. `jar` or `pom`
    pub packaging: Option<String>,
    pub classifier: Option<String>,
}

impl FromStr for Coordinates {
    type Err = BundleError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let invalid = || BundleError::InvalidPackageName {
            name: name.to_string(),
            reason: "Maven package name must be in format groupId:artifactId".to_string(),
        };

        // segments after the classifier carry nothing for the generated pom and are ignored
        let parts: Vec<&str> = name.trim().split(':').collect();
        if parts.len() < 2 || parts[0].is_empty() || parts[1].is_empty() {
            return Err(invalid());
        }

        let optional = |index: usize| {
            parts.get(index).filter(|p| !p.is_empty()).map(|p| (*p).to_string())
        };

        Ok(Self {
            group_id: parts[0].to_string(),
            artifact_id: parts[1].to_string(),
            packaging: optional(2),
            classifier: optional(3),
        })
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)
    }
}

impl Coordinates {
    /// URL of `maven-metadata.xml` for this artifact in `repository`.
    #[must_use]
    pub fn metadata_url(&self, repository: Option<&str>) -> String {
        let base = repository.unwrap_or(MAVEN_CENTRAL).trim_end_matches('/');
        format!(
            "{base}/{}/{}/maven-metadata.xml",
            self.group_id.replace('.', "/"),
            self.artifact_id
        )
    }
}

#[derive(Debug, Deserialize)]
struct Metadata {
    versioning: Option<Versioning>,
}

#[derive(Debug, Deserialize)]
struct Versioning {
    latest: Option<String>,
    release: Option<String>,
}

/// Latest version recorded in a `maven-metadata.xml` document.
///
/// `<latest>` wins over `<release>`; `None` when neither is present.
pub fn latest_from_metadata(xml: &str) -> Result<Option<String>> {
    let metadata: Metadata =
        quick_xml::de::from_str(xml).context("Failed to parse maven-metadata.xml")?;
    let versioning = metadata.versioning;
    let pick = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    Ok(versioning.and_then(|v| pick(v.latest).or_else(|| pick(v.release))))
}

/// Escape text for use in XML content or attribute values.
fn xml_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn xml_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = value.as_str().ok_or_else(|| tera::Error::msg("xml filter expects a string"))?;
    Ok(Value::String(xml_escape(text)))
}

fn templates() -> Result<Tera> {
    let mut tera = Tera::default();
    tera.autoescape_on(vec![]);
    tera.register_filter("xml", xml_filter);
    tera.add_raw_templates(vec![("pom.xml", POM_TEMPLATE), ("settings.xml", SETTINGS_TEMPLATE)])
        .context("Failed to load Maven templates")?;
    Ok(tera)
}

/// `pom.xml` declaring `coordinates` at `version` as the only dependency.
pub fn render_pom(coordinates: &Coordinates, version: &str) -> Result<String> {
    let mut context = tera::Context::new();
    context.insert("group_id", &coordinates.group_id);
    context.insert("artifact_id", &coordinates.artifact_id);
    context.insert("version", version);
    context.insert("packaging", &coordinates.packaging);
    context.insert("classifier", &coordinates.classifier);
    templates()?.render("pom.xml", &context).context("Failed to render pom.xml")
}

/// `settings.xml` mirroring every repository to `repo_url`.
pub fn render_settings(repo_url: &str, credentials: Option<Credentials<'_>>) -> Result<String> {
    let mut context = tera::Context::new();
    context.insert("server_id", SERVER_ID);
    context.insert("repo_url", repo_url);
    context.insert("username", &credentials.map(|c| c.username));
    context.insert("password", &credentials.map(|c| c.password));
    templates()?.render("settings.xml", &context).context("Failed to render settings.xml")
}

/// Arguments for `mvn`.
#[must_use]
pub fn mvn_args(output_dir: &Path, pom: &Path, extra: &[String], settings: Option<&Path>) -> Vec<String> {
    let mut args = vec![
        "dependency:copy-dependencies".to_string(),
        format!("-DoutputDirectory={}", output_dir.display()),
        "-DincludeScope=runtime".to_string(),
        "-Dmdep.copyPom=true".to_string(),
        "-f".to_string(),
        pom.display().to_string(),
    ];
    args.extend(extra.iter().cloned());
    if let Some(settings) = settings {
        args.push("-s".to_string());
        args.push(settings.display().to_string());
    }
    args
}

impl MavenHandler {
    async fn resolve_latest_version(
        &self,
        ctx: &BundleContext,
        coordinates: &Coordinates,
    ) -> Result<String> {
        let url = coordinates.metadata_url(ctx.repository());
        let resolve = async {
            let xml = fetch_text(&url, ctx.credentials()).await?;
            latest_from_metadata(&xml)?.ok_or_else(|| {
                anyhow::Error::from(BundleError::VersionNotResolved {
                    artifact: coordinates.to_string(),
                })
            })
        };

        let version = resolve
            .await
            .with_context(|| format!("Failed to resolve latest version for {coordinates}"))?;
        ctx.console.status(format!("Resolved latest version: {version}"));
        Ok(version)
    }

    /// Write the single-dependency POM into `scratch` and return its path
    /// together with the coordinates it declares.
    async fn generate_pom(
        &self,
        ctx: &BundleContext,
        name: &str,
        scratch: &Path,
    ) -> Result<(PathBuf, String)> {
        let coordinates: Coordinates = name.parse()?;
        let version = match ctx.version() {
            Some(version) => version.to_string(),
            None => self.resolve_latest_version(ctx, &coordinates).await?,
        };

        let pom = scratch.join("pom.xml");
        std::fs::write(&pom, render_pom(&coordinates, &version)?)
            .with_context(|| format!("Failed to write {}", pom.display()))?;
        Ok((pom, format!("{coordinates}:{version}")))
    }
}

#[async_trait]
impl PackageHandler for MavenHandler {
    fn package_type(&self) -> PackageType {
        PackageType::Maven
    }

    fn supports_workspace(&self) -> bool {
        true
    }

    async fn execute(&self, ctx: &BundleContext) -> Result<()> {
        let target = ctx.target()?;
        // a workspace pom is used in place, so scratch space is only needed for settings.xml
        let scratch = match (target, ctx.repository()) {
            (Target::Workspace(_), None) => None,
            _ => Some(scratch_dir("pkg-deps-maven-")?),
        };
        let scratch_path = scratch.as_ref().map(tempfile::TempDir::path);

        let (pom, artifact) = match target {
            Target::Workspace(workspace) => {
                let pom = stage_workspace(workspace, "pom.xml", &[], None)?;
                (pom, "workspace".to_string())
            }
            Target::Package(name) => {
                let dir = scratch_path.context("No scratch directory for the generated pom.xml")?;
                self.generate_pom(ctx, name, dir).await?
            }
        };

        let settings = match (ctx.repository(), scratch_path) {
            (Some(repo), Some(dir)) => {
                let path = dir.join("settings.xml");
                std::fs::write(&path, render_settings(repo, ctx.credentials())?)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                Some(path)
            }
            _ => None,
        };

        ctx.console.status(format!("Downloading {artifact} and its dependencies..."));
        ctx.toolchain
            .command(PackageType::Maven.tool())
            .args(mvn_args(&ctx.output_dir, &pom, ctx.extra_args(), settings.as_deref()))
            .secret(ctx.password())
            .execute_success()
            .await?;

        ctx.console.success(format!(
            "Offline JARs and POMs for {artifact} are in {}",
            ctx.output_dir.display()
        ));
        Ok(())
    }
}
