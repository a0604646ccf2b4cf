//! Normalized bundling options and bundle directory naming.

use regex::Regex;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use crate::config::RepositoryConfig;
use crate::core::{BundleError, PackageType};

/// Characters allowed in bundle directory names; everything else becomes `-`.
static UNSAFE_NAME_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^A-Za-z0-9_.@-]").expect("name pattern is a valid regex")
});

/// What a request bundles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a> {
    /// A single named package and its transitive dependencies
    Package(&'a str),
    /// The dependencies declared by a project directory
    Workspace(&'a Path),
}

/// Options for one bundling run, independent of how they were collected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleRequest {
    /// Ecosystem to bundle from
    pub package_type: PackageType,
    /// Package name (package mode)
    pub name: Option<String>,
    /// Requested version; `None` means latest
    pub version: Option<String>,
    /// Arguments passed through to the package manager
    pub extra_args: Vec<String>,
    /// Repository or registry URL
    pub repository: Option<String>,
    /// Repository username
    pub username: Option<String>,
    /// Repository password
    pub password: Option<String>,
    /// Explicit output directory
    pub output_dir: Option<PathBuf>,
    /// Workspace directory (workspace mode)
    pub workspace: Option<PathBuf>,
}

impl BundleRequest {
    /// Empty request for `package_type`; set a name or workspace before use.
    #[must_use]
    pub const fn new(package_type: PackageType) -> Self {
        Self {
            package_type,
            name: None,
            version: None,
            extra_args: Vec::new(),
            repository: None,
            username: None,
            password: None,
            output_dir: None,
            workspace: None,
        }
    }

    /// Request bundling `name`.
    #[must_use]
    pub fn package(package_type: PackageType, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new(package_type)
        }
    }

    /// Request bundling the dependencies declared in `workspace`.
    #[must_use]
    pub fn workspace(package_type: PackageType, workspace: impl Into<PathBuf>) -> Self {
        Self {
            workspace: Some(workspace.into()),
            ..Self::new(package_type)
        }
    }

    /// Set the version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set the repository URL and optional credentials.
    #[must_use]
    pub fn with_repository(
        mut self,
        url: impl Into<String>,
        username: Option<String>,
        password: Option<String>,
    ) -> Self {
        self.repository = Some(url.into());
        self.username = username;
        self.password = password;
        self
    }

    /// Set the output directory.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Set the passthrough arguments.
    #[must_use]
    pub fn with_extra_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Check that exactly one of package name and workspace is set.
    pub fn validate(&self) -> Result<(), BundleError> {
        let has_name = self.name.as_deref().is_some_and(|n| !n.trim().is_empty());
        match (has_name, self.workspace.is_some()) {
            (false, false) => Err(BundleError::MissingTarget),
            (true, true) => Err(BundleError::ConflictingTarget),
            _ => Ok(()),
        }
    }

    /// The validated target of this request.
    pub fn target(&self) -> Result<Target<'_>, BundleError> {
        self.validate()?;
        match (&self.name, &self.workspace) {
            (_, Some(workspace)) => Ok(Target::Workspace(workspace)),
            (Some(name), None) => Ok(Target::Package(name.trim())),
            (None, None) => Err(BundleError::MissingTarget),
        }
    }

    /// Requested version, or `"latest"`.
    #[must_use]
    pub fn version_label(&self) -> &str {
        self.version.as_deref().filter(|v| !v.is_empty()).unwrap_or("latest")
    }

    /// Fill repository settings the caller did not set from configured defaults.
    ///
    /// Credentials from the config are only used together with the configured
    /// URL, so an explicit `--repo` never receives another repository's password.
    pub fn apply_defaults(&mut self, defaults: &RepositoryConfig) {
        if self.repository.is_none() {
            self.repository.clone_from(&defaults.url);
            if self.username.is_none() {
                self.username.clone_from(&defaults.username);
            }
            if self.password.is_none() {
                self.password.clone_from(&defaults.password);
            }
        }
    }

    /// Where the bundle is written.
    ///
    /// An explicit output directory is resolved against `cwd`; otherwise the
    /// bundle goes to `<output_root>/<safe-name>-<version>-bundle` for packages
    /// and `<output_root>/<workspace-name>-workspace-bundle` for workspaces.
    pub fn resolve_output_dir(&self, output_root: &Path, cwd: &Path) -> Result<PathBuf, BundleError> {
        if let Some(dir) = &self.output_dir {
            return Ok(absolutize(dir, cwd));
        }

        let folder = match self.target()? {
            Target::Package(name) => {
                format!("{}-{}-bundle", safe_name(name), self.version_label())
            }
            Target::Workspace(workspace) => {
                let absolute = absolutize(workspace, cwd);
                let dir_name = absolute
                    .canonicalize()
                    .unwrap_or(absolute)
                    .file_name()
                    .map(|n| safe_name(&n.to_string_lossy()))
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| "workspace".to_string());
                format!("{dir_name}-workspace-bundle")
            }
        };

        Ok(absolutize(&output_root.join(folder), cwd))
    }
}

/// Directory-safe form of a package name.
///
/// ```rust
/// use pkg_deps::bundler::safe_name;
///
/// assert_eq!(safe_name("junit:junit"), "junit-junit");
/// assert_eq!(safe_name("@types/node"), "@types-node");
/// ```
#[must_use]
pub fn safe_name(name: &str) -> String {
    UNSAFE_NAME_CHARS.replace_all(name, "-").trim_matches('-').to_string()
}

/// `path` resolved against `cwd`, with `.` components dropped.
pub(crate) fn absolutize(path: &Path, cwd: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };
    joined.components().filter(|c| !matches!(c, Component::CurDir)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_safe_name() {
        assert_eq!(safe_name("lodash"), "lodash");
        assert_eq!(safe_name("Newtonsoft.Json"), "Newtonsoft.Json");
        assert_eq!(safe_name("org.slf4j:slf4j-api"), "org.slf4j-slf4j-api");
        assert_eq!(safe_name("@angular/core"), "@angular-core");
        assert_eq!(safe_name("::weird name::"), "weird-name");
        assert_eq!(safe_name("../../etc"), "..-..-etc");
    }

    #[test]
    fn test_validate_targets() {
        let request = BundleRequest::new(PackageType::Npm);
        assert!(matches!(request.validate(), Err(BundleError::MissingTarget)));

        let request = BundleRequest::package(PackageType::Npm, "   ");
        assert!(matches!(request.validate(), Err(BundleError::MissingTarget)));

        let mut request = BundleRequest::package(PackageType::Npm, "lodash");
        request.workspace = Some(PathBuf::from("."));
        assert!(matches!(request.validate(), Err(BundleError::ConflictingTarget)));

        assert!(BundleRequest::workspace(PackageType::Maven, ".").validate().is_ok());
    }

    #[test]
    fn test_default_output_dir_for_package() {
        let cwd = Path::new("/work");
        let request = BundleRequest::package(PackageType::Maven, "junit:junit").with_version("4.13.2");
        assert_eq!(
            request.resolve_output_dir(Path::new("bundles"), cwd).unwrap(),
            PathBuf::from("/work/bundles/junit-junit-4.13.2-bundle")
        );

        let request = BundleRequest::package(PackageType::Apk, "curl");
        assert_eq!(
            request.resolve_output_dir(Path::new("/srv/offline"), cwd).unwrap(),
            PathBuf::from("/srv/offline/curl-latest-bundle")
        );
    }

    #[test]
    fn test_explicit_output_dir_wins() {
        let request = BundleRequest::package(PackageType::Npm, "lodash")
            .with_output_dir("custom-path-npm-bundle");
        assert_eq!(
            request.resolve_output_dir(Path::new("bundles"), Path::new("/work")).unwrap(),
            PathBuf::from("/work/custom-path-npm-bundle")
        );
    }

    #[test]
    fn test_default_output_dir_for_workspace() {
        let temp = tempdir().unwrap();
        let project = temp.path().join("my-app");
        std::fs::create_dir(&project).unwrap();

        let request = BundleRequest::workspace(PackageType::Npm, "my-app");
        let out = request.resolve_output_dir(Path::new("bundles"), temp.path()).unwrap();
        assert_eq!(out, temp.path().join("bundles").join("my-app-workspace-bundle"));
    }

    #[test]
    fn test_apply_defaults() {
        let defaults = RepositoryConfig {
            url: Some("https://nexus.example.com/npm/".to_string()),
            username: Some("ci".to_string()),
            password: Some("pw".to_string()),
        };

        let mut request = BundleRequest::package(PackageType::Npm, "lodash");
        request.apply_defaults(&defaults);
        assert_eq!(request.repository.as_deref(), Some("https://nexus.example.com/npm/"));
        assert_eq!(request.password.as_deref(), Some("pw"));

        let mut request = BundleRequest::package(PackageType::Npm, "lodash").with_repository(
            "https://registry.npmjs.org/",
            None,
            None,
        );
        request.apply_defaults(&defaults);
        assert_eq!(request.repository.as_deref(), Some("https://registry.npmjs.org/"));
        assert!(request.password.is_none());
    }

    #[test]
    fn test_version_label() {
        let request = BundleRequest::package(PackageType::Docker, "alpine");
        assert_eq!(request.version_label(), "latest");
        assert_eq!(request.clone().with_version("3.19").version_label(), "3.19");
        assert_eq!(request.with_version("").version_label(), "latest");
    }
}
