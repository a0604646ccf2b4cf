//! The closed set of ecosystems pkg-deps can bundle.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strsim::levenshtein;

use super::BundleError;

/// Package ecosystem handled by one of the six handlers.
///
/// Parsing is case-insensitive:
///
/// ```rust
/// use pkg_deps::core::PackageType;
///
/// assert_eq!("NuGet".parse::<PackageType>().unwrap(), PackageType::Nuget);
/// assert!("cargo".parse::<PackageType>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageType {
    /// Node packages via `npm`
    Npm,
    /// Python distributions via `pip`
    Pip,
    /// Java artifacts via `mvn`
    Maven,
    /// .NET packages via `nuget`
    Nuget,
    /// Container images via `docker`
    Docker,
    /// Alpine packages via `apk`
    Apk,
}

impl PackageType {
    /// Every supported type, in CLI order.
    pub const ALL: [Self; 6] =
        [Self::Npm, Self::Pip, Self::Maven, Self::Nuget, Self::Docker, Self::Apk];

    /// Lowercase name used for subcommands, config keys and log prefixes.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Pip => "pip",
            Self::Maven => "maven",
            Self::Nuget => "nuget",
            Self::Docker => "docker",
            Self::Apk => "apk",
        }
    }

    /// The native executable that does the actual work.
    #[must_use]
    pub const fn tool(self) -> &'static str {
        match self {
            Self::Maven => "mvn",
            other => other.as_str(),
        }
    }

    /// Comma separated list of supported type names.
    #[must_use]
    pub fn supported_list() -> String {
        Self::ALL.iter().map(|t| t.as_str()).collect::<Vec<_>>().join(", ")
    }

    /// Closest supported type to a misspelled `name`, within half its length.
    #[must_use]
    pub fn closest(name: &str) -> Option<Self> {
        let lowered = name.to_lowercase();
        Self::ALL
            .into_iter()
            .map(|t| (t, levenshtein(&lowered, t.as_str())))
            .filter(|(_, distance)| *distance <= lowered.len() / 2)
            .min_by_key(|(_, distance)| *distance)
            .map(|(t, _)| t)
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackageType {
    type Err = BundleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        Self::ALL.into_iter().find(|t| t.as_str() == lowered).ok_or_else(|| {
            BundleError::UnsupportedPackageType {
                given: s.to_string(),
                supported: Self::supported_list(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("npm".parse::<PackageType>().unwrap(), PackageType::Npm);
        assert_eq!("PIP".parse::<PackageType>().unwrap(), PackageType::Pip);
        assert_eq!("Maven".parse::<PackageType>().unwrap(), PackageType::Maven);
        assert_eq!("docker".parse::<PackageType>().unwrap(), PackageType::Docker);
    }

    #[test]
    fn test_parse_unknown_lists_supported() {
        let err = "gem".parse::<PackageType>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unsupported package type: gem. Supported types: npm, pip, maven, nuget, docker, apk"
        );
    }

    #[test]
    fn test_closest_suggestion() {
        assert_eq!(PackageType::closest("mavn"), Some(PackageType::Maven));
        assert_eq!(PackageType::closest("Dokcer"), Some(PackageType::Docker));
        assert_eq!(PackageType::closest("rubygems"), None);
    }

    #[test]
    fn test_tool_names() {
        assert_eq!(PackageType::Maven.tool(), "mvn");
        assert_eq!(PackageType::Nuget.tool(), "nuget");
        assert_eq!(PackageType::Apk.tool(), "apk");
    }
}
