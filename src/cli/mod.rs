//! Command-line interface for pkg-deps.
//!
//! One subcommand per ecosystem bundles a package (or a workspace's declared
//! dependencies) for offline use, plus `config` for the global settings file.
//!
//! # Available Commands
//!
//! - `npm`, `pip`, `maven`, `nuget`, `docker`, `apk` - bundle a package or workspace
//! - `config` - inspect or create the global configuration
//!
//! # Usage
//!
//! ```bash
//! # Bundle a package and everything it depends on
//! pkg-deps npm -p express -v 4.18.2
//!
//! # Bundle the dependencies of the project in the current directory
//! pkg-deps pip -w
//!
//! # Use a private registry; credentials may also come from the environment
//! PKG_DEPS_PASSWORD=... pkg-deps docker -p team/app -r https://registry.example.com -u ci
//!
//! # Pass extra flags straight to the package manager
//! pkg-deps maven -p junit:junit -- -U -B
//! ```
//!
//! Global flags (`--verbose`, `--quiet`, `--config`) may be given before or
//! after the subcommand.

mod bundle;
mod config;


pub use bundle::BundleCommand;
pub use config::{ConfigCommand, resolve_config_path};

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::core::PackageType;
use crate::utils::Console;

/// Runtime settings derived from the global flags.
///
/// Kept separate from [`Cli`] so tests and `main` can inspect how flags map
/// to logging and output without parsing arguments again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Default `tracing` filter directive; `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Suppress status output.
    pub quiet: bool,

    /// Explicit global config file.
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    /// Console matching the quiet setting.
    #[must_use]
    pub const fn console(&self) -> Console {
        Console::new(self.quiet)
    }
}

/// pkg-deps command line.
#[derive(Parser, Debug)]
#[command(
    name = "pkg-deps",
    about = "Bundle packages and their dependencies for offline use",
    version,
    long_about = "pkg-deps drives npm, pip, Maven, NuGet, Docker and apk to download a package \
                  or a project's dependencies, with everything they need, into a flat local \
                  directory that can be carried to an offline environment."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only print errors and warnings
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the global configuration file (overrides PKG_DEPS_CONFIG)
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Bundle an npm package or workspace as .tgz tarballs
    Npm(BundleCommand),

    /// Bundle a Python package or requirements.txt as wheels and sdists
    Pip(BundleCommand),

    /// Bundle a Maven artifact (groupId:artifactId) or pom.xml as JARs and POMs
    Maven(BundleCommand),

    /// Bundle a NuGet package or packages.config as .nupkg files
    Nuget(BundleCommand),

    /// Bundle a container image as a `docker save` archive
    Docker(BundleCommand),

    /// Bundle an Alpine package as .apk files
    Apk(BundleCommand),

    /// Manage the global configuration file
    Config(ConfigCommand),
}

impl Cli {
    /// Execute the parsed command.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Map the global flags to runtime settings.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        };

        CliConfig {
            log_level: log_level.to_string(),
            quiet: self.quiet,
            config_path: self.config.clone(),
        }
    }

    /// Execute the parsed command with explicit runtime settings.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        let console = config.console();

        let (package_type, command) = match self.command {
            Commands::Config(cmd) => {
                let path = resolve_config_path(config.config_path)?;
                return cmd.execute(&path).await;
            }
            Commands::Npm(cmd) => (PackageType::Npm, cmd),
            Commands::Pip(cmd) => (PackageType::Pip, cmd),
            Commands::Maven(cmd) => (PackageType::Maven, cmd),
            Commands::Nuget(cmd) => (PackageType::Nuget, cmd),
            Commands::Docker(cmd) => (PackageType::Docker, cmd),
            Commands::Apk(cmd) => (PackageType::Apk, cmd),
        };

        command.execute(package_type, config.config_path, console).await
    }
}
