//! Manage the global pkg-deps configuration file.
//!
//! ```bash
//! pkg-deps config path            # where the config is read from
//! pkg-deps config show            # effective settings, passwords masked
//! pkg-deps config init [--force]  # write an example file
//! ```
//!
//! The file lives at `~/.pkg-deps/config.toml` unless `--config` or
//! `PKG_DEPS_CONFIG` points elsewhere. It holds secrets, so it is written
//! with owner-only permissions on Unix and never printed unmasked.

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::config::GlobalConfig;

/// `pkg-deps config`
#[derive(Args, Debug)]
pub struct ConfigCommand {
    /// Configuration operation (defaults to `show`)
    #[command(subcommand)]
    command: Option<ConfigSubcommands>,
}

#[derive(Subcommand, Debug)]
enum ConfigSubcommands {
    /// Print the path of the configuration file
    Path,

    /// Show the effective configuration with passwords masked
    Show,

    /// Write an example configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
}

impl ConfigCommand {
    /// Run the subcommand against the config file at `config_path`.
    pub async fn execute(self, config_path: &Path) -> Result<()> {
        match self.command {
            Some(ConfigSubcommands::Path) => {
                println!("{}", config_path.display());
                Ok(())
            }
            Some(ConfigSubcommands::Show) | None => Self::show(config_path).await,
            Some(ConfigSubcommands::Init {
                force,
            }) => Self::init(config_path, force).await.map(|_| ()),
        }
    }

    async fn show(config_path: &Path) -> Result<()> {
        let config = GlobalConfig::load_with_optional(Some(config_path.to_path_buf())).await?;

        println!("{}", "Global Configuration".bold());
        println!("Location: {}", config_path.display());
        if !config_path.exists() {
            println!("{}", "(file not found, showing defaults)".dimmed());
        }
        println!();
        print!("{}", toml::to_string_pretty(&config.redacted())?);

        if config.repositories.is_empty() {
            println!("\n{}", "Tip:".yellow());
            println!("  Run 'pkg-deps config init' to create an example configuration");
        }
        Ok(())
    }

    /// Write the example config; returns `false` if a file exists and `force` is off.
    async fn init(config_path: &Path, force: bool) -> Result<bool> {
        if config_path.exists() && !force {
            eprintln!(
                "{}",
                format!("Global config already exists at: {}", config_path.display()).yellow()
            );
            eprintln!("   Use --force to overwrite");
            return Ok(false);
        }

        let config = GlobalConfig::init_example();
        config.save_to(config_path).await?;

        println!("{}", format!("Created global config at: {}", config_path.display()).green());
        println!("\n{}", "Example configuration:".bold());
        print!("{}", toml::to_string_pretty(&config)?);
        println!("\n{}", "Next steps:".yellow());
        println!("  1. Point [repositories.<type>] at your internal mirrors");
        println!("  2. Add [tools] entries if a package manager is not on PATH");
        Ok(true)
    }
}

/// Config file location for `--config`, falling back to the environment and default.
pub fn resolve_config_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => GlobalConfig::resolve_path(),
    }
}
