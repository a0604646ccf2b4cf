//! Options shared by the six bundling subcommands.
//!
//! ```bash
//! pkg-deps npm -p express -v 4.18.2
//! pkg-deps pip -p requests -r https://pypi.internal/simple -u ci -P "$TOKEN"
//! pkg-deps maven -p org.slf4j:slf4j-api -- -U
//! pkg-deps npm -w ./my-app
//! ```

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use crate::bundler::{BundleRequest, Bundler};
use crate::config::GlobalConfig;
use crate::core::{BundleError, PackageType};
use crate::utils::Console;

/// Arguments of `pkg-deps <type>`.
#[derive(Args, Debug, Clone, Default)]
pub struct BundleCommand {
    /// Package name
    #[arg(short = 'p', long = "package", value_name = "NAME")]
    pub package: Option<String>,

    /// Bundle the dependencies declared in a workspace (defaults to the current directory)
    #[arg(
        short = 'w',
        long,
        value_name = "PATH",
        num_args = 0..=1,
        default_missing_value = "."
    )]
    pub workspace: Option<PathBuf>,

    /// Package version (latest when omitted)
    #[arg(short = 'v', long = "version", value_name = "VERSION")]
    pub pkg_version: Option<String>,

    /// Output directory
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Repository or registry URL
    #[arg(short, long = "repo", value_name = "URL")]
    pub repo: Option<String>,

    /// Repository username
    #[arg(short, long, value_name = "USER", env = "PKG_DEPS_USERNAME")]
    pub username: Option<String>,

    /// Repository password
    #[arg(short = 'P', long, value_name = "PASS", env = "PKG_DEPS_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Extra arguments for the package manager (put them after `--`)
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

impl BundleCommand {
    /// Turn the parsed options into a validated request for `package_type`.
    pub fn into_request(self, package_type: PackageType) -> Result<BundleRequest, BundleError> {
        let request = BundleRequest {
            package_type,
            name: self.package,
            version: self.pkg_version,
            extra_args: self.args,
            repository: self.repo,
            username: self.username,
            password: self.password,
            output_dir: self.output,
            workspace: self.workspace,
        };
        request.validate()?;
        Ok(request)
    }

    /// Bundle according to these options.
    ///
    /// The options are validated before the global config at `config_path`
    /// is loaded.
    pub async fn execute(
        self,
        package_type: PackageType,
        config_path: Option<PathBuf>,
        console: Console,
    ) -> Result<()> {
        let request = self.into_request(package_type)?;
        let config = GlobalConfig::load_with_optional(config_path).await?;
        let bundler = Bundler::new(config, console)?;
        let report = bundler.handle_package(request).await?;
        tracing::debug!(
            "{} bundle at {} holds {} file(s)",
            report.package_type,
            report.output_dir.display(),
            report.files.len()
        );
        Ok(())
    }
}
