//! Temporary project and configuration for bundling tests.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::config::GlobalConfig;

/// A temporary working directory plus the config file pointing pkg-deps at
/// fake package managers.
pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub project_dir: PathBuf,
    pub tools_dir: PathBuf,
    pub config: GlobalConfig,
}

impl TestEnvironment {
    /// Create a new test environment
    pub fn new() -> Result<Self> {
        // Initialize test logging if RUST_LOG is set
        super::init_test_logging(None);

        let temp_dir = TempDir::new()?;
        let project_dir = temp_dir.path().join("project");
        let tools_dir = temp_dir.path().join("tools");

        fs::create_dir_all(&project_dir)?;
        fs::create_dir_all(&tools_dir)?;

        Ok(Self {
            temp_dir,
            project_dir,
            tools_dir,
            config: GlobalConfig::default(),
        })
    }

    /// Working directory for the command under test
    pub fn project_path(&self) -> &Path {
        &self.project_dir
    }

    /// Location of the config file written by [`write_config`](Self::write_config)
    pub fn config_path(&self) -> PathBuf {
        self.temp_dir.path().join("config.toml")
    }

    /// Default bundle directory for `folder` under the project
    pub fn bundle_path(&self, folder: &str) -> PathBuf {
        self.project_dir.join("bundles").join(folder)
    }

    /// Serialize [`config`](Self::config) to [`config_path`](Self::config_path).
    pub fn write_config(&self) -> Result<PathBuf> {
        let path = self.config_path();
        let content = toml::to_string_pretty(&self.config)?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to write test config {}", path.display()))?;
        Ok(path)
    }

    /// Install a shell script standing in for `tool` and register it in `[tools]`.
    ///
    /// The script appends its arguments, one invocation per line, to
    /// `<tools>/<tool>.log` and then runs `body`.
    #[cfg(unix)]
    pub fn add_fake_tool(&mut self, tool: &str, body: &str) -> Result<PathBuf> {
        use std::os::unix::fs::PermissionsExt;

        let script = self.tools_dir.join(format!("fake-{tool}"));
        let log = self.tool_log_path(tool);
        let content = format!("#!/bin/sh\necho \"$@\" >> '{}'\n{body}\n", log.display());
        fs::write(&script, content)?;
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755))?;

        self.config.tools.insert(tool.to_string(), script.display().to_string());
        Ok(script)
    }

    /// Path of the argument log of a fake tool
    pub fn tool_log_path(&self, tool: &str) -> PathBuf {
        self.tools_dir.join(format!("{tool}.log"))
    }

    /// Recorded invocations of a fake tool, one line each
    pub fn tool_invocations(&self, tool: &str) -> Vec<String> {
        fs::read_to_string(self.tool_log_path(tool))
            .map(|log| log.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Create a file relative to the project directory
    pub fn create_file(&self, path: impl AsRef<Path>, content: &str) -> Result<PathBuf> {
        let full_path = self.project_dir.join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&full_path, content)?;
        Ok(full_path)
    }

    /// Check if a file exists relative to the project directory
    pub fn file_exists(&self, path: impl AsRef<Path>) -> bool {
        self.project_dir.join(path).exists()
    }
}
