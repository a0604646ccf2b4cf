//! Common helpers for pkg-deps integration tests

// Not every test file uses every helper
#![allow(dead_code)]

use assert_cmd::Command;
use pkg_deps::test_utils::TestEnvironment;

/// `pkg-deps` running in the environment's project directory with its config.
///
/// Credentials and config location inherited from the developer's shell are
/// cleared so they cannot leak into assertions.
pub fn pkg_deps(env: &TestEnvironment) -> Command {
    let mut cmd = Command::cargo_bin("pkg-deps").unwrap();
    cmd.current_dir(env.project_path())
        .env("PKG_DEPS_CONFIG", env.config_path())
        .env_remove("PKG_DEPS_USERNAME")
        .env_remove("PKG_DEPS_PASSWORD")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

/// Names of the files directly inside `dir`, sorted.
pub fn file_names(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap())
        .filter(|entry| entry.file_type().unwrap().is_file())
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}
