//! Staging of workspace manifests into scratch directories.

use anyhow::{Context, Result};
use glob::{MatchOptions, Pattern};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::core::BundleError;
use crate::utils::fs::ensure_dir;

/// Directories never searched for workspace files.
const SKIPPED_DIRS: &[&str] = &["node_modules", ".git"];

/// Locate the `manifest` of `workspace` and optionally copy it into `dest`.
///
/// Without `dest` the manifest is used in place and its path is returned.
/// With `dest`, the manifest and every file whose workspace-relative path
/// matches one of `patterns` are copied into `dest` with their relative
/// layout preserved, and the path of the staged manifest is returned.
///
/// # Errors
///
/// - [`BundleError::WorkspaceNotFound`] if `workspace` is not a directory
/// - [`BundleError::WorkspaceManifestMissing`] if `manifest` is absent
pub fn stage_workspace(
    workspace: &Path,
    manifest: &str,
    patterns: &[&str],
    dest: Option<&Path>,
) -> Result<PathBuf> {
    if !workspace.is_dir() {
        return Err(BundleError::WorkspaceNotFound {
            path: workspace.display().to_string(),
        }
        .into());
    }

    let manifest_path = workspace.join(manifest);
    if !manifest_path.is_file() {
        return Err(BundleError::WorkspaceManifestMissing {
            path: workspace.display().to_string(),
            manifest: manifest.to_string(),
        }
        .into());
    }

    let Some(dest) = dest else {
        return Ok(manifest_path);
    };

    ensure_dir(dest)?;
    let staged_manifest = dest.join(manifest);
    copy_into(&manifest_path, &staged_manifest)?;

    let compiled = patterns
        .iter()
        .map(|p| Pattern::new(p).with_context(|| format!("Invalid workspace pattern: {p}")))
        .collect::<Result<Vec<_>>>()?;
    if compiled.is_empty() {
        return Ok(staged_manifest);
    }

    let options = MatchOptions {
        require_literal_separator: true,
        ..MatchOptions::new()
    };
    let dest_canonical = dest.canonicalize().ok();
    let walker = WalkDir::new(workspace)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| !is_skipped(entry, dest_canonical.as_deref()));

    let mut staged = 0usize;
    for entry in walker {
        let entry = entry.with_context(|| {
            format!("Failed to scan workspace: {}", workspace.display())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(workspace) else {
            continue;
        };
        let relative_str = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if relative_str == manifest {
            continue;
        }

        if compiled.iter().any(|p| p.matches_with(&relative_str, options)) {
            copy_into(entry.path(), &dest.join(relative))?;
            staged += 1;
        }
    }

    tracing::debug!(
        "Staged {} and {} additional file(s) from {} into {}",
        manifest,
        staged,
        workspace.display(),
        dest.display()
    );
    Ok(staged_manifest)
}

fn is_skipped(entry: &DirEntry, dest: Option<&Path>) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    if SKIPPED_DIRS.contains(&name.as_ref()) {
        return true;
    }
    match dest {
        Some(dest) => entry.path().canonicalize().is_ok_and(|p| p == dest),
        None => false,
    }
}

fn copy_into(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        ensure_dir(parent)?;
    }
    fs::copy(from, to).with_context(|| {
        format!("Failed to copy {} to {}", from.display(), to.display())
    })?;
    Ok(())
}
