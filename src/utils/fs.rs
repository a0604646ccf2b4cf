//! File system helpers for preparing and normalizing bundle directories.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Ensures a directory exists, creating it and all parent directories if necessary.
///
/// Fails when the path exists but is not a directory.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    } else if !path.is_dir() {
        return Err(anyhow::anyhow!("Path exists but is not a directory: {}", path.display()));
    }
    Ok(())
}

/// Removes a directory and all its contents; a missing directory is not an error.
pub fn remove_dir_all(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("Failed to remove directory: {}", path.display()))?;
    }
    Ok(())
}

/// Replace whatever is at `path` with a fresh, empty directory.
pub fn reset_dir(path: &Path) -> Result<()> {
    if path.is_file() || path.is_symlink() {
        fs::remove_file(path)
            .with_context(|| format!("Failed to remove file: {}", path.display()))?;
    } else {
        remove_dir_all(path)?;
    }
    ensure_dir(path)
}

/// Create a scratch directory named `<prefix><random>` in the system temp dir.
///
/// The directory and its contents are removed when the returned guard is
/// dropped, whether the handler succeeded or not.
pub fn scratch_dir(prefix: &str) -> Result<tempfile::TempDir> {
    tempfile::Builder::new()
        .prefix(prefix)
        .tempdir()
        .with_context(|| format!("Failed to create temporary directory with prefix {prefix}"))
}

/// Entries directly inside `dir`, sorted by name.
pub fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?;
    entries.sort();
    Ok(entries)
}

/// Regular files directly inside `dir`, sorted by name.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    Ok(sorted_entries(dir)?.into_iter().filter(|p| p.is_file()).collect())
}

/// Move every file below `dir` whose name ends with `suffix` to the top of `dir`.
///
/// Files with the same name overwrite each other; the one found last wins.
/// Returns the number of files moved.
pub fn hoist_files(dir: &Path, suffix: &str) -> Result<usize> {
    let nested: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(2)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.file_name().to_string_lossy().ends_with(suffix))
        .map(walkdir::DirEntry::into_path)
        .collect();

    let mut moved = 0;
    for file in nested {
        let Some(name) = file.file_name() else {
            continue;
        };
        let dest = dir.join(name);
        if dest.exists() {
            fs::remove_file(&dest)
                .with_context(|| format!("Failed to replace file: {}", dest.display()))?;
        }
        move_file(&file, &dest)?;
        moved += 1;
    }
    Ok(moved)
}

/// Remove every directory directly inside `dir`, keeping files.
pub fn remove_subdirs(dir: &Path) -> Result<()> {
    for entry in sorted_entries(dir)? {
        if entry.is_dir() {
            remove_dir_all(&entry)?;
        }
    }
    Ok(())
}

/// Rename, falling back to copy + delete across file systems.
fn move_file(from: &Path, to: &Path) -> Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to).with_context(|| {
        format!("Failed to copy file from {} to {}", from.display(), to.display())
    })?;
    fs::remove_file(from).with_context(|| format!("Failed to remove file: {}", from.display()))
}
