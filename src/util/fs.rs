//! Filesystem utilities.

use std::fs;
use std::path::{Component, Path};

use anyhow::{Context, Result};

/// Remove a directory and all its contents, if it exists.
///
/// Returns whether anything was removed.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    fs::remove_dir_all(path)
        .with_context(|| format!("failed to remove directory: {}", path.display()))?;
    Ok(true)
}

/// Check if a path lies strictly below another path.
///
/// Paths containing `..` never count as inside.
pub fn is_inside(path: &Path, parent: &Path) -> bool {
    if path.components().any(|c| c == Component::ParentDir) {
        return false;
    }
    path != parent && path.starts_with(parent)
}
