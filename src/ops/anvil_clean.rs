//! Implementation of `anvil clean`.

use std::path::PathBuf;

use anyhow::Result;

use crate::builder::cache::BuildCache;
use crate::builder::layout::OutputLayout;
use crate::core::project::ProjectModel;
use crate::util::fs::{is_inside, remove_dir_all_if_exists};

/// Result of a clean.
#[derive(Debug, Default)]
pub struct CleanResult {
    /// Directories that were removed.
    pub removed: Vec<PathBuf>,
    /// Directories left alone because they are outside the project root.
    pub skipped: Vec<PathBuf>,
}

/// Remove build outputs and forget the last successful build.
///
/// Only directories below the project root are deleted.
pub fn clean(project: &ProjectModel, layout: &OutputLayout) -> Result<CleanResult> {
    let mut result = CleanResult::default();

    for dir in [&layout.obj_dir, &layout.bin_dir] {
        if !is_inside(dir, &project.root_dir) {
            tracing::warn!(
                "not removing {}: it is outside the project root",
                dir.display()
            );
            result.skipped.push(dir.clone());
            continue;
        }
        if remove_dir_all_if_exists(dir)? {
            result.removed.push(dir.clone());
        }
    }

    BuildCache::new(project.cache_dir()).forget()?;
    Ok(result)
}
