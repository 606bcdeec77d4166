//! Compiler driver detection.

use std::path::{Path, PathBuf};

use crate::builder::error::BuildError;
use crate::util::process::find_executable;

/// Drivers searched on `PATH`, in order, when nothing is configured.
pub const DRIVER_CANDIDATES: &[&str] = &["g++", "c++", "clang++"];

/// Resolve the GCC-compatible compiler driver.
///
/// Priority:
/// 1. `configured` (from `[toolchain] cxx` in config)
/// 2. The `CXX` environment variable
/// 3. The first of [`DRIVER_CANDIDATES`] found on `PATH`
///
/// An explicitly configured driver or `CXX` is used verbatim; if it cannot be
/// launched the first compile reports it.
pub fn resolve_gcc_driver(configured: Option<&Path>) -> Result<PathBuf, BuildError> {
    let env_cxx = std::env::var("CXX").ok();
    resolve_driver_from(configured, env_cxx.as_deref(), DRIVER_CANDIDATES)
}

fn resolve_driver_from(
    configured: Option<&Path>,
    env_cxx: Option<&str>,
    candidates: &[&str],
) -> Result<PathBuf, BuildError> {
    if let Some(cxx) = configured {
        tracing::debug!("compiler driver from config: {}", cxx.display());
        return Ok(cxx.to_path_buf());
    }

    if let Some(cxx) = env_cxx.map(str::trim).filter(|s| !s.is_empty()) {
        tracing::debug!("compiler driver from CXX: {}", cxx);
        return Ok(PathBuf::from(cxx));
    }

    for name in candidates {
        if let Some(path) = find_executable(name) {
            return Ok(path);
        }
    }

    Err(BuildError::ToolchainNotFound {
        tried: candidates.iter().map(|s| s.to_string()).collect(),
    })
}
