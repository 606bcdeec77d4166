//! Global context for Anvil operations.
//!
//! Provides centralized access to the working directory, configuration
//! locations and project discovery.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::builder::error::BuildError;
use crate::core::project::{find_project_file, PROJECT_FILE};
use crate::util::config::{global_config_path, load_config, project_config_path, Config};

/// Global context containing configuration paths and output preferences.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Global config file (~/.anvil/config.toml), if a home directory exists
    global_config: Option<PathBuf>,

    /// Whether to use verbose output
    verbose: bool,
}

impl GlobalContext {
    /// Create a new GlobalContext for the process working directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        GlobalContext {
            cwd,
            global_config: global_config_path(),
            verbose: false,
        }
    }

    /// Override the global config location. `None` disables it.
    pub fn with_global_config(mut self, path: Option<PathBuf>) -> Self {
        self.global_config = path;
        self
    }

    /// Set verbose mode.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Check if verbose mode is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the global configuration file path.
    pub fn global_config_path(&self) -> Option<&Path> {
        self.global_config.as_deref()
    }

    /// Locate the project file.
    ///
    /// `explicit` may name the project file itself or a directory containing
    /// one; relative paths are resolved against the working directory.
    /// Without it, the working directory and its ancestors are searched.
    pub fn project_file(&self, explicit: Option<&Path>) -> Result<PathBuf, BuildError> {
        match explicit {
            None => find_project_file(&self.cwd),
            Some(path) => {
                let path = self.cwd.join(path);
                let candidate = if path.is_dir() {
                    path.join(PROJECT_FILE)
                } else {
                    path
                };

                if candidate.is_file() {
                    Ok(candidate)
                } else {
                    Err(BuildError::ProjectNotFound {
                        dir: candidate.parent().map(Path::to_path_buf).unwrap_or(candidate),
                    })
                }
            }
        }
    }

    /// Merged global and project configuration for a project root.
    pub fn config_for(&self, project_root: &Path) -> Config {
        load_config(
            self.global_config.as_deref(),
            &project_config_path(project_root),
        )
    }
}
