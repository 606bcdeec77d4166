//! Configuration file support for Anvil.
//!
//! Anvil reads two configuration file locations:
//! - Global: `~/.anvil/config.toml` - User-wide defaults
//! - Project: `<root>/.anvil/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config, field by field.
//! Command-line flags take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::builder::cache::CACHE_DIR_NAME;
use crate::builder::toolchain::ToolchainKind;

/// Name of the config file inside a `.anvil` directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Anvil configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build settings
    pub build: BuildConfig,

    /// Compiler driver settings
    pub toolchain: ToolchainSettings,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BuildConfig {
    /// Default toolchain (gcc, dummy)
    pub toolchain: Option<ToolchainKind>,

    /// Number of concurrent compiles
    pub jobs: Option<usize>,

    /// Object directory, relative to the project root
    pub obj_dir: Option<PathBuf>,

    /// Binary directory, relative to the project root
    pub bin_dir: Option<PathBuf>,
}

/// Toolchain settings for C/C++ compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainSettings {
    /// Path to the compiler driver (e.g., /usr/bin/clang++)
    pub cxx: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file is missing or
    /// malformed.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("ignoring config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.build.toolchain.is_some() {
            self.build.toolchain = other.build.toolchain;
        }
        if other.build.jobs.is_some() {
            self.build.jobs = other.build.jobs;
        }
        if other.build.obj_dir.is_some() {
            self.build.obj_dir = other.build.obj_dir;
        }
        if other.build.bin_dir.is_some() {
            self.build.bin_dir = other.build.bin_dir;
        }
        if other.toolchain.cxx.is_some() {
            self.toolchain.cxx = other.toolchain.cxx;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (`<root>/.anvil/config.toml`)
/// 2. Global config (`~/.anvil/config.toml`)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global) = global_path {
        config.merge(Config::load_or_default(global));
    }

    config.merge(Config::load_or_default(project_path));

    config
}

/// Get the global anvil config directory (~/.anvil).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(CACHE_DIR_NAME))
}

/// Get the global config path (~/.anvil/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join(CONFIG_FILE))
}

/// Get the project config path (`<root>/.anvil/config.toml`).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(CACHE_DIR_NAME).join(CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.build.toolchain.is_none());
        assert!(config.build.jobs.is_none());
        assert!(config.toolchain.cxx.is_none());
    }

    #[test]
    fn test_config_load() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");

        std::fs::write(
            &config_path,
            r#"
[build]
toolchain = "dummy"
jobs = 8
obj-dir = "build/obj"

[toolchain]
cxx = "/usr/bin/clang++"
"#,
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.build.toolchain, Some(ToolchainKind::Dummy));
        assert_eq!(config.build.jobs, Some(8));
        assert_eq!(config.build.obj_dir, Some(PathBuf::from("build/obj")));
        assert!(config.build.bin_dir.is_none());
        assert_eq!(config.toolchain.cxx, Some(PathBuf::from("/usr/bin/clang++")));
    }

    #[test]
    fn test_config_merge() {
        let mut base = Config::default();
        base.build.toolchain = Some(ToolchainKind::Gcc);
        base.build.jobs = Some(4);

        let mut override_cfg = Config::default();
        override_cfg.build.toolchain = Some(ToolchainKind::Dummy);

        base.merge(override_cfg);

        assert_eq!(base.build.toolchain, Some(ToolchainKind::Dummy));
        assert_eq!(base.build.jobs, Some(4)); // Not overridden
    }

    #[test]
    fn test_malformed_config_is_ignored() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");
        std::fs::write(&config_path, "[build\njobs = ").unwrap();

        assert!(Config::load(&config_path).is_err());
        assert_eq!(Config::load_or_default(&config_path), Config::default());
    }

    #[test]
    fn test_load_config_precedence() {
        let tmp = TempDir::new().unwrap();
        let global_path = tmp.path().join("global.toml");
        let project_path = tmp.path().join("project.toml");

        std::fs::write(
            &global_path,
            r#"
[build]
jobs = 2
bin-dir = "out"

[toolchain]
cxx = "g++"
"#,
        )
        .unwrap();

        std::fs::write(
            &project_path,
            r#"
[toolchain]
cxx = "clang++"
"#,
        )
        .unwrap();

        let config = load_config(Some(&global_path), &project_path);

        assert_eq!(config.toolchain.cxx, Some(PathBuf::from("clang++")));
        assert_eq!(config.build.jobs, Some(2));
        assert_eq!(config.build.bin_dir, Some(PathBuf::from("out")));
    }

    #[test]
    fn test_project_config_path() {
        assert_eq!(
            project_config_path(Path::new("/proj")),
            PathBuf::from("/proj/.anvil/config.toml")
        );
    }
}
