//! Anvil.toml parsing and the project model.
//!
//! ```toml
//! [project]
//! name = "hello"
//!
//! [sources]
//! files = ["src/main.c"]
//!
//! [headers]
//! files = ["include/util.h"]
//!
//! [compiler]
//! flags = ["-Wall"]
//! defines = ["DEBUG"]
//! include = ["include"]
//!
//! [linker]
//! flags = []
//! libraries = ["m"]
//! include = ["lib"]
//! ```
//!
//! Every section is required, even when empty. Paths are relative to the
//! directory containing the project file.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::builder::cache::CACHE_DIR_NAME;
use crate::builder::error::BuildError;

/// File name of the project description.
pub const PROJECT_FILE: &str = "Anvil.toml";

/// Name used when the project file declares an empty one.
pub const FALLBACK_NAME: &str = "DUMMY";

/// Options passed to every compile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilerOptions {
    pub flags: Vec<String>,
    /// `NAME` or `NAME=VALUE`, passed as `-D`
    pub defines: Vec<String>,
    pub include_dirs: Vec<PathBuf>,
}

/// Options passed to the link step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkerOptions {
    pub flags: Vec<String>,
    /// Library names without the `-l` prefix
    pub libraries: Vec<String>,
    /// Library search directories
    pub include_dirs: Vec<PathBuf>,
}

/// A loaded project. Read-only once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectModel {
    pub name: String,
    /// Directory containing the project file.
    pub root_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub sources: Vec<PathBuf>,
    pub headers: Vec<PathBuf>,
    pub compiler: CompilerOptions,
    pub linker: LinkerOptions,
}

#[derive(Debug, Deserialize)]
struct RawProject {
    project: Option<RawProjectSection>,
    sources: Option<RawFileList>,
    headers: Option<RawFileList>,
    compiler: Option<RawCompiler>,
    linker: Option<RawLinker>,
}

#[derive(Debug, Deserialize)]
struct RawProjectSection {
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawFileList {
    #[serde(default)]
    files: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawCompiler {
    #[serde(default)]
    flags: Vec<String>,
    #[serde(default)]
    defines: Vec<String>,
    #[serde(default)]
    include: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawLinker {
    #[serde(default)]
    flags: Vec<String>,
    #[serde(default)]
    libraries: Vec<String>,
    #[serde(default)]
    include: Vec<String>,
}

impl ProjectModel {
    /// An empty project rooted at `root`.
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        let root_dir = root.into();
        ProjectModel {
            name: name.into(),
            manifest_path: root_dir.join(PROJECT_FILE),
            root_dir,
            sources: Vec::new(),
            headers: Vec::new(),
            compiler: CompilerOptions::default(),
            linker: LinkerOptions::default(),
        }
    }

    /// Load a project file from disk.
    pub fn load(path: &Path) -> Result<Self, BuildError> {
        let content = std::fs::read_to_string(path).map_err(|source| BuildError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(&content, path)
    }

    /// Parse project file content. `path` locates the project root.
    pub fn parse(content: &str, path: &Path) -> Result<Self, BuildError> {
        let raw: RawProject = toml::from_str(content).map_err(|e| BuildError::ProjectParse {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })?;

        let mut missing = Vec::new();
        match &raw.project {
            None => missing.push("[project]".to_string()),
            Some(section) if section.name.is_none() => missing.push("[project].name".to_string()),
            Some(_) => {}
        }
        for (section, present) in [
            ("[sources]", raw.sources.is_some()),
            ("[headers]", raw.headers.is_some()),
            ("[compiler]", raw.compiler.is_some()),
            ("[linker]", raw.linker.is_some()),
        ] {
            if !present {
                missing.push(section.to_string());
            }
        }
        if !missing.is_empty() {
            return Err(BuildError::Structural {
                path: path.to_path_buf(),
                missing,
            });
        }

        let root_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut name = raw
            .project
            .and_then(|p| p.name)
            .unwrap_or_default()
            .trim()
            .to_string();
        if name.is_empty() {
            tracing::warn!(
                "project name in {} is empty, using `{}`",
                path.display(),
                FALLBACK_NAME
            );
            name = FALLBACK_NAME.to_string();
        }

        let sources = to_paths(raw.sources.unwrap_or_default().files);
        if sources.is_empty() {
            tracing::error!("project `{}` declares no source files", name);
        }

        let compiler = raw.compiler.unwrap_or_default();
        let linker = raw.linker.unwrap_or_default();

        Ok(ProjectModel {
            name,
            manifest_path: path.to_path_buf(),
            root_dir,
            sources,
            headers: to_paths(raw.headers.unwrap_or_default().files),
            compiler: CompilerOptions {
                flags: compiler.flags,
                defines: compiler.defines,
                include_dirs: to_paths(compiler.include),
            },
            linker: LinkerOptions {
                flags: linker.flags,
                libraries: linker.libraries,
                include_dirs: to_paths(linker.include),
            },
        })
    }

    /// Per-project cache directory, `<root>/.anvil`.
    pub fn cache_dir(&self) -> PathBuf {
        self.root_dir.join(CACHE_DIR_NAME)
    }
}

fn to_paths(items: Vec<String>) -> Vec<PathBuf> {
    items.into_iter().map(PathBuf::from).collect()
}

/// Find `Anvil.toml` in `start` or any of its ancestors.
pub fn find_project_file(start: &Path) -> Result<PathBuf, BuildError> {
    for dir in start.ancestors() {
        let candidate = dir.join(PROJECT_FILE);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }

    Err(BuildError::ProjectNotFound {
        dir: start.to_path_buf(),
    })
}
