//! Build error types and diagnostics.

use std::path::PathBuf;

use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error raised while loading a project or running a build.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("could not find `Anvil.toml` in `{}` or any parent directory", dir.display())]
    ProjectNotFound { dir: PathBuf },

    #[error("failed to parse project file `{}`: {message}", path.display())]
    ProjectParse { path: PathBuf, message: String },

    #[error("project file `{}` is missing required sections: {}", path.display(), missing.join(", "))]
    Structural { path: PathBuf, missing: Vec<String> },

    #[error("no source files available")]
    EmptySourceSet,

    #[error("no object files available to link")]
    NoObjects,

    #[error("source file `{}` does not exist", path.display())]
    MissingSource { path: PathBuf },

    #[error("`{}` depends on `{}`, which no longer exists", source_file.display(), dependency.display())]
    DependencyResolution {
        source_file: PathBuf,
        dependency: PathBuf,
    },

    #[error("sources `{}` and `{}` both compile to `{}`", first.display(), second.display(), object.display())]
    ObjectCollision {
        first: PathBuf,
        second: PathBuf,
        object: PathBuf,
    },

    #[error("no GCC-compatible compiler driver found (tried {})", tried.join(", "))]
    ToolchainNotFound { tried: Vec<String> },

    #[error("`{command}` failed{}", exit_code.map(|c| format!(" with exit code {}", c)).unwrap_or_default())]
    ToolchainInvocation {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("cache I/O error at {}: {source}", path.display())]
    CacheIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl BuildError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string());

        match self {
            BuildError::ProjectNotFound { .. } => diag.with_suggestion(suggestions::NO_PROJECT),
            BuildError::ProjectParse { path, .. } => diag.with_location(path.clone()),
            BuildError::Structural { path, missing } => {
                let mut diag = diag.with_location(path.clone());
                for section in missing {
                    diag = diag.with_context(format!("`{}` is required", section));
                }
                diag.with_suggestion(suggestions::PROJECT_LAYOUT)
            }
            BuildError::EmptySourceSet => diag
                .with_context("the `[sources]` list in Anvil.toml is empty")
                .with_suggestion("add at least one entry to `files` under `[sources]`"),
            BuildError::NoObjects => diag.with_context("compilation produced no object files"),
            BuildError::MissingSource { path } => diag
                .with_location(path.clone())
                .with_suggestion("remove the file from `[sources]` or restore it"),
            BuildError::DependencyResolution { dependency, .. } => diag
                .with_context(format!(
                    "the preprocessor reported `{}` but it is not on disk",
                    dependency.display()
                ))
                .with_suggestion("restore the header or update the `#include` directives"),
            BuildError::ObjectCollision { .. } => diag
                .with_context("object files are named after the source file stem")
                .with_suggestion("rename one of the sources"),
            BuildError::ToolchainNotFound { .. } => diag
                .with_suggestion("install g++ or clang++, or set `CXX`")
                .with_suggestion("set `cxx` under `[toolchain]` in .anvil/config.toml")
                .with_suggestion("use `--toolchain dummy` to check the project without compiling"),
            BuildError::ToolchainInvocation { stderr, .. } => {
                let mut diag = diag;
                for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
                    diag = diag.with_context(line.to_string());
                }
                diag.with_suggestion(suggestions::BUILD_FAILED)
            }
            BuildError::CacheIo { .. } => {
                diag.with_suggestion("check permissions on the `.anvil` directory")
            }
            BuildError::Io { .. } => diag,
        }
    }
}
