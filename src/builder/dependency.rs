//! Staleness detection against the reference timestamp.
//!
//! A source file is stale when it, or any file in its include closure, was
//! modified strictly after the last successful build. The include closure
//! comes from the active toolchain's preprocessor and is already transitive,
//! so no graph walk happens here.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::builder::error::BuildError;

/// Source of include closures for translation units.
pub trait DependencyQuery {
    /// Return every file `source` includes, directly or transitively.
    ///
    /// Relative paths are interpreted against the analyzer's base directory.
    fn include_closure(&self, source: &Path) -> Result<Vec<PathBuf>, BuildError>;
}

/// Why a source needs recompiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Staleness {
    /// Neither the source nor its includes changed.
    UpToDate,
    /// The source itself is newer than the reference.
    SourceModified,
    /// An included file is newer than the reference.
    DependencyModified(PathBuf),
    /// The unit's object file is gone.
    ObjectMissing(PathBuf),
}

impl Staleness {
    /// Whether the source must be recompiled.
    pub fn is_stale(&self) -> bool {
        !matches!(self, Staleness::UpToDate)
    }
}

/// Decides which sources must be recompiled.
pub struct DependencyAnalyzer<'a, Q: ?Sized> {
    query: &'a Q,
    reference: SystemTime,
    base_dir: PathBuf,
}

impl<'a, Q: DependencyQuery + ?Sized> DependencyAnalyzer<'a, Q> {
    /// Create an analyzer comparing against `reference`.
    pub fn new(query: &'a Q, reference: SystemTime, base_dir: impl Into<PathBuf>) -> Self {
        DependencyAnalyzer {
            query,
            reference,
            base_dir: base_dir.into(),
        }
    }

    /// The ordered subset of `sources` that needs recompiling.
    pub fn stale_sources(&self, sources: &[PathBuf]) -> Result<Vec<PathBuf>, BuildError> {
        let mut stale = Vec::new();

        for source in sources {
            let reason = self.check(source)?;
            log_decision(source, &reason);
            if reason.is_stale() {
                stale.push(source.clone());
            }
        }

        Ok(stale)
    }

    /// Like [`DependencyAnalyzer::stale_sources`], but a source whose object
    /// file does not exist is stale as well.
    ///
    /// `objects` pairs with `sources` by position.
    pub fn stale_units(
        &self,
        sources: &[PathBuf],
        objects: &[PathBuf],
    ) -> Result<Vec<PathBuf>, BuildError> {
        let mut stale = Vec::new();

        for (source, object) in sources.iter().zip(objects) {
            let reason = self.check_unit(source, object)?;
            log_decision(source, &reason);
            if reason.is_stale() {
                stale.push(source.clone());
            }
        }

        Ok(stale)
    }

    /// Check a source together with the object it compiles to.
    pub fn check_unit(&self, source: &Path, object: &Path) -> Result<Staleness, BuildError> {
        if !self.resolve(object).exists() {
            self.source_time(source)?;
            return Ok(Staleness::ObjectMissing(object.to_path_buf()));
        }
        self.check(source)
    }

    /// Check a single source.
    pub fn check(&self, source: &Path) -> Result<Staleness, BuildError> {
        let modified = self.source_time(source)?;

        // One positive signal is enough; skip the preprocessor query.
        if modified > self.reference {
            return Ok(Staleness::SourceModified);
        }

        for dependency in self.query.include_closure(source)? {
            let path = self.resolve(&dependency);
            let modified = match modification_time(&path) {
                Ok(time) => time,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    return Err(BuildError::DependencyResolution {
                        source_file: source.to_path_buf(),
                        dependency: path,
                    });
                }
                Err(e) => return Err(BuildError::Io { path, source: e }),
            };

            if modified > self.reference {
                return Ok(Staleness::DependencyModified(dependency));
            }
        }

        Ok(Staleness::UpToDate)
    }

    fn source_time(&self, source: &Path) -> Result<SystemTime, BuildError> {
        let path = self.resolve(source);
        match modification_time(&path) {
            Ok(time) => Ok(time),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(BuildError::MissingSource { path })
            }
            Err(e) => Err(BuildError::Io { path, source: e }),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.base_dir.join(path)
    }
}

fn log_decision(source: &Path, reason: &Staleness) {
    match reason {
        Staleness::UpToDate => {
            tracing::debug!("{} is up to date", source.display());
        }
        Staleness::SourceModified => {
            tracing::debug!("{} changed since the last build", source.display());
        }
        Staleness::DependencyModified(dep) => {
            tracing::debug!(
                "{} is stale: {} changed since the last build",
                source.display(),
                dep.display()
            );
        }
        Staleness::ObjectMissing(object) => {
            tracing::debug!("{} is stale: {} is missing", source.display(), object.display());
        }
    }
}

fn modification_time(path: &Path) -> std::io::Result<SystemTime> {
    fs::metadata(path)?.modified()
}
