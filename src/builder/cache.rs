//! Reference-timestamp cache for incremental builds.
//!
//! The cache is a single empty marker file, `<cache_dir>/reference`. Its
//! modification time marks the last successful build; every staleness check
//! compares against it. Contents are irrelevant.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::builder::error::BuildError;

/// Name of the per-project cache directory, relative to the project root.
pub const CACHE_DIR_NAME: &str = ".anvil";

/// File name of the reference marker inside the cache directory.
pub const REFERENCE_FILE: &str = "reference";

/// State of the cache at the start of a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// No previous successful build is recorded; compile everything.
    Fresh,
    /// A previous build succeeded at `reference`.
    Existing { reference: SystemTime },
}

/// Handle on a project's reference marker.
#[derive(Debug, Clone)]
pub struct BuildCache {
    dir: PathBuf,
}

impl BuildCache {
    /// Create a handle for the given cache directory. Nothing is touched on disk.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        BuildCache { dir: dir.into() }
    }

    /// The cache directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the reference marker.
    pub fn marker_path(&self) -> PathBuf {
        self.dir.join(REFERENCE_FILE)
    }

    /// Resolve the cache state, creating the cache if it does not exist yet.
    ///
    /// A missing directory or marker yields [`CacheState::Fresh`] and leaves
    /// behind a marker dated at the UNIX epoch, so a first build that fails
    /// still treats every source as stale on the next run.
    pub fn initialize_or_reset(&self) -> Result<CacheState, BuildError> {
        match self.reference()? {
            Some(reference) => {
                tracing::debug!("reference marker found at {}", self.marker_path().display());
                Ok(CacheState::Existing { reference })
            }
            None => {
                tracing::debug!("no reference marker in {}", self.dir.display());
                self.reset()?;
                Ok(CacheState::Fresh)
            }
        }
    }

    /// Read the reference timestamp, if one has been recorded.
    pub fn reference(&self) -> Result<Option<SystemTime>, BuildError> {
        let marker = self.marker_path();
        match fs::metadata(&marker) {
            Ok(meta) => {
                let modified = meta.modified().map_err(|e| self.io_err(&marker, e))?;
                Ok(Some(modified))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_err(&marker, e)),
        }
    }

    /// Rewrite the marker so that nothing counts as built.
    pub fn reset(&self) -> Result<(), BuildError> {
        self.write_marker(UNIX_EPOCH)
    }

    /// Record a successful build: the marker's timestamp becomes "now".
    pub fn commit(&self) -> Result<SystemTime, BuildError> {
        let now = SystemTime::now();
        self.write_marker(now)?;
        tracing::debug!("reference marker committed");
        Ok(now)
    }

    /// Delete the marker, if present.
    pub fn forget(&self) -> Result<(), BuildError> {
        let marker = self.marker_path();
        match fs::remove_file(&marker) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_err(&marker, e)),
        }
    }

    fn write_marker(&self, timestamp: SystemTime) -> Result<(), BuildError> {
        fs::create_dir_all(&self.dir).map_err(|e| self.io_err(&self.dir, e))?;

        let marker = self.marker_path();
        let file = File::create(&marker).map_err(|e| self.io_err(&marker, e))?;
        file.set_modified(timestamp)
            .map_err(|e| self.io_err(&marker, e))?;
        Ok(())
    }

    fn io_err(&self, path: &Path, source: std::io::Error) -> BuildError {
        BuildError::CacheIo {
            path: path.to_path_buf(),
            source,
        }
    }
}
