//! Implementation of `anvil build`.
//!
//! The orchestrator walks a fixed sequence of stages:
//!
//! ```text
//! Idle -> ProjectLoaded -> CacheResolved(Clean | Incremental) -> Compiled -> Linked -> CacheCommitted
//! ```
//!
//! Any failure stops the pipeline where it is. Objects already produced are
//! kept, and the reference timestamp is only rewritten once everything else
//! succeeded.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crate::builder::cache::{BuildCache, CacheState};
use crate::builder::error::BuildError;
use crate::builder::events::{BuildEvent, EventLog, EventSink};
use crate::builder::layout::OutputLayout;
use crate::builder::toolchain::{
    BuildMode, CommandRunner, SystemRunner, ToolchainKind, ToolchainSetup, ToolchainStrategy,
};
use crate::core::project::ProjectModel;
use crate::util::config::Config;

/// Options for the build command.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Toolchain to drive
    pub toolchain: ToolchainKind,

    /// Ignore the cache and rebuild everything
    pub force_clean: bool,

    /// Number of concurrent compiles
    pub jobs: usize,

    /// Explicit compiler driver
    pub cxx: Option<PathBuf>,

    /// Object directory override, relative to the project root
    pub obj_dir: Option<PathBuf>,

    /// Binary directory override, relative to the project root
    pub bin_dir: Option<PathBuf>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            toolchain: ToolchainKind::default(),
            force_clean: false,
            jobs: 1,
            cxx: None,
            obj_dir: None,
            bin_dir: None,
        }
    }
}

impl BuildOptions {
    /// Options taken from configuration. Command-line flags are applied on top.
    pub fn from_config(config: &Config) -> Self {
        BuildOptions {
            toolchain: config.build.toolchain.unwrap_or_default(),
            force_clean: false,
            jobs: config.build.jobs.unwrap_or(1).max(1),
            cxx: config.toolchain.cxx.clone(),
            obj_dir: config.build.obj_dir.clone(),
            bin_dir: config.build.bin_dir.clone(),
        }
    }

    /// Output directories for a project rooted at `root`.
    pub fn layout(&self, root: &Path) -> OutputLayout {
        OutputLayout::new(root).with_overrides(root, self.obj_dir.as_deref(), self.bin_dir.as_deref())
    }
}

/// Whether a build recompiles everything or only what changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildKind {
    Clean,
    Incremental,
}

/// Progress of one build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStage {
    Idle,
    ProjectLoaded,
    CacheResolved(BuildKind),
    Compiled,
    Linked,
    CacheCommitted,
}

/// Outcome of a successful build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub kind: BuildKind,
    /// Sources that were recompiled, in declaration order.
    pub compiled: Vec<PathBuf>,
    /// Every object file, one per source.
    pub objects: Vec<PathBuf>,
    /// The executable.
    pub output: PathBuf,
    /// Whether the link step ran.
    pub linked: bool,
    /// The recorded reference timestamp.
    pub reference: SystemTime,
    pub events: Vec<BuildEvent>,
    pub duration: Duration,
}

impl BuildReport {
    /// Nothing was compiled and nothing was linked.
    pub fn is_up_to_date(&self) -> bool {
        self.compiled.is_empty() && !self.linked
    }
}

/// Drives one build of one project.
pub struct BuildOrchestrator<'a> {
    project: &'a ProjectModel,
    options: BuildOptions,
    runner: Arc<dyn CommandRunner>,
    stage: BuildStage,
    failed_at: Option<BuildStage>,
}

struct Completed {
    kind: BuildKind,
    compiled: Vec<PathBuf>,
    objects: Vec<PathBuf>,
    output: PathBuf,
    linked: bool,
    reference: SystemTime,
}

impl<'a> BuildOrchestrator<'a> {
    pub fn new(project: &'a ProjectModel, options: BuildOptions) -> Self {
        BuildOrchestrator {
            project,
            options,
            runner: Arc::new(SystemRunner),
            stage: BuildStage::Idle,
            failed_at: None,
        }
    }

    /// Use a different process runner for toolchain commands.
    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// The last stage reached.
    pub fn stage(&self) -> BuildStage {
        self.stage
    }

    /// The stage the last failed run stopped at.
    pub fn failed_at(&self) -> Option<BuildStage> {
        self.failed_at
    }

    /// Run the whole pipeline.
    pub fn run(&mut self, sink: &dyn EventSink) -> Result<BuildReport, BuildError> {
        let start = Instant::now();
        let log = EventLog::new(sink);
        self.stage = BuildStage::Idle;
        self.failed_at = None;

        let result = self.run_stages(&log);
        let duration = start.elapsed();
        let duration_ms = duration.as_millis() as u64;

        match result {
            Ok(done) => {
                log.emit(BuildEvent::finished(true, done.compiled.len(), duration_ms));
                tracing::debug!(
                    "build of `{}` finished in {:.2}s",
                    self.project.name,
                    duration.as_secs_f64()
                );
                Ok(BuildReport {
                    kind: done.kind,
                    compiled: done.compiled,
                    objects: done.objects,
                    output: done.output,
                    linked: done.linked,
                    reference: done.reference,
                    events: log.take(),
                    duration,
                })
            }
            Err(e) => {
                self.failed_at = Some(self.stage);
                tracing::debug!("build failed after stage {:?}: {}", self.stage, e);
                log.emit(BuildEvent::finished(false, 0, duration_ms));
                Err(e)
            }
        }
    }

    fn run_stages(&mut self, sink: &dyn EventSink) -> Result<Completed, BuildError> {
        let project = self.project;

        let setup = ToolchainSetup {
            layout: self.options.layout(&project.root_dir),
            cxx: self.options.cxx.clone(),
            runner: Arc::clone(&self.runner),
            jobs: self.options.jobs.max(1),
        };
        let toolchain = self.options.toolchain.instantiate(project, setup)?;

        sink.emit(BuildEvent::ProjectLoaded {
            name: project.name.clone(),
            sources: project.sources.len(),
            headers: project.headers.len(),
            toolchain: toolchain.kind().to_string(),
        });
        self.stage = BuildStage::ProjectLoaded;

        // Object naming is checked before any cache or toolchain work
        toolchain.object_paths()?;

        let cache = BuildCache::new(project.cache_dir());
        let mode = self.resolve_mode(&cache)?;
        let kind = match mode {
            BuildMode::Clean => BuildKind::Clean,
            BuildMode::Incremental { .. } => BuildKind::Incremental,
        };
        sink.emit(BuildEvent::CacheResolved {
            mode: mode.as_str().to_string(),
        });
        self.stage = BuildStage::CacheResolved(kind);

        toolchain.setup_state()?;
        let outcome = toolchain.compile(mode, sink)?;
        self.stage = BuildStage::Compiled;

        let (output, linked) = self.link(toolchain.as_ref(), kind, &outcome.compiled, &outcome.objects, sink)?;
        self.stage = BuildStage::Linked;

        let reference = cache.commit()?;
        self.stage = BuildStage::CacheCommitted;

        Ok(Completed {
            kind,
            compiled: outcome.compiled,
            objects: outcome.objects,
            output,
            linked,
            reference,
        })
    }

    /// Decide between a clean and an incremental build.
    fn resolve_mode(&self, cache: &BuildCache) -> Result<BuildMode, BuildError> {
        if self.options.force_clean {
            tracing::debug!("clean build requested, resetting the cache");
            cache.reset()?;
            return Ok(BuildMode::Clean);
        }

        let reference = match cache.initialize_or_reset()? {
            CacheState::Fresh => return Ok(BuildMode::Clean),
            CacheState::Existing { reference } => reference,
        };

        // An epoch marker records that no build has succeeded yet
        if reference <= UNIX_EPOCH {
            return Ok(BuildMode::Clean);
        }

        if modified_after(&self.project.manifest_path, reference) {
            tracing::info!(
                "{} changed since the last build, rebuilding everything",
                self.project.manifest_path.display()
            );
            return Ok(BuildMode::Clean);
        }

        Ok(BuildMode::Incremental { reference })
    }

    fn link(
        &self,
        toolchain: &dyn ToolchainStrategy,
        kind: BuildKind,
        compiled: &[PathBuf],
        objects: &[PathBuf],
        sink: &dyn EventSink,
    ) -> Result<(PathBuf, bool), BuildError> {
        let name = &self.project.name;
        let binary = toolchain.binary_path(name);

        if kind == BuildKind::Incremental && compiled.is_empty() && binary.exists() {
            tracing::debug!("{} is current, skipping link", binary.display());
            sink.emit(BuildEvent::LinkSkipped { output: binary.clone() });
            return Ok((binary, false));
        }

        let output = toolchain.link(name, objects, sink)?;
        Ok((output, true))
    }
}

fn modified_after(path: &Path, reference: SystemTime) -> bool {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map(|t| t > reference)
        .unwrap_or(false)
}

/// Load the project at `manifest_path` and build it.
pub fn build(
    manifest_path: &Path,
    options: BuildOptions,
    sink: &dyn EventSink,
) -> Result<BuildReport, BuildError> {
    let project = ProjectModel::load(manifest_path)?;
    BuildOrchestrator::new(&project, options).run(sink)
}
