//! Toolchain abstraction for the build pipeline.
//!
//! A toolchain turns project data into compiler and linker invocations. It is
//! chosen once per build through [`ToolchainKind::instantiate`], which hands it
//! every option it will ever see; there is no way to swap toolchains after
//! the options are set.
//!
//! Two toolchains exist:
//! - [`DummyToolchain`] spawns nothing and always succeeds
//! - [`GccToolchain`] drives any GCC-compatible compiler (gcc, clang, MinGW)

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::SystemTime;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::builder::dependency::{DependencyAnalyzer, DependencyQuery};
use crate::builder::error::BuildError;
use crate::builder::events::{BuildEvent, EventSink};
use crate::builder::layout::OutputLayout;
use crate::core::project::ProjectModel;
use crate::util::process::ProcessBuilder;

mod detect;
mod dummy;
mod gcc;

pub use detect::{resolve_gcc_driver, DRIVER_CANDIDATES};
pub use dummy::DummyToolchain;
pub use gcc::GccToolchain;

/// The available toolchains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolchainKind {
    /// Runs nothing. Useful to validate a project without a compiler.
    #[default]
    Dummy,
    /// GCC-compatible compiler driver.
    Gcc,
}

impl ToolchainKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolchainKind::Dummy => "dummy",
            ToolchainKind::Gcc => "gcc",
        }
    }

    /// Build the toolchain for `project`.
    ///
    /// For [`ToolchainKind::Gcc`] this resolves the compiler driver and fails
    /// with [`BuildError::ToolchainNotFound`] when there is none.
    pub fn instantiate(
        self,
        project: &ProjectModel,
        setup: ToolchainSetup,
    ) -> Result<Box<dyn ToolchainStrategy>, BuildError> {
        match self {
            ToolchainKind::Dummy => Ok(Box::new(DummyToolchain::new(project, setup.layout))),
            ToolchainKind::Gcc => {
                let driver = resolve_gcc_driver(setup.cxx.as_deref())?;
                tracing::debug!("using compiler driver {}", driver.display());
                Ok(Box::new(GccToolchain::new(
                    driver,
                    project,
                    setup.layout,
                    setup.runner,
                    setup.jobs,
                )))
            }
        }
    }
}

impl fmt::Display for ToolchainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolchainKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dummy" => Ok(ToolchainKind::Dummy),
            "gcc" | "mingw" => Ok(ToolchainKind::Gcc),
            _ => Err(format!(
                "unknown toolchain: '{}' (expected 'gcc' or 'dummy')",
                s
            )),
        }
    }
}

/// Everything a toolchain needs besides the project itself.
#[derive(Clone)]
pub struct ToolchainSetup {
    pub layout: OutputLayout,
    /// Explicit compiler driver, if configured.
    pub cxx: Option<PathBuf>,
    pub runner: Arc<dyn CommandRunner>,
    /// Maximum number of concurrent compiles.
    pub jobs: usize,
}

impl ToolchainSetup {
    pub fn new(layout: OutputLayout) -> Self {
        ToolchainSetup {
            layout,
            cxx: None,
            runner: Arc::new(SystemRunner),
            jobs: 1,
        }
    }
}

/// How a compile step selects its work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    /// Compile every source.
    Clean,
    /// Compile only sources changed since `reference`.
    Incremental { reference: SystemTime },
}

impl BuildMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildMode::Clean => "clean",
            BuildMode::Incremental { .. } => "incremental",
        }
    }
}

/// Result of a compile step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOutcome {
    /// One object per declared source, in declaration order.
    pub objects: Vec<PathBuf>,
    /// Sources that were actually compiled.
    pub compiled: Vec<PathBuf>,
}

/// Uniform driver contract shared by every toolchain.
pub trait ToolchainStrategy: Send + Sync {
    fn kind(&self) -> ToolchainKind;

    /// Create the object and binary directories. Idempotent.
    fn setup_state(&self) -> Result<(), BuildError>;

    /// Object file for every source, in declaration order.
    ///
    /// Fails with [`BuildError::ObjectCollision`] when two sources share a stem.
    fn object_paths(&self) -> Result<Vec<PathBuf>, BuildError>;

    /// Compile the sources selected by `mode`.
    fn compile(&self, mode: BuildMode, sink: &dyn EventSink) -> Result<CompileOutcome, BuildError>;

    /// Link `objects` into `<bin_dir>/<output_name><exe suffix>`.
    fn link(
        &self,
        output_name: &str,
        objects: &[PathBuf],
        sink: &dyn EventSink,
    ) -> Result<PathBuf, BuildError>;

    /// Where [`ToolchainStrategy::link`] writes its executable.
    fn binary_path(&self, output_name: &str) -> PathBuf;
}

/// A command to execute: program, arguments and working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// The program to run (e.g., "g++")
    pub program: PathBuf,
    /// Command arguments
    pub args: Vec<String>,
    /// Working directory
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    /// Create a new command spec.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        CommandSpec {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Add an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(|a| a.into()));
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Whether any argument equals `arg`.
    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }

    pub fn to_process_builder(&self) -> ProcessBuilder {
        let mut cmd = ProcessBuilder::new(&self.program).args(&self.args);

        if let Some(ref cwd) = self.cwd {
            cmd = cmd.cwd(cwd);
        }

        cmd
    }

    /// Command line as a single string, for logs and errors.
    pub fn display(&self) -> String {
        self.to_process_builder().display_command()
    }
}

/// Captured result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs external commands to completion.
pub trait CommandRunner: Send + Sync {
    /// Run `spec` and wait for it. Only a failure to launch is an error; a
    /// non-zero exit is reported through [`ProcessOutput::exit_code`].
    fn run(&self, spec: &CommandSpec) -> Result<ProcessOutput, BuildError>;
}

/// Runner that spawns real processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<ProcessOutput, BuildError> {
        let output = spec
            .to_process_builder()
            .exec()
            .map_err(|e| BuildError::ToolchainInvocation {
                command: spec.display(),
                exit_code: None,
                stderr: format!("{:#}", e),
            })?;

        Ok(ProcessOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Run a command and turn a non-zero exit into [`BuildError::ToolchainInvocation`].
pub(crate) fn run_checked(
    runner: &dyn CommandRunner,
    spec: &CommandSpec,
) -> Result<ProcessOutput, BuildError> {
    tracing::debug!("running: {}", spec.display());

    let output = runner.run(spec)?;
    if !output.success() {
        return Err(BuildError::ToolchainInvocation {
            command: spec.display(),
            exit_code: output.exit_code,
            stderr: output.stderr,
        });
    }
    Ok(output)
}

/// The translation units of one project, with their precomputed objects.
pub(crate) struct Units<'a> {
    pub sources: &'a [PathBuf],
    pub objects: Vec<PathBuf>,
    pub base_dir: &'a Path,
    pub jobs: usize,
    /// Treat a unit whose object file is missing as stale.
    pub require_objects: bool,
}

impl Units<'_> {
    /// Select the stale units and compile them with `compile_one`.
    ///
    /// Compiles run sequentially and stop at the first failure, unless
    /// `jobs > 1`, in which case they are spread over a dedicated thread pool
    /// and the first failure in source order is reported.
    pub fn compile<Q, F>(
        self,
        query: &Q,
        mode: BuildMode,
        sink: &dyn EventSink,
        compile_one: F,
    ) -> Result<CompileOutcome, BuildError>
    where
        Q: DependencyQuery + ?Sized,
        F: Fn(&Path, &Path) -> Result<(), BuildError> + Sync,
    {
        if self.sources.is_empty() {
            sink.emit(BuildEvent::NoSources);
            return Err(BuildError::EmptySourceSet);
        }

        let stale = match mode {
            BuildMode::Clean => self.sources.to_vec(),
            BuildMode::Incremental { reference } => {
                let analyzer = DependencyAnalyzer::new(query, reference, self.base_dir);
                if self.require_objects {
                    analyzer.stale_units(self.sources, &self.objects)?
                } else {
                    analyzer.stale_sources(self.sources)?
                }
            }
        };

        if stale.is_empty() {
            tracing::debug!("all {} source files are up to date", self.sources.len());
            sink.emit(BuildEvent::UpToDate {
                sources: self.sources.len(),
            });
            return Ok(CompileOutcome {
                objects: self.objects,
                compiled: Vec::new(),
            });
        }

        let stale_set: HashSet<&PathBuf> = stale.iter().collect();
        let work: Vec<(&PathBuf, &PathBuf)> = self
            .sources
            .iter()
            .zip(&self.objects)
            .filter(|(source, _)| stale_set.contains(source))
            .collect();

        tracing::debug!("compiling {} of {} files", work.len(), self.sources.len());

        let compile_unit = |source: &PathBuf, object: &PathBuf| {
            sink.emit(BuildEvent::compiling(source, object));
            compile_one(source.as_path(), object.as_path())
        };

        let pool = if self.jobs > 1 && work.len() > 1 {
            match rayon::ThreadPoolBuilder::new().num_threads(self.jobs).build() {
                Ok(pool) => Some(pool),
                Err(e) => {
                    tracing::warn!(
                        "failed to start {} workers, compiling sequentially: {}",
                        self.jobs,
                        e
                    );
                    None
                }
            }
        } else {
            None
        };

        match pool {
            Some(pool) => {
                let results: Vec<Result<(), BuildError>> = pool.install(|| {
                    work.par_iter()
                        .map(|&(source, object)| compile_unit(source, object))
                        .collect()
                });
                for result in results {
                    result?;
                }
            }
            None => {
                for &(source, object) in &work {
                    compile_unit(source, object)?;
                }
            }
        }

        Ok(CompileOutcome {
            objects: self.objects,
            compiled: stale,
        })
    }
}

/// Shared link bookkeeping: the empty-input check and the link events.
pub(crate) fn link_objects<F>(
    output: PathBuf,
    objects: &[PathBuf],
    sink: &dyn EventSink,
    link: F,
) -> Result<PathBuf, BuildError>
where
    F: FnOnce() -> Result<(), BuildError>,
{
    if objects.is_empty() {
        sink.emit(BuildEvent::NoObjects);
        return Err(BuildError::NoObjects);
    }

    sink.emit(BuildEvent::Linking {
        output: output.clone(),
        objects: objects.len(),
    });

    match link() {
        Ok(()) => {
            sink.emit(BuildEvent::LinkSucceeded {
                output: output.clone(),
            });
            Ok(output)
        }
        Err(e) => {
            sink.emit(BuildEvent::LinkFailed {
                output,
                message: e.to_string(),
            });
            Err(e)
        }
    }
}
