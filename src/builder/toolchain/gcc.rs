//! GCC-compatible toolchain (gcc, clang, MinGW).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::builder::dependency::DependencyQuery;
use crate::builder::depfile::parse_dependency_rule;
use crate::builder::error::BuildError;
use crate::builder::events::EventSink;
use crate::builder::layout::OutputLayout;
use crate::core::project::{CompilerOptions, LinkerOptions, ProjectModel};

use super::{
    link_objects, run_checked, BuildMode, CommandRunner, CommandSpec, CompileOutcome,
    ToolchainKind, ToolchainStrategy, Units,
};

/// Object file extension.
const OBJECT_EXTENSION: &str = "o";

/// Toolchain driving a single GCC-style compiler driver for compile, link and
/// dependency queries.
pub struct GccToolchain {
    driver: PathBuf,
    root: PathBuf,
    sources: Vec<PathBuf>,
    compiler: CompilerOptions,
    linker: LinkerOptions,
    layout: OutputLayout,
    runner: Arc<dyn CommandRunner>,
    jobs: usize,
}

impl GccToolchain {
    pub fn new(
        driver: PathBuf,
        project: &ProjectModel,
        layout: OutputLayout,
        runner: Arc<dyn CommandRunner>,
        jobs: usize,
    ) -> Self {
        GccToolchain {
            driver,
            root: project.root_dir.clone(),
            sources: project.sources.clone(),
            compiler: project.compiler.clone(),
            linker: project.linker.clone(),
            layout,
            runner,
            jobs: jobs.max(1),
        }
    }

    fn command(&self) -> CommandSpec {
        CommandSpec::new(&self.driver).cwd(&self.root)
    }

    /// Flags, defines and include directories, in that order.
    fn preprocessor_args(&self, mut cmd: CommandSpec) -> CommandSpec {
        cmd = cmd.args(self.compiler.flags.iter().cloned());

        for define in &self.compiler.defines {
            cmd = cmd.arg(format!("-D{}", define));
        }

        for dir in &self.compiler.include_dirs {
            cmd = cmd.arg(format!("-I{}", dir.display()));
        }

        cmd
    }

    /// `<cxx> -c <flags> -D<def>... -I<dir>... <source> -o <object>`
    pub fn compile_command(&self, source: &Path, object: &Path) -> CommandSpec {
        let cmd = self.preprocessor_args(self.command().arg("-c"));

        cmd.arg(source.display().to_string())
            .arg("-o")
            .arg(object.display().to_string())
    }

    /// `<cxx> -MM -MG <flags> -D<def>... -I<dir>... <source>`
    ///
    /// `-MM` leaves system headers out of the rule. With `-MG` a header that
    /// cannot be found is still listed instead of failing the query, so the
    /// analyzer reports it as a vanished dependency.
    pub fn dependency_command(&self, source: &Path) -> CommandSpec {
        let cmd = self.preprocessor_args(self.command().args(["-MM", "-MG"]));
        cmd.arg(source.display().to_string())
    }

    /// `<cxx> <ldflags> -L<dir>... <objects> -l<lib>... -o <output>`
    pub fn link_command(&self, objects: &[PathBuf], output: &Path) -> CommandSpec {
        let mut cmd = self.command().args(self.linker.flags.iter().cloned());

        for dir in &self.linker.include_dirs {
            cmd = cmd.arg(format!("-L{}", dir.display()));
        }

        for obj in objects {
            cmd = cmd.arg(obj.display().to_string());
        }

        // Libraries go after the objects that reference them
        for lib in &self.linker.libraries {
            cmd = cmd.arg(format!("-l{}", lib));
        }

        cmd.arg("-o").arg(output.display().to_string())
    }
}

impl DependencyQuery for GccToolchain {
    fn include_closure(&self, source: &Path) -> Result<Vec<PathBuf>, BuildError> {
        let output = run_checked(self.runner.as_ref(), &self.dependency_command(source))?;
        Ok(parse_dependency_rule(&output.stdout))
    }
}

impl ToolchainStrategy for GccToolchain {
    fn kind(&self) -> ToolchainKind {
        ToolchainKind::Gcc
    }

    fn setup_state(&self) -> Result<(), BuildError> {
        self.layout.ensure()
    }

    fn object_paths(&self) -> Result<Vec<PathBuf>, BuildError> {
        self.layout.object_paths(&self.sources, OBJECT_EXTENSION)
    }

    fn compile(&self, mode: BuildMode, sink: &dyn EventSink) -> Result<CompileOutcome, BuildError> {
        let units = Units {
            sources: &self.sources,
            objects: self.object_paths()?,
            base_dir: &self.root,
            jobs: self.jobs,
            require_objects: true,
        };

        units.compile(self, mode, sink, |source, object| {
            run_checked(self.runner.as_ref(), &self.compile_command(source, object)).map(|_| ())
        })
    }

    fn link(
        &self,
        output_name: &str,
        objects: &[PathBuf],
        sink: &dyn EventSink,
    ) -> Result<PathBuf, BuildError> {
        let output = self.binary_path(output_name);
        let cmd = self.link_command(objects, &output);

        link_objects(output, objects, sink, || {
            run_checked(self.runner.as_ref(), &cmd).map(|_| ())
        })
    }

    fn binary_path(&self, output_name: &str) -> PathBuf {
        self.layout
            .binary_path(output_name, std::env::consts::EXE_SUFFIX)
    }
}
