//! Toolchain that runs nothing.
//!
//! It walks the same pipeline as a real toolchain (directories, object
//! naming, staleness on the sources' own timestamps, events) so a project can
//! be validated without a compiler installed.

use std::path::{Path, PathBuf};

use crate::builder::dependency::DependencyQuery;
use crate::builder::error::BuildError;
use crate::builder::events::EventSink;
use crate::builder::layout::OutputLayout;
use crate::core::project::ProjectModel;

use super::{link_objects, BuildMode, CompileOutcome, ToolchainKind, ToolchainStrategy, Units};

const OBJECT_EXTENSION: &str = "o";

pub struct DummyToolchain {
    root: PathBuf,
    sources: Vec<PathBuf>,
    layout: OutputLayout,
}

impl DummyToolchain {
    pub fn new(project: &ProjectModel, layout: OutputLayout) -> Self {
        DummyToolchain {
            root: project.root_dir.clone(),
            sources: project.sources.clone(),
            layout,
        }
    }
}

impl DependencyQuery for DummyToolchain {
    fn include_closure(&self, _source: &Path) -> Result<Vec<PathBuf>, BuildError> {
        Ok(Vec::new())
    }
}

impl ToolchainStrategy for DummyToolchain {
    fn kind(&self) -> ToolchainKind {
        ToolchainKind::Dummy
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
            jobs: 1,
            // Nothing is ever written to obj/
            require_objects: false,
        };

        units.compile(self, mode, sink, |source, object| {
            tracing::debug!("dummy compile: {} -> {}", source.display(), object.display());
            Ok(())
        })
    }

    fn link(
        &self,
        output_name: &str,
        objects: &[PathBuf],
        sink: &dyn EventSink,
    ) -> Result<PathBuf, BuildError> {
        let output = self.binary_path(output_name);
        link_objects(output, objects, sink, || {
            tracing::debug!("dummy link: {} objects", objects.len());
            Ok(())
        })
    }

    fn binary_path(&self, output_name: &str) -> PathBuf {
        self.layout
            .binary_path(output_name, std::env::consts::EXE_SUFFIX)
    }
}
