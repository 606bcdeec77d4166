//! Incremental build engine.
//!
//! This module holds everything between a loaded project and a linked
//! executable: the reference-timestamp cache, staleness detection, the
//! toolchain abstraction and the events the pipeline emits.

pub mod cache;
pub mod dependency;
pub mod depfile;
pub mod error;
pub mod events;
pub mod layout;
pub mod toolchain;

pub use cache::{BuildCache, CacheState};
pub use dependency::{DependencyAnalyzer, DependencyQuery, Staleness};
pub use error::BuildError;
pub use events::{BuildEvent, EventLog, EventSink, NullSink};
pub use layout::OutputLayout;
pub use toolchain::{
    BuildMode, CommandRunner, CommandSpec, CompileOutcome, ProcessOutput, SystemRunner,
    ToolchainKind, ToolchainSetup, ToolchainStrategy,
};
