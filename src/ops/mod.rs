//! High-level operations.
//!
//! This module contains the implementation of Anvil commands.

pub mod anvil_build;
pub mod anvil_clean;

pub use anvil_build::{build, BuildKind, BuildOptions, BuildOrchestrator, BuildReport, BuildStage};
pub use anvil_clean::{clean, CleanResult};
