//! Anvil - an incremental build orchestrator for C and C++ projects
//!
//! This crate provides the build engine behind the `anvil` binary: project
//! loading, staleness detection against a reference timestamp, the toolchain
//! abstraction and the build pipeline that ties them together.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities and mocks for Anvil unit tests.
///
/// This module is only available when compiling tests. It provides a scripted
/// command runner and on-disk project fixtures.
#[cfg(test)]
pub mod test_support;

pub use builder::{BuildError, BuildEvent, ToolchainKind, ToolchainStrategy};
pub use core::project::ProjectModel;
pub use ops::anvil_build::{build, BuildOptions, BuildOrchestrator, BuildReport};
pub use util::context::GlobalContext;
