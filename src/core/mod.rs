//! Core data structures for Anvil.
//!
//! The project model is loaded once per invocation and only read afterwards.

pub mod project;

pub use project::{find_project_file, CompilerOptions, LinkerOptions, ProjectModel, PROJECT_FILE};
