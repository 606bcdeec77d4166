//! Command implementations

pub mod build;
pub mod clean;
pub mod completions;
pub mod info;

use std::path::Path;

use anyhow::Result;

use anvil::{GlobalContext, ProjectModel};

/// Locate and load the project a command operates on.
fn load_project(ctx: &GlobalContext, explicit: Option<&Path>) -> Result<ProjectModel> {
    let manifest_path = ctx.project_file(explicit)?;
    Ok(ProjectModel::load(&manifest_path)?)
}
