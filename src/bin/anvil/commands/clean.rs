//! `anvil clean` command

use anyhow::Result;

use crate::cli::CleanArgs;
use anvil::ops::anvil_build::BuildOptions;
use anvil::ops::anvil_clean::clean;
use anvil::util::shell::Status;
use anvil::util::Shell;
use anvil::GlobalContext;

pub fn execute(args: CleanArgs, shell: &Shell) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let project = super::load_project(&ctx, args.project.as_deref())?;

    let config = ctx.config_for(&project.root_dir);
    let layout = BuildOptions::from_config(&config).layout(&project.root_dir);

    let result = clean(&project, &layout)?;

    for dir in &result.removed {
        shell.status(Status::Removed, dir.display());
    }
    for dir in &result.skipped {
        shell.warn(format!("{} is outside the project root, not removed", dir.display()));
    }
    if result.removed.is_empty() && result.skipped.is_empty() {
        shell.status(Status::Fresh, "nothing to clean");
    }

    Ok(())
}
