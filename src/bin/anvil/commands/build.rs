//! `anvil build` command

use anyhow::Result;

use crate::cli::BuildArgs;
use anvil::ops::anvil_build::{BuildOptions, BuildOrchestrator};
use anvil::util::Shell;
use anvil::GlobalContext;

pub fn execute(args: BuildArgs, shell: &Shell) -> Result<()> {
    let mut ctx = GlobalContext::new()?;
    ctx.set_verbose(shell.is_verbose());

    let project = super::load_project(&ctx, args.project.as_deref())?;

    // Config (global + project), then CLI flags on top
    let config = ctx.config_for(&project.root_dir);
    let mut opts = BuildOptions::from_config(&config);
    if let Some(toolchain) = args.toolchain {
        opts.toolchain = toolchain;
    }
    if let Some(jobs) = args.jobs {
        opts.jobs = jobs.max(1);
    }
    opts.force_clean = args.clean;

    let report = BuildOrchestrator::new(&project, opts).run(shell)?;

    if shell.is_verbose() {
        shell.note(format!("output: {}", report.output.display()));
    }

    Ok(())
}
