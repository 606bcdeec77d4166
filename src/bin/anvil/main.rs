//! Anvil CLI - incremental builds for C and C++ projects

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use anvil::util::diagnostic::{self, Diagnostic};
use anvil::util::Shell;
use anvil::BuildError;
use cli::{Cli, Commands, MessageFormat};

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("anvil=debug")
    } else if cli.quiet {
        EnvFilter::new("anvil=error")
    } else {
        EnvFilter::new("anvil=info")
    };

    // stdout is reserved for JSON events and command output
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let shell = Shell::from_flags(
        cli.quiet,
        cli.verbose,
        cli.color,
        cli.message_format == MessageFormat::Json,
    );

    if let Err(e) = run(cli, &shell) {
        report(&e, &shell);
        std::process::exit(1);
    }
}

fn run(cli: Cli, shell: &Shell) -> Result<()> {
    match cli.command {
        Commands::Build(args) => commands::build::execute(args, shell),
        Commands::Info(args) => commands::info::execute(args, shell),
        Commands::Clean(args) => commands::clean::execute(args, shell),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

fn report(error: &anyhow::Error, shell: &Shell) {
    let diag = match error.downcast_ref::<BuildError>() {
        Some(build_error) => build_error.to_diagnostic(),
        None => Diagnostic::error(format!("{:#}", error)),
    };
    diagnostic::emit(&diag, shell.use_color());
}
