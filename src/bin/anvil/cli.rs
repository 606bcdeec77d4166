//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use anvil::util::shell::ColorChoice;
use anvil::ToolchainKind;

/// Anvil - incremental builds for C and C++ projects
#[derive(Parser)]
#[command(name = "anvil")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Output format for build messages
    #[arg(long, global = true, value_enum, default_value_t = MessageFormat::Human)]
    pub message_format: MessageFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum MessageFormat {
    Human,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the project
    Build(BuildArgs),

    /// Show what the project file describes
    Info(InfoArgs),

    /// Remove build outputs and the build cache
    Clean(CleanArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct BuildArgs {
    /// Project file or directory (defaults to searching upward for Anvil.toml)
    pub project: Option<PathBuf>,

    /// Toolchain to build with (gcc or dummy)
    #[arg(long, env = "ANVIL_TOOLCHAIN")]
    pub toolchain: Option<ToolchainKind>,

    /// Ignore the build cache and recompile everything
    #[arg(long)]
    pub clean: bool,

    /// Number of parallel compile jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

#[derive(Args)]
pub struct InfoArgs {
    /// Project file or directory
    pub project: Option<PathBuf>,
}

#[derive(Args)]
pub struct CleanArgs {
    /// Project file or directory
    pub project: Option<PathBuf>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
