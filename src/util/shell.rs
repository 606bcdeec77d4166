//! Centralized shell output.
//!
//! The Shell module provides a unified API for all CLI output:
//! - Status messages with consistent formatting
//! - Rendering of build events
//! - JSON output mode for machine-readable output
//!
//! Human output goes to stderr. In JSON mode every build event is printed to
//! stdout as one JSON object per line and nothing else is written there.

use std::fmt::Display;
use std::io::{self, IsTerminal, Write};

use crate::builder::events::{BuildEvent, EventSink};

/// Shell output mode - Human and Json are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellMode {
    /// Human-readable output with optional colors.
    Human {
        verbosity: Verbosity,
        color: ColorChoice,
    },
    /// Machine-readable JSON output only.
    Json,
}

impl Default for ShellMode {
    fn default() -> Self {
        ShellMode::Human {
            verbosity: Verbosity::Normal,
            color: ColorChoice::Auto,
        }
    }
}

/// Output verbosity level (Human mode only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// --quiet: errors only
    Quiet,
    #[default]
    Normal,
    /// --verbose: also phase details
    Verbose,
}

/// Color output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Detect TTY and use colors if available.
    #[default]
    Auto,
    /// Always use ANSI colors.
    Always,
    /// Never use ANSI colors.
    Never,
}

impl std::str::FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ColorChoice::Auto),
            "always" => Ok(ColorChoice::Always),
            "never" => Ok(ColorChoice::Never),
            _ => Err(format!(
                "invalid color choice '{}'; expected 'auto', 'always', or 'never'",
                s
            )),
        }
    }
}

/// Status types for output messages.
///
/// Shell handles all formatting - callers just specify the semantic status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    // Success statuses (green)
    Finished,
    Fresh,
    Removed,

    // In-progress statuses (cyan)
    Building,
    Compiling,
    Linking,

    // Info statuses (blue)
    Info,

    // Warning statuses (yellow)
    Skipped,
    Warning,

    // Error status (red)
    Error,
}

impl Status {
    /// Get the display text for this status.
    fn as_str(&self) -> &'static str {
        match self {
            Status::Finished => "Finished",
            Status::Fresh => "Fresh",
            Status::Removed => "Removed",
            Status::Building => "Building",
            Status::Compiling => "Compiling",
            Status::Linking => "Linking",
            Status::Info => "Info",
            Status::Skipped => "Skipped",
            Status::Warning => "Warning",
            Status::Error => "error",
        }
    }

    /// Get the ANSI color code for this status.
    fn color_code(&self) -> &'static str {
        match self {
            Status::Finished | Status::Fresh | Status::Removed => "\x1b[1;32m",
            Status::Building | Status::Compiling | Status::Linking => "\x1b[1;36m",
            Status::Info => "\x1b[1;34m",
            Status::Skipped | Status::Warning => "\x1b[1;33m",
            Status::Error => "\x1b[1;31m",
        }
    }

    /// Get the width for alignment (12 characters).
    fn width(&self) -> usize {
        12
    }
}

/// Central shell for all CLI output.
#[derive(Debug)]
pub struct Shell {
    mode: ShellMode,
    use_color: bool,
}

impl Shell {
    /// Create a new shell with the given mode.
    pub fn new(mode: ShellMode) -> Self {
        let use_color = match &mode {
            ShellMode::Json => false,
            ShellMode::Human { color, .. } => match color {
                ColorChoice::Auto => io::stderr().is_terminal(),
                ColorChoice::Always => true,
                ColorChoice::Never => false,
            },
        };

        Shell { mode, use_color }
    }

    /// Create a shell from CLI flags with proper precedence.
    ///
    /// JSON mode takes precedence over quiet/verbose.
    pub fn from_flags(
        quiet: bool,
        verbose: bool,
        color: ColorChoice,
        message_format_json: bool,
    ) -> Self {
        let mode = if message_format_json {
            ShellMode::Json
        } else {
            let verbosity = if quiet {
                Verbosity::Quiet
            } else if verbose {
                Verbosity::Verbose
            } else {
                Verbosity::Normal
            };
            ShellMode::Human { verbosity, color }
        };

        Shell::new(mode)
    }

    /// Check if shell is in quiet mode.
    pub fn is_quiet(&self) -> bool {
        matches!(
            self.mode,
            ShellMode::Human {
                verbosity: Verbosity::Quiet,
                ..
            }
        )
    }

    /// Check if shell is in verbose mode.
    pub fn is_verbose(&self) -> bool {
        matches!(
            self.mode,
            ShellMode::Human {
                verbosity: Verbosity::Verbose,
                ..
            }
        )
    }

    /// Check if shell is in JSON mode.
    pub fn is_json(&self) -> bool {
        matches!(self.mode, ShellMode::Json)
    }

    /// Check if colors are enabled.
    pub fn use_color(&self) -> bool {
        self.use_color
    }

    /// Print a status message.
    ///
    /// Format: `{status:>12} {message}`
    ///
    /// In quiet mode, only Error status is printed.
    /// In JSON mode, messages are silently ignored.
    pub fn status(&self, status: Status, msg: impl Display) {
        if self.is_json() {
            return;
        }

        if self.is_quiet() && status != Status::Error {
            return;
        }

        eprintln!("{} {}", self.format_status(status), msg);
    }

    /// Print an info message.
    pub fn note(&self, msg: impl Display) {
        self.status(Status::Info, msg);
    }

    /// Print a warning message.
    pub fn warn(&self, msg: impl Display) {
        self.status(Status::Warning, msg);
    }

    /// Print a JSON line to stdout. Ignored in human mode.
    pub fn json_line(&self, json: &str) {
        if !self.is_json() {
            return;
        }

        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{}", json);
        let _ = stdout.flush();
    }

    /// Format a status prefix with optional color.
    fn format_status(&self, status: Status) -> String {
        let text = status.as_str();
        let width = status.width();

        if self.use_color {
            let color = status.color_code();
            format!("{}{:>width$}\x1b[0m", color, text, width = width)
        } else {
            format!("{:>width$}", text, width = width)
        }
    }
}

impl Default for Shell {
    fn default() -> Self {
        Shell::new(ShellMode::default())
    }
}

impl EventSink for Shell {
    fn emit(&self, event: BuildEvent) {
        if self.is_json() {
            self.json_line(&event.to_json());
            return;
        }

        if let Some((status, msg)) = describe(&event) {
            // Phase details only in verbose mode
            if status == Status::Info && !self.is_verbose() {
                return;
            }
            self.status(status, msg);
        }
    }
}

/// Human rendering of a build event. `None` means the event prints nothing;
/// failures are reported through the error diagnostic instead.
pub fn describe(event: &BuildEvent) -> Option<(Status, String)> {
    let line = match event {
        BuildEvent::ProjectLoaded {
            name,
            sources,
            headers,
            toolchain,
        } => (
            Status::Building,
            format!(
                "{} ({} sources, {} headers, {} toolchain)",
                name, sources, headers, toolchain
            ),
        ),
        BuildEvent::CacheResolved { mode } => (Status::Info, format!("{} build", mode)),
        BuildEvent::Compiling { source, .. } => (Status::Compiling, source.display().to_string()),
        BuildEvent::NoSources => (Status::Warning, "no source files available".to_string()),
        BuildEvent::UpToDate { sources } => (
            Status::Fresh,
            format!("all {} source files up to date", sources),
        ),
        BuildEvent::Linking { output, objects } => (
            Status::Linking,
            format!("{} ({} objects)", output.display(), objects),
        ),
        BuildEvent::LinkSkipped { output } => (
            Status::Skipped,
            format!("linking, {} is up to date", output.display()),
        ),
        BuildEvent::NoObjects => (Status::Warning, "no object files to link".to_string()),
        BuildEvent::BuildFinished {
            success: true,
            compiled,
            duration_ms,
        } => (
            Status::Finished,
            format!(
                "{} compiled in {:.2}s",
                plural(*compiled, "file"),
                *duration_ms as f64 / 1000.0
            ),
        ),
        BuildEvent::LinkSucceeded { .. }
        | BuildEvent::LinkFailed { .. }
        | BuildEvent::BuildFinished { success: false, .. } => return None,
    };
    Some(line)
}

fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{} {}", n, noun)
    } else {
        format!("{} {}s", n, noun)
    }
}
