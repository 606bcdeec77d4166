//! Test utilities and mocks for Anvil unit tests.
//!
//! This module provides a scripted [`CommandRunner`] that stands in for a real
//! compiler, timestamp helpers, and on-disk project fixtures.
//!
//! # Example
//!
//! ```rust,ignore
//! use anvil::test_support::{ProjectFixture, ScriptedRunner};
//!
//! #[test]
//! fn test_example() {
//!     let tmp = tempfile::TempDir::new().unwrap();
//!     let manifest = ProjectFixture::new("app").with_source("a.c", "").write_to(tmp.path()).unwrap();
//!
//!     let runner = ScriptedRunner::new();
//!     runner.fail_when(CommandPattern::Contains("-o bin".into()), output::failure(1, "ld: error"));
//!
//!     // Hand `runner` to a GccToolchain...
//! }
//! ```

pub mod fixtures;

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::SystemTime;

use crate::builder::depfile::parse_dependency_rule;
use crate::builder::error::BuildError;
use crate::builder::toolchain::{CommandRunner, CommandSpec, ProcessOutput};

// Re-export fixtures for convenience
pub use fixtures::*;

/// Set the modification time of an existing file.
pub fn set_mtime(path: &Path, time: SystemTime) {
    let file = File::options()
        .write(true)
        .open(path)
        .unwrap_or_else(|e| panic!("failed to open {}: {}", path.display(), e));
    file.set_modified(time)
        .unwrap_or_else(|e| panic!("failed to set mtime of {}: {}", path.display(), e));
}

/// Canned process outputs.
pub mod output {
    use crate::builder::toolchain::ProcessOutput;

    /// A successful output with the given stdout.
    pub fn success(stdout: impl Into<String>) -> ProcessOutput {
        ProcessOutput {
            exit_code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A failure output with the given exit code and stderr.
    pub fn failure(code: i32, stderr: impl Into<String>) -> ProcessOutput {
        ProcessOutput {
            exit_code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Pattern for matching command lines in [`ScriptedRunner`].
#[derive(Debug, Clone)]
pub enum CommandPattern {
    /// Exact match on the full command line.
    Exact(String),
    /// Match if the command line starts with prefix.
    StartsWith(String),
    /// Match if the command line contains substring.
    Contains(String),
    /// Match any command.
    Any,
}

impl CommandPattern {
    /// Check if this pattern matches the given command line.
    pub fn matches(&self, cmd: &str) -> bool {
        match self {
            CommandPattern::Exact(s) => cmd == s,
            CommandPattern::StartsWith(s) => cmd.starts_with(s),
            CommandPattern::Contains(s) => cmd.contains(s),
            CommandPattern::Any => true,
        }
    }
}

/// A fake GCC-style compiler driver.
///
/// - `-MM` queries answer with the scripted rule for that source, or a rule
///   listing only the source itself. Like GCC, a query whose rule names a
///   file that does not exist fails with exit code 1 unless `-MG` is given.
/// - Compile (`-c`) and link commands succeed and create their `-o` output,
///   so timestamps and "binary exists" checks behave like the real thing.
/// - Commands matching a failure pattern return that output instead and
///   create nothing.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    rules: Mutex<HashMap<String, String>>,
    failures: Mutex<Vec<(CommandPattern, ProcessOutput)>>,
    calls: Mutex<Vec<CommandSpec>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        ScriptedRunner::default()
    }

    /// Script the `-MM` output for `source` (as written in the project file).
    pub fn with_rule(self, source: &str, rule: impl Into<String>) -> Self {
        self.set_rule(source, rule);
        self
    }

    pub fn set_rule(&self, source: &str, rule: impl Into<String>) {
        if let Ok(mut rules) = self.rules.lock() {
            rules.insert(source.to_string(), rule.into());
        }
    }

    /// Make every command matching `pattern` return `output`.
    pub fn fail_when(&self, pattern: CommandPattern, output: ProcessOutput) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.push((pattern, output));
        }
    }

    /// Remove all failure patterns.
    pub fn clear_failures(&self) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.clear();
        }
    }

    /// All commands run so far.
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Forget the recorded commands.
    pub fn clear_calls(&self) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.clear();
        }
    }

    /// Compile commands run so far, as their source argument.
    pub fn compiled_sources(&self) -> Vec<PathBuf> {
        self.calls()
            .iter()
            .filter(|c| c.has_arg("-c"))
            .filter_map(|c| output_index(c).and_then(|i| c.args.get(i.checked_sub(2)?)))
            .map(PathBuf::from)
            .collect()
    }

    /// Number of link commands run so far.
    pub fn link_count(&self) -> usize {
        self.calls().iter().filter(|c| is_link(c)).count()
    }

    /// Number of `-MM` queries run so far.
    pub fn dependency_query_count(&self) -> usize {
        self.calls().iter().filter(|c| c.has_arg("-MM")).count()
    }
}

fn is_link(spec: &CommandSpec) -> bool {
    !spec.has_arg("-c") && !spec.has_arg("-MM")
}

/// Index of the argument following `-o`.
fn output_index(spec: &CommandSpec) -> Option<usize> {
    spec.args.iter().position(|a| a == "-o").map(|i| i + 1)
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, spec: &CommandSpec) -> Result<ProcessOutput, BuildError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(spec.clone());
        }

        let line = spec.display();
        if let Ok(failures) = self.failures.lock() {
            if let Some((_, output)) = failures.iter().find(|(p, _)| p.matches(&line)) {
                return Ok(output.clone());
            }
        }

        if spec.has_arg("-MM") {
            let source = spec.args.last().cloned().unwrap_or_default();
            let rule = self
                .rules
                .lock()
                .ok()
                .and_then(|rules| rules.get(&source).cloned())
                .unwrap_or_else(|| format!("out.o: {}\n", source));

            if !spec.has_arg("-MG") {
                let base = spec.cwd.clone().unwrap_or_default();
                let missing = parse_dependency_rule(&rule)
                    .into_iter()
                    .skip(1)
                    .find(|dep| !base.join(dep).exists());
                if let Some(dep) = missing {
                    return Ok(output::failure(
                        1,
                        format!(
                            "{}:1:10: fatal error: {}: No such file or directory\ncompilation terminated.\n",
                            source,
                            dep.display()
                        ),
                    ));
                }
            }
            return Ok(output::success(rule));
        }

        if let Some(out) = output_index(spec).and_then(|i| spec.args.get(i)) {
            let base = spec.cwd.clone().unwrap_or_default();
            let path = base.join(out);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|source| BuildError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            std::fs::write(&path, "").map_err(|source| BuildError::Io { path, source })?;
        }

        Ok(output::success(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_pattern_matches() {
        assert!(CommandPattern::Exact("g++ -c a.c".into()).matches("g++ -c a.c"));
        assert!(CommandPattern::StartsWith("g++".into()).matches("g++ -c a.c"));
        assert!(CommandPattern::Contains("-MM".into()).matches("g++ -MM a.c"));
        assert!(CommandPattern::Any.matches("anything"));
        assert!(!CommandPattern::Contains("-lm".into()).matches("g++ -c a.c"));
    }

    #[test]
    fn test_scripted_runner_creates_outputs() {
        let tmp = tempfile::TempDir::new().unwrap();
        let runner = ScriptedRunner::new();
        let spec = CommandSpec::new("g++")
            .args(["-c", "a.c", "-o", "obj/a.o"])
            .cwd(tmp.path());

        assert!(runner.run(&spec).unwrap().success());
        assert!(tmp.path().join("obj/a.o").exists());
        assert_eq!(runner.compiled_sources(), vec![PathBuf::from("a.c")]);
    }

    #[test]
    fn test_scripted_runner_failure() {
        let runner = ScriptedRunner::new();
        runner.fail_when(CommandPattern::Contains("bad.c".into()), output::failure(1, "boom"));

        let spec = CommandSpec::new("g++").args(["-c", "bad.c", "-o", "/nonexistent/bad.o"]);
        let out = runner.run(&spec).unwrap();
        assert_eq!(out.exit_code, Some(1));
        assert_eq!(out.stderr, "boom");
    }

    #[test]
    fn test_scripted_runner_rules() {
        let runner = ScriptedRunner::new().with_rule("a.c", "a.o: a.c util.h\n");

        let out = runner
            .run(&CommandSpec::new("g++").args(["-MM", "-MG", "a.c"]))
            .unwrap();
        assert_eq!(out.stdout, "a.o: a.c util.h\n");

        let out = runner
            .run(&CommandSpec::new("g++").args(["-MM", "b.c"]))
            .unwrap();
        assert_eq!(out.stdout, "out.o: b.c\n");
        assert_eq!(runner.dependency_query_count(), 2);
    }

    #[test]
    fn test_scripted_runner_missing_header() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join("a.c"), "").unwrap();
        let runner = ScriptedRunner::new().with_rule("a.c", "a.o: a.c util.h\n");

        let out = runner
            .run(&CommandSpec::new("g++").args(["-MM", "a.c"]).cwd(tmp.path()))
            .unwrap();
        assert_eq!(out.exit_code, Some(1));
        assert!(out.stderr.contains("util.h: No such file or directory"));

        let out = runner
            .run(&CommandSpec::new("g++").args(["-MM", "-MG", "a.c"]).cwd(tmp.path()))
            .unwrap();
        assert!(out.success());
        assert_eq!(out.stdout, "a.o: a.c util.h\n");

        std::fs::write(tmp.path().join("util.h"), "").unwrap();
        let out = runner
            .run(&CommandSpec::new("g++").args(["-MM", "a.c"]).cwd(tmp.path()))
            .unwrap();
        assert!(out.success());
    }
}
