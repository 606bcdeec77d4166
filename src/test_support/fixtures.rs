//! Test fixtures for common test scenarios.

use std::path::{Path, PathBuf};

use crate::core::project::PROJECT_FILE;

/// Fixture for a complete project structure.
#[derive(Debug, Clone)]
pub struct ProjectFixture {
    /// Project name.
    pub name: String,
    /// Source files (path relative to project root, content).
    pub sources: Vec<(PathBuf, String)>,
    /// Header files (path relative to project root, content).
    pub headers: Vec<(PathBuf, String)>,
    pub include_dirs: Vec<String>,
    pub libraries: Vec<String>,
    /// Replaces the generated Anvil.toml when set.
    pub manifest: Option<String>,
}

impl ProjectFixture {
    /// Create a new empty project fixture.
    pub fn new(name: impl Into<String>) -> Self {
        ProjectFixture {
            name: name.into(),
            sources: Vec::new(),
            headers: Vec::new(),
            include_dirs: Vec::new(),
            libraries: Vec::new(),
            manifest: None,
        }
    }

    /// Two sources sharing one header: `a.c`, `b.c`, `include/util.h`.
    pub fn two_units(name: impl Into<String>) -> Self {
        ProjectFixture::new(name)
            .with_source("a.c", "#include \"util.h\"\nint a(void) { return util(); }\n")
            .with_source("b.c", "int main(void) { return 0; }\n")
            .with_header("include/util.h", "static inline int util(void) { return 1; }\n")
            .with_include_dir("include")
    }

    pub fn with_source(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.sources.push((path.into(), content.into()));
        self
    }

    pub fn with_header(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.headers.push((path.into(), content.into()));
        self
    }

    pub fn with_include_dir(mut self, dir: impl Into<String>) -> Self {
        self.include_dirs.push(dir.into());
        self
    }

    pub fn with_library(mut self, lib: impl Into<String>) -> Self {
        self.libraries.push(lib.into());
        self
    }

    /// Use a hand-written project file.
    pub fn with_manifest(mut self, manifest: impl Into<String>) -> Self {
        self.manifest = Some(manifest.into());
        self
    }

    /// Render the Anvil.toml for this fixture.
    pub fn render_manifest(&self) -> String {
        if let Some(ref manifest) = self.manifest {
            return manifest.clone();
        }

        format!(
            r#"[project]
name = "{}"

[sources]
files = [{}]

[headers]
files = [{}]

[compiler]
flags = ["-Wall"]
defines = []
include = [{}]

[linker]
flags = []
libraries = [{}]
include = []
"#,
            self.name,
            quoted(self.sources.iter().map(|(p, _)| p.display().to_string())),
            quoted(self.headers.iter().map(|(p, _)| p.display().to_string())),
            quoted(self.include_dirs.iter().cloned()),
            quoted(self.libraries.iter().cloned()),
        )
    }

    /// Write this fixture into `root`. Returns the path of the project file.
    pub fn write_to(&self, root: &Path) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(root)?;

        let manifest = root.join(PROJECT_FILE);
        std::fs::write(&manifest, self.render_manifest())?;

        for (rel_path, content) in self.sources.iter().chain(&self.headers) {
            let full_path = root.join(rel_path);
            if let Some(parent) = full_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&full_path, content)?;
        }

        Ok(manifest)
    }
}

fn quoted(items: impl Iterator<Item = String>) -> String {
    items
        .map(|s| format!("\"{}\"", s))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Common compiler outputs.
pub mod gcc_output {
    /// `-MM` rule for `source` including `headers`.
    pub fn rule(object: &str, source: &str, headers: &[&str]) -> String {
        let mut rule = format!("{}: {}", object, source);
        for header in headers {
            rule.push_str(" \\\n ");
            rule.push_str(header);
        }
        rule.push('\n');
        rule
    }

    /// A compile error in GCC's diagnostic format.
    pub fn compile_error(file: &str, line: u32, message: &str) -> String {
        format!("{}:{}:1: error: {}\n", file, line, message)
    }

    /// An undefined-reference link error.
    pub fn undefined_reference(symbol: &str) -> String {
        format!("undefined reference to `{}'\ncollect2: error: ld returned 1 exit status\n", symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::project::ProjectModel;

    #[test]
    fn test_fixture_round_trips_through_loader() {
        let tmp = tempfile::TempDir::new().unwrap();
        let manifest = ProjectFixture::two_units("demo")
            .with_library("m")
            .write_to(tmp.path())
            .unwrap();

        let project = ProjectModel::load(&manifest).unwrap();
        assert_eq!(project.name, "demo");
        assert_eq!(project.sources, vec![PathBuf::from("a.c"), PathBuf::from("b.c")]);
        assert_eq!(project.compiler.include_dirs, vec![PathBuf::from("include")]);
        assert_eq!(project.linker.libraries, vec!["m"]);
        assert!(tmp.path().join("include/util.h").exists());
    }

    #[test]
    fn test_gcc_rule_uses_continuations() {
        let rule = gcc_output::rule("a.o", "a.c", &["include/util.h"]);
        assert_eq!(rule, "a.o: a.c \\\n include/util.h\n");
    }
}
