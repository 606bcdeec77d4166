//! Output directory layout and artifact naming.

use std::fs;
use std::path::{Path, PathBuf};

use crate::builder::error::BuildError;

/// Default object directory, relative to the project root.
pub const OBJ_DIR: &str = "obj";

/// Default binary directory, relative to the project root.
pub const BIN_DIR: &str = "bin";

/// Where object files and the final executable are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    pub obj_dir: PathBuf,
    pub bin_dir: PathBuf,
}

impl OutputLayout {
    /// The default `obj/` + `bin/` layout under a project root.
    pub fn new(root: &Path) -> Self {
        OutputLayout {
            obj_dir: root.join(OBJ_DIR),
            bin_dir: root.join(BIN_DIR),
        }
    }

    /// Apply optional overrides, resolving relative paths against `root`.
    pub fn with_overrides(
        mut self,
        root: &Path,
        obj_dir: Option<&Path>,
        bin_dir: Option<&Path>,
    ) -> Self {
        if let Some(dir) = obj_dir {
            self.obj_dir = root.join(dir);
        }
        if let Some(dir) = bin_dir {
            self.bin_dir = root.join(dir);
        }
        self
    }

    /// Create both directories. Idempotent.
    pub fn ensure(&self) -> Result<(), BuildError> {
        for dir in [&self.obj_dir, &self.bin_dir] {
            fs::create_dir_all(dir).map_err(|source| BuildError::Io {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Object path for a source: `<obj_dir>/<stem>.<ext>`.
    pub fn object_path(&self, source: &Path, extension: &str) -> PathBuf {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| source.to_string_lossy().into_owned());
        self.obj_dir.join(format!("{}.{}", stem, extension))
    }

    /// Final executable path: `<bin_dir>/<name><suffix>`.
    pub fn binary_path(&self, name: &str, exe_suffix: &str) -> PathBuf {
        self.bin_dir.join(format!("{}{}", name, exe_suffix))
    }

    /// Map every source to its object path, rejecting collisions.
    ///
    /// The result has exactly one entry per source, in source order.
    pub fn object_paths(
        &self,
        sources: &[PathBuf],
        extension: &str,
    ) -> Result<Vec<PathBuf>, BuildError> {
        let mut objects: Vec<PathBuf> = Vec::with_capacity(sources.len());

        for source in sources {
            let object = self.object_path(source, extension);
            if let Some(index) = objects.iter().position(|o| *o == object) {
                return Err(BuildError::ObjectCollision {
                    first: sources[index].clone(),
                    second: source.clone(),
                    object,
                });
            }
            objects.push(object);
        }

        Ok(objects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_object_path_uses_stem() {
        let layout = OutputLayout::new(Path::new("/proj"));
        assert_eq!(
            layout.object_path(Path::new("/proj/src/main.cpp"), "o"),
            PathBuf::from("/proj/obj/main.o")
        );
    }

    #[test]
    fn test_binary_path() {
        let layout = OutputLayout::new(Path::new("/proj"));
        assert_eq!(layout.binary_path("app", ""), PathBuf::from("/proj/bin/app"));
        assert_eq!(layout.binary_path("app", ".exe"), PathBuf::from("/proj/bin/app.exe"));
    }

    #[test]
    fn test_overrides_are_relative_to_root() {
        let root = Path::new("/proj");
        let layout = OutputLayout::new(root).with_overrides(
            root,
            Some(Path::new("build/obj")),
            None,
        );
        assert_eq!(layout.obj_dir, PathBuf::from("/proj/build/obj"));
        assert_eq!(layout.bin_dir, PathBuf::from("/proj/bin"));
    }

    #[test]
    fn test_object_paths_detect_collisions() {
        let layout = OutputLayout::new(Path::new("/proj"));
        let sources = vec![
            PathBuf::from("/proj/src/net/util.c"),
            PathBuf::from("/proj/src/main.c"),
            PathBuf::from("/proj/src/fs/util.c"),
        ];

        let err = layout.object_paths(&sources, "o").unwrap_err();
        match err {
            BuildError::ObjectCollision { first, second, .. } => {
                assert_eq!(first, sources[0]);
                assert_eq!(second, sources[2]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_ensure_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let layout = OutputLayout::new(tmp.path());
        layout.ensure().unwrap();
        layout.ensure().unwrap();
        assert!(layout.obj_dir.is_dir());
        assert!(layout.bin_dir.is_dir());
    }
}
