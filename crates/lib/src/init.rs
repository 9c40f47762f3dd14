//! Scaffold a starter manifest for the `makegen init` command.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::consts::DEFAULT_MANIFEST;

/// Starter manifest written by [`scaffold`].
pub const MANIFEST_TEMPLATE: &str = r#"# makegen manifest
#
# Projects are classified by name suffix: `*_lib` builds an archive,
# `*_lib_test` builds a test binary that the build runs, anything else
# builds a plain executable. `deps` lists the libraries a project links
# against; dependencies are not flattened, so list the full closure.

[[configuration]]
name = "debug"
flags = "-g"

[[configuration]]
name = "release"
flags = "-O3"

[[project]]
name = "app"
deps = ["core_lib"]

[[project]]
name = "core_lib"

[[project]]
name = "core_lib_test"
deps = ["core_lib"]
"#;

/// Errors that can occur during scaffolding.
#[derive(Debug, Error)]
pub enum InitError {
  #[error("manifest already exists: {}", path.display())]
  PathExists { path: PathBuf },

  #[error("failed to create directory {}: {source}", path.display())]
  CreateDir { path: PathBuf, source: std::io::Error },

  #[error("failed to write manifest {}: {source}", path.display())]
  WriteFile { path: PathBuf, source: std::io::Error },
}

/// Write a starter manifest into `dir`, refusing to overwrite one.
///
/// Returns the path of the created manifest.
pub fn scaffold(dir: &Path) -> Result<PathBuf, InitError> {
  fs::create_dir_all(dir).map_err(|e| InitError::CreateDir {
    path: dir.to_path_buf(),
    source: e,
  })?;

  let manifest_path = dir.join(DEFAULT_MANIFEST);
  if manifest_path.exists() {
    return Err(InitError::PathExists { path: manifest_path });
  }

  fs::write(&manifest_path, MANIFEST_TEMPLATE).map_err(|e| InitError::WriteFile {
    path: manifest_path.clone(),
    source: e,
  })?;

  Ok(manifest_path)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::manifest::Manifest;
  use tempfile::TempDir;

  #[test]
  fn scaffold_writes_a_loadable_manifest() {
    let temp = TempDir::new().unwrap();
    let path = scaffold(temp.path()).unwrap();

    assert!(path.exists());
    let registry = Manifest::load(&path).unwrap();
    assert_eq!(registry.configurations.len(), 2);
    assert_eq!(registry.projects.len(), 3);
    assert_eq!(registry.validate(), Ok(()));
  }

  #[test]
  fn scaffold_refuses_to_overwrite() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(DEFAULT_MANIFEST), "# existing").unwrap();

    let err = scaffold(temp.path()).unwrap_err();
    assert!(matches!(err, InitError::PathExists { .. }));
  }

  #[test]
  fn scaffold_creates_missing_directories() {
    let temp = TempDir::new().unwrap();
    let nested = temp.path().join("a").join("b");
    let path = scaffold(&nested).unwrap();
    assert!(path.exists());
  }
}
