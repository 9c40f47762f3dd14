//! Manifest loading.
//!
//! The manifest is the declarative TOML file the user maintains; loading it
//! produces the validated [`Registry`] the generation core consumes. The
//! core itself never touches the filesystem, so everything fallible about
//! input handling lives here.
//!
//! ```toml
//! [toolchain]           # optional, sensible defaults
//! compiler = "g++"
//!
//! [[configuration]]
//! name = "debug"
//! flags = "-g"
//!
//! [[project]]
//! name = "fibonacci"
//! deps = ["fibonacci_lib"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::registry::{Configuration, Project, Registry, RegistryError, Toolchain};

/// Errors that can occur while loading a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
  #[error("failed to read manifest {}: {source}", path.display())]
  Read { path: PathBuf, source: std::io::Error },

  #[error("failed to parse manifest {}: {source}", path.display())]
  Parse { path: PathBuf, source: toml::de::Error },

  #[error("invalid manifest: {0}")]
  Invalid(#[from] RegistryError),
}

/// The on-disk manifest schema.
///
/// Field names follow TOML array-of-tables convention (`[[project]]`,
/// `[[configuration]]`); the loaded data is handed over to [`Registry`]
/// unchanged apart from validation.
#[derive(Debug, Default, Deserialize)]
pub struct Manifest {
  #[serde(default)]
  pub toolchain: Toolchain,
  #[serde(rename = "configuration", default)]
  pub configurations: Vec<Configuration>,
  #[serde(rename = "project", default)]
  pub projects: Vec<Project>,
}

impl Manifest {
  /// Load and validate a manifest file, producing the registry.
  pub fn load(path: &Path) -> Result<Registry, ManifestError> {
    let text = fs::read_to_string(path).map_err(|e| ManifestError::Read {
      path: path.to_path_buf(),
      source: e,
    })?;

    let manifest: Manifest = toml::from_str(&text).map_err(|e| ManifestError::Parse {
      path: path.to_path_buf(),
      source: e,
    })?;

    let registry = Registry {
      toolchain: manifest.toolchain,
      configurations: manifest.configurations,
      projects: manifest.projects,
    };
    registry.validate()?;

    debug!(
      path = %path.display(),
      configurations = registry.configurations.len(),
      projects = registry.projects.len(),
      "loaded manifest"
    );

    Ok(registry)
  }
}
