//! Project registry types.
//!
//! The registry is the immutable input to generation: the list of build
//! configurations, the list of projects with their directly declared library
//! dependencies, and the toolchain settings rendered into the makefile
//! preamble. It is constructed once per invocation by the manifest loader
//! and never mutated afterwards, so the generation core can be exercised
//! with synthetic registries in tests.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{DEFAULT_COMPILER, DEFAULT_STD_FLAGS, DEFAULT_WARN_FLAGS, LIB_SUFFIX, TEST_SUFFIX};

/// What a project produces.
///
/// Derived from the project name's suffix unless the manifest declares an
/// explicit kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectKind {
  /// Produces a static archive that dependents link against.
  Library,
  /// Produces a binary under the configuration's bin directory.
  Executable,
  /// Produces a binary under the configuration's test bin directory; the
  /// build runs it and records a success marker.
  TestExecutable,
}

impl ProjectKind {
  /// Derive the kind from a project name.
  ///
  /// The test suffix ends with the library suffix, so it must be checked
  /// first: `foo_lib_test` is a test executable, never a library.
  pub fn from_name(name: &str) -> Self {
    if name.ends_with(TEST_SUFFIX) {
      ProjectKind::TestExecutable
    } else if name.ends_with(LIB_SUFFIX) {
      ProjectKind::Library
    } else {
      ProjectKind::Executable
    }
  }
}

/// A named build variant (e.g. `debug`, `release`).
///
/// Every configuration gets its own flag string and fully separate artifact
/// trees, so artifacts from different configurations can never collide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
  pub name: String,
  /// Extra compiler/linker flags for this configuration, e.g. `-g` or `-O3`.
  #[serde(default)]
  pub flags: String,
}

/// A single buildable project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
  /// Unique name, doubling as the source and intermediate directory segment.
  pub name: String,
  /// Directly declared library dependencies, in link order.
  ///
  /// Dependencies are not flattened: a dependency's own required libraries
  /// are never pulled into this project's link step, so the full closure
  /// must be listed here.
  #[serde(default)]
  pub deps: Vec<String>,
  /// Explicit kind, overriding suffix inference.
  #[serde(default)]
  pub kind: Option<ProjectKind>,
}

impl Project {
  pub fn kind(&self) -> ProjectKind {
    self.kind.unwrap_or_else(|| ProjectKind::from_name(&self.name))
  }
}

/// Toolchain settings rendered into the makefile preamble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Toolchain {
  /// Compiler used for both compile and link recipes.
  pub compiler: String,
  /// Language-standard and runtime flags shared by every rule.
  pub std_flags: String,
  pub warn_flags: String,
}

impl Default for Toolchain {
  fn default() -> Self {
    Self {
      compiler: DEFAULT_COMPILER.to_string(),
      std_flags: DEFAULT_STD_FLAGS.to_string(),
      warn_flags: DEFAULT_WARN_FLAGS.to_string(),
    }
  }
}

/// The complete, validated input to generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Registry {
  pub toolchain: Toolchain,
  pub configurations: Vec<Configuration>,
  pub projects: Vec<Project>,
}

/// Errors found while validating a registry.
///
/// Only malformed entries are rejected here. A dependency naming an unknown
/// or non-library project is deliberately *not* an error: it passes through
/// to the emitted makefile as an unresolved reference and surfaces in the
/// external executor (see the emitter's warnings).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
  #[error("project name is empty")]
  EmptyProjectName,

  #[error("configuration name is empty")]
  EmptyConfigurationName,

  #[error("no configurations declared")]
  NoConfigurations,

  #[error("duplicate project name: {0}")]
  DuplicateProject(String),

  #[error("duplicate configuration name: {0}")]
  DuplicateConfiguration(String),

  #[error("project {0} depends on itself")]
  SelfDependency(String),
}

impl Registry {
  /// Look up a project by name.
  pub fn project(&self, name: &str) -> Option<&Project> {
    self.projects.iter().find(|p| p.name == name)
  }

  /// Validate the registry invariants.
  ///
  /// Project names are unique and double as directory segments, so empty
  /// and duplicate names are rejected, as are self-dependencies and an
  /// empty configuration list.
  pub fn validate(&self) -> Result<(), RegistryError> {
    if self.configurations.is_empty() {
      return Err(RegistryError::NoConfigurations);
    }

    let mut config_names = Vec::new();
    for config in &self.configurations {
      if config.name.is_empty() {
        return Err(RegistryError::EmptyConfigurationName);
      }
      if config_names.contains(&config.name.as_str()) {
        return Err(RegistryError::DuplicateConfiguration(config.name.clone()));
      }
      config_names.push(config.name.as_str());
    }

    let mut project_names = Vec::new();
    for project in &self.projects {
      if project.name.is_empty() {
        return Err(RegistryError::EmptyProjectName);
      }
      if project_names.contains(&project.name.as_str()) {
        return Err(RegistryError::DuplicateProject(project.name.clone()));
      }
      project_names.push(project.name.as_str());

      if project.deps.iter().any(|d| *d == project.name) {
        return Err(RegistryError::SelfDependency(project.name.clone()));
      }
    }

    Ok(())
  }
}
