//! Implementation of the `makegen check` command.
//!
//! Loads the manifest and runs the full generation pipeline including the
//! rule-graph checks, but writes nothing; prints a summary of what would be
//! emitted.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use makegen_lib::emit::generate;
use makegen_lib::graph;
use makegen_lib::manifest::Manifest;
use makegen_lib::registry::{ProjectKind, Registry};

use crate::output::{OutputFormat, print_json, print_stat, print_success};

/// Summary of a checked manifest.
#[derive(Debug, Serialize)]
struct Summary {
  configurations: usize,
  projects: usize,
  libraries: usize,
  executables: usize,
  tests: usize,
  rules: usize,
}

impl Summary {
  fn new(registry: &Registry, rules: usize) -> Self {
    let count = |kind: ProjectKind| registry.projects.iter().filter(|p| p.kind() == kind).count();
    Self {
      configurations: registry.configurations.len(),
      projects: registry.projects.len(),
      libraries: count(ProjectKind::Library),
      executables: count(ProjectKind::Executable),
      tests: count(ProjectKind::TestExecutable),
      rules,
    }
  }
}

/// Execute the check command.
pub fn cmd_check(manifest_path: &Path, format: OutputFormat) -> Result<()> {
  let registry = Manifest::load(manifest_path)
    .with_context(|| format!("failed to load manifest {}", manifest_path.display()))?;

  let makefile = generate(&registry);
  graph::validate(&makefile).context("emitted rule graph is not executor-safe")?;

  let summary = Summary::new(&registry, makefile.rules().count());

  if format.is_json() {
    print_json(&summary)?;
  } else {
    print_success(&format!("{} is valid", manifest_path.display()));
    print_stat("configurations", &summary.configurations.to_string());
    print_stat("projects", &summary.projects.to_string());
    print_stat("libraries", &summary.libraries.to_string());
    print_stat("executables", &summary.executables.to_string());
    print_stat("tests", &summary.tests.to_string());
    print_stat("rules", &summary.rules.to_string());
  }

  Ok(())
}
