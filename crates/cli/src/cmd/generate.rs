//! Implementation of the `makegen generate` command.
//!
//! This is the default command: it loads the manifest, emits the rule set,
//! checks the rule graph and writes the rendered makefile.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use makegen_lib::emit::generate;
use makegen_lib::graph;
use makegen_lib::manifest::Manifest;

use crate::output::print_success;

/// Execute the generate command.
///
/// Any I/O failure aborts with a non-zero exit; no partial output is
/// promised.
pub fn cmd_generate(manifest_path: &Path, output: &Path) -> Result<()> {
  let registry = Manifest::load(manifest_path)
    .with_context(|| format!("failed to load manifest {}", manifest_path.display()))?;

  let makefile = generate(&registry);
  graph::validate(&makefile).context("emitted rule graph is not executor-safe")?;

  fs::write(output, makefile.render()).with_context(|| format!("failed to write {}", output.display()))?;

  print_success(&format!(
    "wrote {} ({} projects x {} configurations)",
    output.display(),
    registry.projects.len(),
    registry.configurations.len()
  ));

  Ok(())
}
