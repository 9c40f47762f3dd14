//! Implementation of the `makegen init` command.

use std::path::Path;

use anyhow::{Context, Result};

use makegen_lib::init::scaffold;

use crate::output::{print_info, print_success};

/// Execute the init command.
///
/// Scaffolds a starter manifest in the given directory; refuses to
/// overwrite an existing one.
pub fn cmd_init(path: &Path) -> Result<()> {
  let manifest = scaffold(path).context("failed to initialize manifest")?;

  print_success(&format!("created {}", manifest.display()));
  print_info("edit it, then run: makegen");

  Ok(())
}
