//! Artifact path derivation.
//!
//! Pure functions mapping (configuration, project) to the paths the emitted
//! rules read and write. All paths are partitioned first by configuration,
//! then by project, so distinct (project, configuration, role) triples can
//! never collide.
//!
//! Paths here are make-syntax strings rooted at the `SRC_DIR`/`BIN_DIR`/
//! `INT_DIR` variables, not `PathBuf`s: they address the executor's
//! namespace and are resolved at build time, never by the generator.

use crate::registry::ProjectKind;

/// Make-variable roots emitted into the preamble.
pub const SRC_ROOT: &str = "$(SRC_DIR)";
pub const BIN_ROOT: &str = "$(BIN_DIR)";
pub const INT_ROOT: &str = "$(INT_DIR)";

/// Wildcard expression handing source discovery to the executor.
pub fn source_glob(project: &str) -> String {
  format!("$(wildcard {SRC_ROOT}/{project}/*.cpp)")
}

/// Source side of the compile static-pattern rule.
pub fn source_pattern(project: &str) -> String {
  format!("{SRC_ROOT}/{project}/%.cpp")
}

/// Intermediate directory holding a project's objects for a configuration.
pub fn object_dir(config: &str, project: &str) -> String {
  format!("{INT_ROOT}/{config}/{project}")
}

/// Object side of the compile static-pattern rule.
pub fn object_pattern(config: &str, project: &str) -> String {
  format!("{}/%.o", object_dir(config, project))
}

/// Dependency-file side of the compile static-pattern rule.
pub fn dep_pattern(config: &str, project: &str) -> String {
  format!("{}/%.d", object_dir(config, project))
}

/// Object path for a single source file, given its path relative to the
/// source root (e.g. `core_lib/algo.cpp`). Mirrors the substitution the
/// emitted `OBJ_FILES` variables perform: the source extension is replaced
/// by `.o` under the configuration's intermediate tree.
pub fn object_path(config: &str, source_rel: &str) -> String {
  let stem = source_rel.strip_suffix(".cpp").unwrap_or(source_rel);
  format!("{INT_ROOT}/{config}/{stem}.o")
}

/// Incremental-dependency file recorded next to an object file.
pub fn dep_file_path(config: &str, source_rel: &str) -> String {
  let stem = source_rel.strip_suffix(".cpp").unwrap_or(source_rel);
  format!("{INT_ROOT}/{config}/{stem}.d")
}

/// Archive produced by a library project.
pub fn archive_path(config: &str, project: &str) -> String {
  format!("{INT_ROOT}/{config}/{project}.a")
}

/// Linked binary. Test executables land under the configuration's `test`
/// subdirectory, everything else directly under the configuration's bin
/// directory.
pub fn binary_path(config: &str, project: &str, kind: ProjectKind) -> String {
  match kind {
    ProjectKind::TestExecutable => format!("{BIN_ROOT}/{config}/test/{project}"),
    _ => format!("{BIN_ROOT}/{config}/{project}"),
  }
}

/// Marker recording that a test binary's last run succeeded. Lives in the
/// project's intermediate directory so `clean` removes it with everything
/// else.
pub fn success_marker_path(config: &str, project: &str) -> String {
  format!("{}/success.run", object_dir(config, project))
}

/// Per-configuration bin directory.
pub fn config_bin_dir(config: &str) -> String {
  format!("{BIN_ROOT}/{config}")
}

/// Per-configuration test bin directory.
pub fn config_test_bin_dir(config: &str) -> String {
  format!("{BIN_ROOT}/{config}/test")
}

/// Per-configuration intermediate root.
pub fn config_int_dir(config: &str) -> String {
  format!("{INT_ROOT}/{config}")
}
