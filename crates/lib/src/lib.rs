//! makegen-lib: core generation logic for makegen
//!
//! This crate maps a declarative project registry to a complete makefile:
//! - `registry`: projects, configurations and the derived project kinds
//! - `manifest`: the TOML loader that produces a validated [`registry::Registry`]
//! - `paths`: pure artifact-path derivation, partitioned by configuration
//! - `rules`: the structured makefile representation and its text renderer
//! - `emit`: the registry-to-rules transformation itself
//! - `graph`: parallel-safety checks (acyclicity, unique recipe targets)
//! - `init`: starter-manifest scaffolding for the CLI

pub mod consts;
pub mod emit;
pub mod graph;
pub mod init;
pub mod manifest;
pub mod paths;
pub mod registry;
pub mod rules;
