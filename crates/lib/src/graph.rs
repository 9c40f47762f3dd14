//! Rule-graph validation.
//!
//! The emitted rule set must be safe for a parallel build executor: no
//! target written by more than one recipe, and no dependency cycles. Both
//! properties are checked on the structured rules before rendering, so an
//! emitter regression fails generation instead of producing a makefile that
//! only misbehaves under `make -j`.

use std::collections::{HashMap, HashSet};

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use thiserror::Error;

use crate::rules::Makefile;

/// Findings from rule-graph validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
  /// Two rules with recipes write the same target; a parallel executor
  /// could run both at once.
  #[error("target {0} is written by more than one rule")]
  DuplicateRecipe(String),

  /// The prerequisite graph is not acyclic.
  #[error("dependency cycle through {0}")]
  Cycle(String),
}

/// Pattern stems and the special dot-targets (.PHONY, .SUFFIXES, ...) are
/// not concrete build outputs and stay out of the graph.
fn tracked(target: &str) -> bool {
  !target.contains('%') && !target.starts_with('.')
}

/// Check that the rule set is parallel-executor-safe.
pub fn validate(makefile: &Makefile) -> Result<(), GraphError> {
  let mut writers: HashSet<&str> = HashSet::new();
  for rule in makefile.rules() {
    if !rule.has_recipe() {
      continue;
    }
    for target in rule.targets.iter().filter(|t| tracked(t)) {
      if !writers.insert(target) {
        return Err(GraphError::DuplicateRecipe(target.clone()));
      }
    }
  }

  // Required and order-only prerequisites both constrain scheduling, so
  // both contribute edges (prerequisite -> target).
  let mut graph: DiGraph<String, ()> = DiGraph::new();
  let mut nodes: HashMap<String, NodeIndex> = HashMap::new();

  for rule in makefile.rules() {
    for target in rule.targets.iter().filter(|t| tracked(t)) {
      let target_idx = intern(&mut graph, &mut nodes, target);
      let prereqs = rule.prereqs.iter().chain(rule.order_only.iter());
      for prereq in prereqs.filter(|p| tracked(p)) {
        let prereq_idx = intern(&mut graph, &mut nodes, prereq);
        graph.add_edge(prereq_idx, target_idx, ());
      }
    }
  }

  toposort(&graph, None)
    .map(|_| ())
    .map_err(|cycle| GraphError::Cycle(graph[cycle.node_id()].clone()))
}

fn intern(graph: &mut DiGraph<String, ()>, nodes: &mut HashMap<String, NodeIndex>, name: &str) -> NodeIndex {
  match nodes.get(name) {
    Some(&idx) => idx,
    None => {
      let idx = graph.add_node(name.to_string());
      nodes.insert(name.to_string(), idx);
      idx
    }
  }
}
