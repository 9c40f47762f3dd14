//! Rule emission: from [`Registry`] to [`Makefile`].
//!
//! A single deterministic transformation with no intermediate observable
//! state. The emitter walks (configuration × project) once for the build
//! rules, then derives the directory-provisioning rules and the
//! dependency-file aggregation from the same data. Two generations from the
//! same registry produce byte-identical output.

use tracing::warn;

use crate::paths;
use crate::registry::{Configuration, Project, ProjectKind, Registry};
use crate::rules::{AssignOp, Makefile, Rule, Stmt};

/// Generate the complete makefile for a registry.
pub fn generate(registry: &Registry) -> Makefile {
  warn_unresolved_deps(registry);

  let mut mk = Makefile::default();
  prologue(&mut mk, registry);

  for project in &registry.projects {
    project_rules(&mut mk, registry, project);
  }

  directory_rules(&mut mk, registry);
  epilogue(&mut mk);
  mk
}

/// Unresolved dependency names are a latent failure by design: they emit
/// unresolved archive references and surface in the external executor as
/// missing files. Warn once per (project, dependency) so registry authors
/// hear about it at generation time.
fn warn_unresolved_deps(registry: &Registry) {
  for project in &registry.projects {
    for dep in &project.deps {
      match registry.project(dep) {
        None => warn!(
          project = %project.name,
          dep = %dep,
          "dependency does not name a known project"
        ),
        Some(d) if d.kind() != ProjectKind::Library => warn!(
          project = %project.name,
          dep = %dep,
          "dependency is not a library"
        ),
        _ => {}
      }
    }
  }
}

fn config_names(registry: &Registry) -> Vec<String> {
  registry.configurations.iter().map(|c| c.name.clone()).collect()
}

fn cpp_files_var(project: &str) -> String {
  format!("{project}_CPP_FILES")
}

fn obj_files_var(config: &str, project: &str) -> String {
  format!("{config}_{project}_OBJ_FILES")
}

fn config_flags_var(config: &str) -> String {
  format!("{config}_FLAGS")
}

fn prologue(mk: &mut Makefile, registry: &Registry) {
  mk.comment("# Builtin suffix and source-control implicit rules disabled");
  mk.rule(Rule {
    targets: vec![".SUFFIXES".to_string()],
    ..Rule::default()
  });
  for pat in ["%,v", "RCS/%,v", "RCS/%", "s.%", "SCCS/s.%"] {
    mk.rule(Rule {
      targets: vec!["%".to_string()],
      prereqs: vec![pat.to_string()],
      ..Rule::default()
    });
  }
  mk.blank();

  mk.comment("# Tree layout: sources in SRC_DIR/<project>, binaries under BIN_DIR,");
  mk.comment("# objects and dependency files under INT_DIR");
  mk.assign("SRC_DIR", AssignOp::Simple, "src");
  mk.assign("BIN_DIR", AssignOp::Simple, "bin");
  mk.assign("INT_DIR", AssignOp::Simple, "int");
  mk.assign("TMP_DIR", AssignOp::Simple, "tmp");
  mk.blank();

  mk.comment("# DEP_FLAGS records each object's header prerequisites in a dependency");
  mk.comment("# file written by the same compile step");
  mk.assign("CXX", AssignOp::Simple, &registry.toolchain.compiler);
  mk.assign("DEP_FLAGS", AssignOp::Recursive, "-MT $@ -MMD -MP -MF $(@:.o=.d)");
  mk.assign("STD_FLAGS", AssignOp::Simple, &registry.toolchain.std_flags);
  mk.assign("WARN_FLAGS", AssignOp::Simple, &registry.toolchain.warn_flags);
  for config in &registry.configurations {
    mk.assign(&config_flags_var(&config.name), AssignOp::Simple, &config.flags);
  }
  mk.assign("CXXFLAGS", AssignOp::Recursive, "$(STD_FLAGS) $(DEP_FLAGS) $(WARN_FLAGS)");
  mk.assign("LDFLAGS", AssignOp::Recursive, "$(STD_FLAGS) $(WARN_FLAGS)");
  mk.blank();

  let configs = config_names(registry);
  mk.rule(Rule {
    targets: vec![".DEFAULT".to_string()],
    prereqs: vec!["all".to_string()],
    ..Rule::default()
  });
  let mut phony = vec!["all".to_string()];
  phony.extend(configs.clone());
  phony.push("clean".to_string());
  mk.rule(Rule {
    targets: vec![".PHONY".to_string()],
    prereqs: phony,
    ..Rule::default()
  });
  mk.blank();

  mk.rule(Rule {
    targets: vec!["all".to_string()],
    prereqs: configs.clone(),
    ..Rule::default()
  });
  mk.blank();
  mk.rule(Rule {
    targets: configs,
    ..Rule::default()
  });
  mk.blank();
  mk.assign("DEP_FILES", AssignOp::Simple, "");
  mk.blank();
}

fn project_rules(mk: &mut Makefile, registry: &Registry, project: &Project) {
  mk.comment(&format!("# {}", project.name));
  mk.assign(
    &cpp_files_var(&project.name),
    AssignOp::Simple,
    &paths::source_glob(&project.name),
  );
  mk.blank();

  for config in &registry.configurations {
    pair_rules(mk, project, config);
  }
}

/// Rules for one (project, configuration) pair: objects, the kind-specific
/// aggregation rule, the aggregate-goal registration and the dependency-file
/// accumulation.
fn pair_rules(mk: &mut Makefile, project: &Project, config: &Configuration) {
  let name = &project.name;
  let cfg = &config.name;
  let objs = format!("$({})", obj_files_var(cfg, name));
  let flags = format!("$({})", config_flags_var(cfg));

  mk.assign(
    &obj_files_var(cfg, name),
    AssignOp::Simple,
    &format!(
      "$({}:{}/%.cpp={}/{cfg}/%.o)",
      cpp_files_var(name),
      paths::SRC_ROOT,
      paths::INT_ROOT
    ),
  );
  mk.blank();

  // One static-pattern compile rule covers every object resolved from the
  // source wildcard. The dependency file is a required prerequisite here;
  // the empty rule in the epilogue keeps its absence from blocking the
  // first build.
  mk.rule(Rule {
    targets: vec![objs.clone()],
    pattern: Some(paths::object_pattern(cfg, name)),
    prereqs: vec![paths::source_pattern(name), paths::dep_pattern(cfg, name)],
    order_only: vec![paths::object_dir(cfg, name)],
    recipe: vec![format!("$(CXX) $(CXXFLAGS) {flags} -c -o $@ $<")],
    ..Rule::default()
  });
  mk.blank();

  let goal_artifact = match project.kind() {
    ProjectKind::Library => {
      let archive = paths::archive_path(cfg, name);
      mk.rule(Rule {
        targets: vec![archive.clone()],
        prereqs: vec![objs.clone()],
        order_only: vec![paths::config_int_dir(cfg)],
        recipe: vec!["ar rcs $@ $^".to_string()],
        ..Rule::default()
      });
      archive
    }
    ProjectKind::Executable => {
      let binary = paths::binary_path(cfg, name, ProjectKind::Executable);
      let mut inputs = vec![objs.clone()];
      inputs.extend(dep_archives(project, cfg));
      mk.rule(Rule {
        targets: vec![binary.clone()],
        prereqs: inputs,
        order_only: vec![paths::config_bin_dir(cfg)],
        recipe: vec![format!("$(CXX) $(LDFLAGS) {flags} -o $@ $^")],
        ..Rule::default()
      });
      binary
    }
    ProjectKind::TestExecutable => {
      let binary = paths::binary_path(cfg, name, ProjectKind::TestExecutable);
      let mut inputs = vec![objs.clone()];
      inputs.extend(dep_archives(project, cfg));
      mk.rule(Rule {
        targets: vec![binary.clone()],
        prereqs: inputs,
        order_only: vec![paths::config_test_bin_dir(cfg)],
        recipe: vec![format!("$(CXX) $(LDFLAGS) {flags} -o $@ $^")],
        ..Rule::default()
      });
      mk.blank();

      // Running the test and recording the marker is itself a rule, so an
      // untouched tree leaves the marker up to date and the run is skipped.
      let marker = paths::success_marker_path(cfg, name);
      mk.rule(Rule {
        targets: vec![marker.clone()],
        prereqs: vec![binary],
        order_only: vec![paths::object_dir(cfg, name)],
        recipe: vec!["$^".to_string(), "touch $@".to_string()],
        ..Rule::default()
      });
      marker
    }
  };
  mk.blank();

  // Registering the artifact under the configuration goal is what makes
  // `make <config>` build it, and fail when a test does not pass.
  mk.rule(Rule {
    targets: vec![cfg.clone()],
    prereqs: vec![goal_artifact],
    ..Rule::default()
  });
  mk.blank();

  mk.assign(
    "DEP_FILES",
    AssignOp::Append,
    &format!("$({}:.o=.d)", obj_files_var(cfg, name)),
  );
  mk.blank();
}

/// Archives of the directly declared dependencies, in declaration order.
///
/// Deliberately not flattened: a dependency's own libraries never appear
/// here, so the registry must list the full closure.
fn dep_archives(project: &Project, config: &str) -> Vec<String> {
  project.deps.iter().map(|dep| paths::archive_path(config, dep)).collect()
}

/// One creation rule per required directory, prerequisite = parent, all
/// order-only so a directory's timestamp never makes its contents stale.
fn directory_rules(mk: &mut Makefile, registry: &Registry) {
  mk.comment("# Directory provisioning, parent-ordered");
  mk.rule(Rule {
    targets: vec![paths::BIN_ROOT.to_string(), paths::INT_ROOT.to_string()],
    recipe: vec!["mkdir $@".to_string()],
    ..Rule::default()
  });
  mk.blank();

  for config in &registry.configurations {
    let cfg = &config.name;
    mk.rule(Rule {
      targets: vec![paths::config_bin_dir(cfg)],
      order_only: vec![paths::BIN_ROOT.to_string()],
      recipe: vec!["mkdir $@".to_string()],
      ..Rule::default()
    });
    mk.blank();
    // Always provisioned, needed only by test executables.
    mk.rule(Rule {
      targets: vec![paths::config_test_bin_dir(cfg)],
      order_only: vec![paths::config_bin_dir(cfg)],
      recipe: vec!["mkdir $@".to_string()],
      ..Rule::default()
    });
    mk.blank();
    mk.rule(Rule {
      targets: vec![paths::config_int_dir(cfg)],
      order_only: vec![paths::INT_ROOT.to_string()],
      recipe: vec!["mkdir $@".to_string()],
      ..Rule::default()
    });
    mk.blank();

    for project in &registry.projects {
      mk.rule(Rule {
        targets: vec![paths::object_dir(cfg, &project.name)],
        order_only: vec![paths::config_int_dir(cfg)],
        recipe: vec!["mkdir $@".to_string()],
        ..Rule::default()
      });
      mk.blank();
    }
  }
}

fn epilogue(mk: &mut Makefile) {
  mk.rule(Rule {
    targets: vec!["clean".to_string()],
    recipe: vec![format!(
      "rm -rf {} {} $(TMP_DIR)",
      paths::BIN_ROOT,
      paths::INT_ROOT
    )],
    ..Rule::default()
  });
  mk.blank();

  mk.comment("# A missing dependency file is satisfied by the empty recipe; present");
  mk.comment("# ones are folded into the rule graph by the include");
  mk.rule(Rule {
    targets: vec!["$(DEP_FILES)".to_string()],
    pattern: Some(format!("{}/%.d", paths::INT_ROOT)),
    empty_recipe: true,
    ..Rule::default()
  });
  mk.blank();
  mk.statements.push(Stmt::Include {
    files: "$(DEP_FILES)".to_string(),
    optional: true,
  });
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::registry::Toolchain;

  fn config(name: &str, flags: &str) -> Configuration {
    Configuration {
      name: name.to_string(),
      flags: flags.to_string(),
    }
  }

  fn project(name: &str, deps: &[&str]) -> Project {
    Project {
      name: name.to_string(),
      deps: deps.iter().map(|d| d.to_string()).collect(),
      kind: None,
    }
  }

  fn sample_registry() -> Registry {
    Registry {
      toolchain: Toolchain::default(),
      configurations: vec![config("debug", "-g"), config("release", "-O3")],
      projects: vec![
        project("app", &["core_lib"]),
        project("core_lib", &[]),
        project("core_lib_test", &["core_lib"]),
      ],
    }
  }

  /// Rules whose sole target is `target`, counting only those with recipes.
  fn recipe_rules_for<'a>(mk: &'a Makefile, target: &str) -> Vec<&'a Rule> {
    mk.rules()
      .filter(|r| r.has_recipe() && r.targets.len() == 1 && r.targets[0] == target)
      .collect()
  }

  #[test]
  fn end_to_end_executable_links_declared_archive() {
    let registry = Registry {
      toolchain: Toolchain::default(),
      configurations: vec![config("debug", "-g")],
      projects: vec![project("app", &["mylib"]), project("mylib", &[])],
    };
    let mk = generate(&registry);
    let text = mk.render();

    assert!(text.contains(
      "$(BIN_DIR)/debug/app : $(debug_app_OBJ_FILES) $(INT_DIR)/debug/mylib.a | $(BIN_DIR)/debug\n\
       \t$(CXX) $(LDFLAGS) $(debug_FLAGS) -o $@ $^\n"
    ));
    assert!(text.contains(
      "$(INT_DIR)/debug/mylib.a : $(debug_mylib_OBJ_FILES) | $(INT_DIR)/debug\n\tar rcs $@ $^\n"
    ));
    assert!(text.contains("$(BIN_DIR)/debug : | $(BIN_DIR)\n\tmkdir $@\n"));
    assert!(text.contains("$(INT_DIR)/debug : | $(INT_DIR)\n\tmkdir $@\n"));
    assert!(text.contains("$(INT_DIR)/debug/app : | $(INT_DIR)/debug\n\tmkdir $@\n"));
    assert!(text.contains("$(INT_DIR)/debug/mylib : | $(INT_DIR)/debug\n\tmkdir $@\n"));
  }

  #[test]
  fn exactly_one_creation_rule_per_intermediate_directory() {
    let registry = sample_registry();
    let mk = generate(&registry);

    for cfg in ["debug", "release"] {
      for p in ["app", "core_lib", "core_lib_test"] {
        let dir = paths::object_dir(cfg, p);
        let rules = recipe_rules_for(&mk, &dir);
        assert_eq!(rules.len(), 1, "one creation rule for {dir}");
        assert_eq!(rules[0].order_only, vec![paths::config_int_dir(cfg)]);
        assert_eq!(rules[0].recipe, vec!["mkdir $@"]);
        assert!(rules[0].prereqs.is_empty());
      }
    }
  }

  #[test]
  fn archive_targets_are_unique_and_depend_only_on_own_objects() {
    let registry = sample_registry();
    let mk = generate(&registry);

    let archives: Vec<&Rule> = mk
      .rules()
      .filter(|r| r.has_recipe() && r.recipe == vec!["ar rcs $@ $^"])
      .collect();
    assert_eq!(archives.len(), 2); // core_lib × {debug, release}

    let mut targets: Vec<&String> = archives.iter().map(|r| &r.targets[0]).collect();
    targets.dedup();
    assert_eq!(targets.len(), 2);

    for rule in archives {
      assert_eq!(rule.prereqs.len(), 1);
      assert!(rule.prereqs[0].contains("core_lib_OBJ_FILES"));
    }
  }

  #[test]
  fn test_marker_rule_runs_the_binary_then_records_success() {
    let registry = sample_registry();
    let mk = generate(&registry);

    let marker = paths::success_marker_path("debug", "core_lib_test");
    let rules = recipe_rules_for(&mk, &marker);
    assert_eq!(rules.len(), 1);

    let rule = rules[0];
    assert_eq!(
      rule.prereqs,
      vec![paths::binary_path("debug", "core_lib_test", ProjectKind::TestExecutable)]
    );
    assert_eq!(rule.recipe, vec!["$^", "touch $@"]);
    assert!(marker.starts_with(&paths::object_dir("debug", "core_lib_test")));

    // The marker, not the binary, is what the configuration goal requires.
    let registered = mk
      .rules()
      .any(|r| r.targets == vec!["debug".to_string()] && r.prereqs == vec![marker.clone()]);
    assert!(registered);
  }

  #[test]
  fn test_binary_lands_under_the_test_subdirectory() {
    let registry = sample_registry();
    let mk = generate(&registry);
    let text = mk.render();

    assert!(text.contains(
      "$(BIN_DIR)/debug/test/core_lib_test : $(debug_core_lib_test_OBJ_FILES) \
       $(INT_DIR)/debug/core_lib.a | $(BIN_DIR)/debug/test\n"
    ));
    assert!(text.contains("$(BIN_DIR)/debug/test : | $(BIN_DIR)/debug\n\tmkdir $@\n"));
  }

  #[test]
  fn link_does_not_flatten_transitive_deps() {
    // b_lib depends on a_lib; app declares only b_lib. The link rule for
    // app must name b_lib's archive and must not pull in a_lib's.
    let registry = Registry {
      toolchain: Toolchain::default(),
      configurations: vec![config("debug", "-g")],
      projects: vec![
        project("app", &["b_lib"]),
        project("b_lib", &["a_lib"]),
        project("a_lib", &[]),
      ],
    };
    let mk = generate(&registry);

    let binary = paths::binary_path("debug", "app", ProjectKind::Executable);
    let rules = recipe_rules_for(&mk, &binary);
    assert_eq!(rules.len(), 1);
    assert!(rules[0].prereqs.contains(&paths::archive_path("debug", "b_lib")));
    assert!(!rules[0].prereqs.contains(&paths::archive_path("debug", "a_lib")));
  }

  #[test]
  fn unknown_dependency_still_emits_the_archive_reference() {
    let registry = Registry {
      toolchain: Toolchain::default(),
      configurations: vec![config("debug", "")],
      projects: vec![project("app", &["no_such_lib"])],
    };
    let mk = generate(&registry);

    let binary = paths::binary_path("debug", "app", ProjectKind::Executable);
    let rules = recipe_rules_for(&mk, &binary);
    assert!(rules[0].prereqs.contains(&paths::archive_path("debug", "no_such_lib")));
  }

  #[test]
  fn compile_rule_requires_source_and_dependency_file() {
    let registry = sample_registry();
    let mk = generate(&registry);

    let objs = "$(debug_app_OBJ_FILES)".to_string();
    let rule = mk.rules().find(|r| r.targets == vec![objs.clone()]).unwrap();
    assert_eq!(rule.pattern, Some(paths::object_pattern("debug", "app")));
    assert_eq!(
      rule.prereqs,
      vec![paths::source_pattern("app"), paths::dep_pattern("debug", "app")]
    );
    assert_eq!(rule.order_only, vec![paths::object_dir("debug", "app")]);
  }

  #[test]
  fn dependency_files_are_accumulated_and_included_tolerantly() {
    let registry = sample_registry();
    let text = generate(&registry).render();

    assert!(text.contains("DEP_FILES += $(debug_app_OBJ_FILES:.o=.d)"));
    assert!(text.contains("DEP_FILES += $(release_core_lib_OBJ_FILES:.o=.d)"));
    assert!(text.contains("$(DEP_FILES) : $(INT_DIR)/%.d : ;"));
    assert!(text.contains("-include $(DEP_FILES)"));
  }

  #[test]
  fn aggregate_goals_cover_every_configuration() {
    let registry = sample_registry();
    let text = generate(&registry).render();

    assert!(text.contains("all : debug release\n"));
    assert!(text.contains(".PHONY : all debug release clean\n"));
    assert!(text.contains("clean :\n\trm -rf $(BIN_DIR) $(INT_DIR) $(TMP_DIR)\n"));
  }

  #[test]
  fn toolchain_settings_reach_the_preamble() {
    let registry = Registry {
      toolchain: Toolchain {
        compiler: "clang++".to_string(),
        ..Toolchain::default()
      },
      configurations: vec![config("debug", "-g")],
      projects: vec![],
    };
    let text = generate(&registry).render();

    assert!(text.contains("CXX := clang++\n"));
    assert!(text.contains("debug_FLAGS := -g\n"));
    assert!(text.contains("CXXFLAGS = $(STD_FLAGS) $(DEP_FLAGS) $(WARN_FLAGS)\n"));
  }

  #[test]
  fn generation_is_deterministic() {
    let registry = sample_registry();
    assert_eq!(generate(&registry).render(), generate(&registry).render());
  }
}
