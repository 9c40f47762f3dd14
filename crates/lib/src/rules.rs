//! Structured makefile representation.
//!
//! The emitter builds a [`Makefile`], an ordered list of statements,
//! instead of writing text directly. Keeping the rule graph as data lets the
//! graph checks run before anything is rendered; the renderer is a separate,
//! purely textual pass with no knowledge of what the rules mean.

use std::fmt;

/// Assignment operators recognized by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
  /// `:=`, expanded once at definition.
  Simple,
  /// `=`, re-expanded at every use. Required for values containing
  /// automatic variables like `$@`.
  Recursive,
  /// `+=`, append.
  Append,
}

impl AssignOp {
  fn as_str(self) -> &'static str {
    match self {
      AssignOp::Simple => ":=",
      AssignOp::Recursive => "=",
      AssignOp::Append => "+=",
    }
  }
}

/// A single rule.
///
/// `pattern` turns the rule into a static pattern rule
/// (`targets : pattern : prereqs`). `order_only` prerequisites are rendered
/// after `|`: they must exist before the rule runs but their timestamps
/// never make the targets stale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rule {
  pub targets: Vec<String>,
  pub pattern: Option<String>,
  pub prereqs: Vec<String>,
  pub order_only: Vec<String>,
  pub recipe: Vec<String>,
  /// Render an explicit empty recipe (`target : ;`). Distinct from having
  /// no recipe at all: an empty recipe satisfies the target without
  /// running anything, which is how missing dependency files are tolerated.
  pub empty_recipe: bool,
}

impl Rule {
  /// Whether any target contains a `%` pattern stem.
  pub fn is_pattern(&self) -> bool {
    self.pattern.is_some() || self.targets.iter().any(|t| t.contains('%'))
  }

  /// Whether the rule writes its targets (has a recipe that does work).
  pub fn has_recipe(&self) -> bool {
    !self.recipe.is_empty()
  }
}

/// One element of the rendered makefile, in emission order.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
  /// A comment line, rendered verbatim (the text carries its own `#`).
  Comment(String),
  Blank,
  Assign { name: String, op: AssignOp, value: String },
  Rule(Rule),
  /// `include` directive; `optional` renders the `-include` form that
  /// tolerates missing files.
  Include { files: String, optional: bool },
}

/// The complete generated makefile.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Makefile {
  pub statements: Vec<Stmt>,
}

impl Makefile {
  pub fn comment(&mut self, text: &str) {
    self.statements.push(Stmt::Comment(text.to_string()));
  }

  pub fn blank(&mut self) {
    self.statements.push(Stmt::Blank);
  }

  pub fn assign(&mut self, name: &str, op: AssignOp, value: &str) {
    self.statements.push(Stmt::Assign {
      name: name.to_string(),
      op,
      value: value.to_string(),
    });
  }

  pub fn rule(&mut self, rule: Rule) {
    self.statements.push(Stmt::Rule(rule));
  }

  /// All rules, in emission order.
  pub fn rules(&self) -> impl Iterator<Item = &Rule> {
    self.statements.iter().filter_map(|stmt| match stmt {
      Stmt::Rule(rule) => Some(rule),
      _ => None,
    })
  }

  /// Render to makefile text.
  pub fn render(&self) -> String {
    self.to_string()
  }
}

impl fmt::Display for Makefile {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for stmt in &self.statements {
      match stmt {
        Stmt::Comment(text) => writeln!(f, "{text}")?,
        Stmt::Blank => writeln!(f)?,
        Stmt::Assign { name, op, value } => {
          if value.is_empty() {
            writeln!(f, "{name} {}", op.as_str())?;
          } else {
            writeln!(f, "{name} {} {value}", op.as_str())?;
          }
        }
        Stmt::Rule(rule) => write!(f, "{rule}")?,
        Stmt::Include { files, optional } => {
          let directive = if *optional { "-include" } else { "include" };
          writeln!(f, "{directive} {files}")?;
        }
      }
    }
    Ok(())
  }
}

impl fmt::Display for Rule {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} :", self.targets.join(" "))?;
    if let Some(pattern) = &self.pattern {
      write!(f, " {pattern} :")?;
    }
    if !self.prereqs.is_empty() {
      write!(f, " {}", self.prereqs.join(" "))?;
    }
    if !self.order_only.is_empty() {
      write!(f, " | {}", self.order_only.join(" "))?;
    }
    if self.empty_recipe {
      write!(f, " ;")?;
    }
    writeln!(f)?;
    for line in &self.recipe {
      writeln!(f, "\t{line}")?;
    }
    Ok(())
  }
}
