use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd;
mod output;

use makegen_lib::consts::{DEFAULT_MANIFEST, DEFAULT_OUTPUT};

use crate::cmd::{cmd_check, cmd_generate, cmd_init};
use crate::output::OutputFormat;

/// makegen - declarative makefile generator
#[derive(Parser)]
#[command(name = "makegen")]
#[command(author, version, about, long_about = None)]
struct Cli {
  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Generate the makefile from a manifest
  Generate {
    /// Path to the manifest
    #[arg(short, long, default_value = DEFAULT_MANIFEST)]
    manifest: PathBuf,

    /// Where to write the generated makefile
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,
  },

  /// Load the manifest and check the emitted rule graph without writing
  Check {
    /// Path to the manifest
    #[arg(short, long, default_value = DEFAULT_MANIFEST)]
    manifest: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
  },

  /// Scaffold a starter manifest
  Init {
    /// Directory to initialize
    #[arg(default_value = ".")]
    path: PathBuf,
  },
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .without_time()
    .init();

  let cli = Cli::parse();

  // Invoked bare, the tool generates with defaults.
  let command = cli.command.unwrap_or(Commands::Generate {
    manifest: PathBuf::from(DEFAULT_MANIFEST),
    output: PathBuf::from(DEFAULT_OUTPUT),
  });

  match command {
    Commands::Generate { manifest, output } => cmd_generate(&manifest, &output),
    Commands::Check { manifest, format } => cmd_check(&manifest, format),
    Commands::Init { path } => cmd_init(&path),
  }
}
