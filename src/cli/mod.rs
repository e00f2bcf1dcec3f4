//! Command-line interface for SPLM.
//!
//! The CLI is a thin shell: argument parsing and logging setup live here,
//! all behavior lives in [`crate::workflows`]. Each subcommand module
//! declares its clap arguments and delegates to the matching workflow.

mod add;
mod generate;
mod modify;
mod remove;

pub use add::AddCommand;
pub use generate::GenerateCommand;
pub use modify::ModifyCommand;
pub use remove::RemoveCommand;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Top-level SPLM command-line interface.
///
/// Global flags apply to every subcommand: `--project-root` pins the
/// project instead of walking up from the current directory, and
/// `--verbose`/`--quiet` control log output.
#[derive(Parser)]
#[command(
    name = "splm",
    about = "SPL module manager - integrate feature modules into an SPL project",
    version,
    author
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output (equivalent to RUST_LOG=debug).
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress everything except warnings and errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Project root directory. By default the project is located by
    /// walking up from the current directory.
    #[arg(long, global = true, value_name = "DIR")]
    project_root: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Integrate feature modules into the project
    Add(AddCommand),
    /// Disintegrate feature modules from the project
    Remove(RemoveCommand),
    /// Change the installed version of an integrated module
    Modify(ModifyCommand),
    /// Derive a product with the external derivation engine
    Generate(GenerateCommand),
}

impl Cli {
    /// Initialize logging and run the selected subcommand.
    pub async fn execute(self) -> Result<()> {
        self.init_logging();

        let root = self.project_root.as_deref();
        match self.command {
            Commands::Add(cmd) => cmd.execute(root).await,
            Commands::Remove(cmd) => cmd.execute(root).await,
            Commands::Modify(cmd) => cmd.execute(root).await,
            Commands::Generate(cmd) => cmd.execute(root).await,
        }
    }

    /// Flag-derived default filter; an explicit `RUST_LOG` wins.
    fn init_logging(&self) {
        let default_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        };
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("splm={default_level}")));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .without_time()
            .with_writer(std::io::stderr)
            .try_init();
    }
}
