//! The `splm generate` subcommand.

use crate::workflows::{self, generate::GenerateOptions};
use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};

/// Derive a product from a product specification.
///
/// Version skew between the specification and the manifest is reconciled
/// before the engine runs and rolled back afterwards; `--no-sync` turns
/// any skew into a hard error instead. Relative paths are interpreted
/// against the project root.
#[derive(Args)]
pub struct GenerateCommand {
    /// Product specification file (JSON).
    #[arg(value_name = "PRODUCT")]
    product: PathBuf,

    /// Output directory for the derived product.
    #[arg(short, long, default_value = "output", value_name = "DIR")]
    output: PathBuf,

    /// Scratch directory used by the engine.
    #[arg(long, default_value = "tmp", value_name = "DIR")]
    tmp: PathBuf,

    /// Fail on version skew instead of reconciling it.
    #[arg(long)]
    no_sync: bool,
}

impl GenerateCommand {
    /// Run the GENERATE workflow.
    pub async fn execute(self, project_root: Option<&Path>) -> Result<()> {
        let opts = GenerateOptions {
            product: self.product,
            output: self.output,
            tmp: self.tmp,
            sync: !self.no_sync,
        };
        workflows::generate::run(project_root, &opts).await
    }
}
