//! The `splm remove` subcommand.

use crate::workflows;
use anyhow::Result;
use clap::Args;
use std::path::Path;

/// Disintegrate one or more feature modules from the project.
#[derive(Args)]
pub struct RemoveCommand {
    /// Module identifiers to remove.
    #[arg(required = true, value_name = "MODULE")]
    modules: Vec<String>,
}

impl RemoveCommand {
    /// Run the REMOVE workflow.
    pub async fn execute(self, project_root: Option<&Path>) -> Result<()> {
        workflows::remove::run(project_root, &self.modules).await
    }
}
