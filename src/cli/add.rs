//! The `splm add` subcommand.

use crate::workflows;
use anyhow::Result;
use clap::Args;
use std::path::Path;

/// Integrate one or more feature modules into the project.
///
/// Each identifier may be a plain or scoped package name, a versioned
/// name (`name@version` or `name:version`), a local path (`file:...`) or
/// a git URL (`git+...`).
#[derive(Args)]
pub struct AddCommand {
    /// Module identifiers to integrate.
    #[arg(required = true, value_name = "MODULE")]
    modules: Vec<String>,
}

impl AddCommand {
    /// Run the ADD workflow.
    pub async fn execute(self, project_root: Option<&Path>) -> Result<()> {
        workflows::add::run(project_root, &self.modules).await
    }
}
