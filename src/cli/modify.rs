//! The `splm modify` subcommand.

use crate::workflows;
use anyhow::Result;
use clap::Args;
use std::path::Path;

/// Change the declared version of an already-integrated module.
///
/// If the package manager fails to install the new version, the manifest
/// and `node_modules` are restored to their previous state.
#[derive(Args)]
pub struct ModifyCommand {
    /// Module identifier.
    #[arg(value_name = "MODULE")]
    module: String,

    /// New version spec to record and install.
    #[arg(value_name = "VERSION")]
    version: String,
}

impl ModifyCommand {
    /// Run the MODIFY workflow.
    pub async fn execute(self, project_root: Option<&Path>) -> Result<()> {
        workflows::modify::run(project_root, &self.module, &self.version).await
    }
}
