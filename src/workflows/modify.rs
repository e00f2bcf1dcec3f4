//! MODIFY: change the declared version of an integrated module.
//!
//! The version bump is written to the manifest and handed to the package
//! manager; on installer failure both the manifest and `node_modules`
//! are restored (the snapshot is replayed, then a resync reinstalls the
//! old version). The command fails either way, but never leaves the
//! manifest pointing at a version that is not installed.

use super::Workspace;
use crate::manifest::{Manifest, resolve_name};
use crate::transaction::{Transaction, UndoAction};
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use tracing::info;

/// Run the MODIFY workflow: set `identifier`'s version to `version`.
pub async fn run(explicit_root: Option<&Path>, identifier: &str, version: &str) -> Result<()> {
    let ws = Workspace::open(explicit_root)?;
    let root = ws.project.root().to_path_buf();
    let name = resolve_name(identifier);

    let mut manifest = Manifest::load(&root)?;

    // Recorded before the snapshot so the reverse replay restores the
    // file first and only then resyncs node_modules against it.
    let mut tx = Transaction::new("modify");
    tx.record(UndoAction::Resync);
    tx.snapshot_file(&ws.project.manifest_path())?;

    let previous = manifest.set_version(&name, version)?;
    manifest.save(&root)?;
    info!(module = %name, from = %previous, to = %version, "version changed");

    println!("{} installing '{name}' {version}...", "==>".bold());
    if let Err(e) = ws.pm.install().await {
        eprintln!("{}", "installation failed, rolling back the version change".yellow());
        tx.unwind(&ws.pm).await?;
        return Err(anyhow::Error::from(e))
            .with_context(|| format!("version change of '{name}' was rolled back to '{previous}'"));
    }

    tx.commit();
    println!("{}", format!("Module '{name}': {previous} -> {version}").green());
    Ok(())
}
