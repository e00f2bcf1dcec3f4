//! REMOVE: disintegrate modules from the project.
//!
//! The feature model is cleaned first, then the manifest, then the
//! installed packages, then the registry. Model and manifest writes are
//! fatal on failure; a package-manager failure is subject to the
//! configured policy (continue past it, or abort before the registry
//! step). There is deliberately no automatic rollback here: a half
//! REMOVE only leaves extra entries behind, never a broken product.

use super::Workspace;
use crate::config::InstallerFailurePolicy;
use crate::locator::ModuleLocator;
use crate::manifest::{Manifest, resolve_name};
use crate::model::FeatureModel;
use crate::registry::Registry;
use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use tracing::{info, warn};

/// Run the REMOVE workflow for the given module identifiers.
pub async fn run(explicit_root: Option<&Path>, identifiers: &[String]) -> Result<()> {
    let ws = Workspace::open(explicit_root)?;
    let root = ws.project.root().to_path_buf();

    let names: Vec<String> = identifiers.iter().map(|id| resolve_name(id)).collect();
    info!(modules = ?names, "removing modules");

    let mut manifest = Manifest::load(&root)?;
    let mut registry = Registry::load(&root)?;

    // Feature names come from the installed fragments where available,
    // topped up from the registry so modules whose directory is already
    // gone are still cleaned out of the model.
    let locator = ModuleLocator::new(&root);
    let mut feature_names: Vec<String> = locator
        .locate_feature_models(&names)
        .into_iter()
        .map(|f| f.feature_name)
        .collect();
    for registered in registry.feature_names_for(&names) {
        if !feature_names.contains(&registered) {
            feature_names.push(registered);
        }
    }

    let mut model = FeatureModel::load(&root)?;
    let mut model_changed = false;
    for feature_name in &feature_names {
        model_changed |= model.remove_integration(feature_name);
    }
    if model_changed {
        model.save(&root)?;
    }

    if manifest.remove_modules(&names) {
        manifest.save(&root)?;
    }

    println!("{} uninstalling {} module(s)...", "==>".bold(), names.len());
    if let Err(e) = ws.pm.uninstall(&names).await {
        match ws.config.remove.on_installer_failure {
            InstallerFailurePolicy::Continue => {
                warn!(error = %e, "package manager failed, continuing cleanup");
                eprintln!(
                    "{} {e}; local artifacts were cleaned up anyway",
                    "warning:".yellow().bold()
                );
            }
            InstallerFailurePolicy::Abort => return Err(e.into()),
        }
    }

    let dropped = registry.remove_projects(&names);
    if !dropped.is_empty() {
        registry.save(&root)?;
    }

    for name in &names {
        println!("{}", format!("Removed module '{name}'").green());
    }
    Ok(())
}
