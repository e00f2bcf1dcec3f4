//! ADD: integrate modules into the project.
//!
//! Declared in the manifest first, then installed, validated, and wired
//! into the feature model and registry. Manifest and installation are
//! one rollback unit; invalid modules are rolled back individually so a
//! partially valid batch still lands. The model/registry phase is a
//! second rollback unit so a structural-edit failure cannot leave the
//! two files disagreeing.

use super::Workspace;
use crate::constants::{FEATURE_MODEL_FILE, REGISTRY_FILE};
use crate::core::SplmError;
use crate::locator::ModuleLocator;
use crate::manifest::{Manifest, ModuleRef};
use crate::model::FeatureModel;
use crate::registry::{Registry, RegistryEntry};
use crate::transaction::{Transaction, UndoAction};
use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use tracing::{info, warn};

/// Run the ADD workflow for the given module identifiers.
pub async fn run(explicit_root: Option<&Path>, identifiers: &[String]) -> Result<()> {
    let ws = Workspace::open(explicit_root)?;
    let root = ws.project.root().to_path_buf();

    let modules: Vec<ModuleRef> = identifiers.iter().map(|id| ModuleRef::parse(id)).collect();
    let names: Vec<String> = modules.iter().map(|m| m.name.clone()).collect();
    info!(modules = ?names, "adding modules");

    let mut manifest = Manifest::load(&root)?;
    let project_name = manifest.project_name().unwrap_or_default().to_string();

    // Phase 1: manifest + installation, one rollback unit.
    let mut tx = Transaction::new("add");
    tx.snapshot_file(&ws.project.manifest_path())?;

    let inserted = manifest.add_modules(&modules, &ws.config.default_version_spec);
    if let Err(e) = manifest.save(&root) {
        tx.unwind(&ws.pm).await?;
        return Err(e.into());
    }
    println!("{} installing {} module(s)...", "==>".bold(), names.len());
    if let Err(e) = ws.pm.install().await {
        eprintln!("{}", "installation failed, restoring the manifest".yellow());
        tx.unwind(&ws.pm).await?;
        return Err(e.into());
    }
    // Only now is there anything installed to undo.
    tx.record(UndoAction::UninstallPackages(inserted));

    // Layout validation is per-module: invalid ones are rolled back
    // individually, the rest of the batch proceeds.
    let locator = ModuleLocator::new(&root);
    let checks = locator.validate(&names, ws.config.validation_profile);
    let (valid, invalid): (Vec<_>, Vec<_>) = checks.into_iter().partition(|c| c.valid);

    if !invalid.is_empty() {
        let invalid_names: Vec<String> = invalid.iter().map(|c| c.name.clone()).collect();
        for check in &invalid {
            eprintln!(
                "{} module '{}' is not an SPL module: {}",
                "warning:".yellow().bold(),
                check.name,
                check.reason.as_deref().unwrap_or("invalid layout")
            );
        }

        manifest.remove_modules(&invalid_names);
        if let Err(e) = manifest.save(&root) {
            tx.unwind(&ws.pm).await?;
            return Err(e.into());
        }
        // Cleanup of rejected packages is best effort.
        if let Err(e) = ws.pm.uninstall(&invalid_names).await {
            warn!(error = %e, "failed to uninstall rejected modules");
        }
    }
    tx.commit();

    if valid.is_empty() {
        return Err(SplmError::NoValidModules.into());
    }

    let valid_names: Vec<String> = valid.iter().map(|c| c.name.clone()).collect();
    let features = locator.locate_feature_models(&valid_names);
    if features.is_empty() {
        // The manifest keeps the validated entries; only the wiring step
        // is refused.
        return Err(SplmError::NoFeatureModels.into());
    }

    // Phase 2: feature model + registry, a second rollback unit.
    let mut tx = Transaction::new("add");
    tx.snapshot_file(&root.join(FEATURE_MODEL_FILE))?;
    tx.snapshot_file(&root.join(REGISTRY_FILE))?;

    match integrate(&root, &project_name, &features) {
        Ok(()) => tx.commit(),
        Err(e) => {
            tx.unwind(&ws.pm).await?;
            return Err(e.into());
        }
    }

    for feature in &features {
        println!("{}", format!("Integrated module '{}'", feature.module).green());
    }
    Ok(())
}

fn integrate(
    root: &Path,
    project_name: &str,
    features: &[crate::locator::ModuleFeature],
) -> Result<(), SplmError> {
    let mut model = FeatureModel::load(root)?;
    let mut registry = Registry::load(root)?;

    // New features hang off the main module's feature when one is
    // flagged; if that feature cannot anchor (no mandatory group), the
    // feature named after the project takes over.
    let main_anchor = registry.main_entry().map(|e| e.name.clone());

    for feature in features {
        insert_anchored(&mut model, feature, main_anchor.as_deref(), project_name)?;
        registry.register(RegistryEntry {
            name: feature.feature_name.clone(),
            name_project: feature.module.clone(),
            main: false,
        });
    }

    model.save(root)?;
    registry.save(root)
}

fn insert_anchored(
    model: &mut FeatureModel,
    feature: &crate::locator::ModuleFeature,
    main_anchor: Option<&str>,
    project_name: &str,
) -> Result<(), SplmError> {
    if let Some(anchor) = main_anchor {
        match model.insert_integration(&feature.feature_name, &feature.qualified(), anchor) {
            Ok(()) => return Ok(()),
            // A failed edit leaves the model untouched, so retrying
            // with the project anchor is safe.
            Err(SplmError::StructuralEdit { .. }) => {}
            Err(e) => return Err(e),
        }
    }
    model.insert_integration(&feature.feature_name, &feature.qualified(), project_name)
}
