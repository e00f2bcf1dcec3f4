//! GENERATE: reconcile versions and hand off to the derivation engine.
//!
//! The product specification may pin module versions that differ from
//! the manifest. With syncing enabled the manifest is temporarily
//! rewritten to the product's versions, dependencies are reinstalled,
//! the engine runs, and the manifest change is rolled back afterwards.
//! The engine only reads the feature model and `node_modules`, so the
//! rollback deliberately waits until it has returned.

use super::Workspace;
use crate::core::SplmError;
use crate::manifest::Manifest;
use crate::registry::Registry;
use crate::transaction::{Transaction, UndoAction};
use crate::utils::fs::read_text;
use anyhow::Result;
use colored::Colorize;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Inputs of the GENERATE workflow. Relative paths are interpreted
/// against the project root.
pub struct GenerateOptions {
    /// Product specification file.
    pub product: PathBuf,
    /// Output directory handed to the engine.
    pub output: PathBuf,
    /// Scratch directory cleared before the engine runs.
    pub tmp: PathBuf,
    /// Whether manifest/product version skew is reconciled (true) or a
    /// hard error (false).
    pub sync: bool,
}

/// The parsed product specification; fields SPLM does not interpret are
/// ignored and passed through to the engine via the file itself.
#[derive(Debug, Deserialize)]
struct ProductSpec {
    #[serde(default)]
    modules: std::collections::BTreeMap<String, String>,
}

struct Skew {
    module: String,
    manifest_version: String,
    product_version: String,
}

/// Run the GENERATE workflow.
pub async fn run(explicit_root: Option<&Path>, opts: &GenerateOptions) -> Result<()> {
    let ws = Workspace::open(explicit_root)?;
    let root = ws.project.root().to_path_buf();

    // Relative inputs are resolved against the project root, never the
    // caller's cwd, so splm and the engine read the same files.
    // (`join` keeps absolute paths as-is.)
    let product_path = root.join(&opts.product);
    let output_dir = root.join(&opts.output);
    let tmp_dir = root.join(&opts.tmp);

    let product = load_product(&product_path)?;
    let mut manifest = Manifest::load(&root)?;
    let registry = Registry::load(&root)?;

    for module in product.modules.keys() {
        if !manifest.contains(module) {
            eprintln!(
                "{} product pins '{module}' which the manifest does not declare; ignoring it",
                "warning:".yellow().bold()
            );
        }
    }

    // Version skew only matters for modules the registry knows about;
    // ordinary dependencies are the package manager's business.
    let skew: Vec<Skew> = product
        .modules
        .iter()
        .filter(|(module, _)| registry.contains_project(module))
        .filter_map(|(module, product_version)| {
            let manifest_version = manifest.dependency(module)?.to_string();
            if &manifest_version == product_version {
                None
            } else {
                Some(Skew {
                    module: module.clone(),
                    manifest_version,
                    product_version: product_version.clone(),
                })
            }
        })
        .collect();

    let mut tx = Transaction::new("generate");
    if !skew.is_empty() {
        if !opts.sync {
            let first = &skew[0];
            return Err(SplmError::Consistency {
                module: first.module.clone(),
                manifest_version: first.manifest_version.clone(),
                product_version: first.product_version.clone(),
            }
            .into());
        }

        println!(
            "{} syncing {} module version(s) with the product specification...",
            "==>".bold(),
            skew.len()
        );
        tx.record(UndoAction::Resync);
        tx.snapshot_file(&ws.project.manifest_path())?;

        for entry in &skew {
            info!(
                module = %entry.module,
                from = %entry.manifest_version,
                to = %entry.product_version,
                "pinning product version"
            );
            manifest.set_version(&entry.module, &entry.product_version)?;
        }
        manifest.save(&root)?;

        if let Err(e) = ws.pm.install().await {
            eprintln!("{}", "installation failed, restoring the manifest".yellow());
            tx.unwind(&ws.pm).await?;
            return Err(e.into());
        }
    }

    clear_dir(&tmp_dir)?;
    clear_dir(&output_dir)?;

    println!("{} running {}...", "==>".bold(), ws.config.derivation_engine);
    let engine_result = crate::installer::run_engine(
        &ws.config.derivation_engine,
        &[
            product_path.display().to_string(),
            output_dir.display().to_string(),
        ],
        &root,
    )
    .await;

    // The temporary version pins are undone only now that the engine has
    // finished reading the project.
    tx.unwind(&ws.pm).await?;

    engine_result?;
    println!("{}", format!("Product generated at {}", output_dir.display()).green());
    Ok(())
}

fn load_product(path: &Path) -> Result<ProductSpec, SplmError> {
    let content = read_text(path)?;
    serde_json::from_str(&content).map_err(|e| SplmError::ProductParse {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn clear_dir(dir: &Path) -> Result<(), SplmError> {
    debug!(dir = %dir.display(), "clearing");
    match std::fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => {
            Err(SplmError::ResourceWrite { path: dir.display().to_string(), source })
        }
    }
}
