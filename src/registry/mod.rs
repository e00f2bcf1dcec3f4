//! Module registry (`splModules.json`) bookkeeping.
//!
//! The registry records which feature-model names belong to which
//! installed module so later workflows (REMOVE, GENERATE) can map between
//! the two without re-scanning `node_modules`. It is a flat JSON array of
//! entries, append-on-add and filter-on-remove; a missing file is an
//! empty registry. At most one entry carries the `main` flag, marking the
//! module whose feature anchors new integrations.

use crate::constants::REGISTRY_FILE;
use crate::core::SplmError;
use crate::utils::fs::{atomic_write, read_text_optional};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One registered module binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryEntry {
    /// Feature name the module contributed to the feature model.
    pub name: String,
    /// Installed package name of the module.
    pub name_project: String,
    /// Whether this module's feature is the integration anchor.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub main: bool,
}

/// The persisted registry.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: Vec<RegistryEntry>,
}

impl Registry {
    /// Parse registry JSON text.
    pub fn parse(content: &str, origin: &str) -> Result<Self, SplmError> {
        let entries = serde_json::from_str(content).map_err(|e| SplmError::RegistryParse {
            path: origin.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { entries })
    }

    /// Load `<project_root>/splModules.json`; a missing file is empty.
    pub fn load(project_root: &Path) -> Result<Self, SplmError> {
        let path = project_root.join(REGISTRY_FILE);
        match read_text_optional(&path)? {
            Some(content) => Self::parse(&content, &path.display().to_string()),
            None => Ok(Self::default()),
        }
    }

    /// Persist the registry, pretty-printed with a trailing newline.
    pub fn save(&self, project_root: &Path) -> Result<(), SplmError> {
        let path = project_root.join(REGISTRY_FILE);
        let mut out = serde_json::to_string_pretty(&self.entries)
            .unwrap_or_else(|_| "[]".to_string());
        out.push('\n');
        atomic_write(&path, out.as_bytes())
    }

    /// All entries, in registration order.
    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    /// The entry flagged as the integration anchor, if any.
    pub fn main_entry(&self) -> Option<&RegistryEntry> {
        self.entries.iter().find(|e| e.main)
    }

    /// Whether a module is registered under the given project name.
    pub fn contains_project(&self, name_project: &str) -> bool {
        self.entries.iter().any(|e| e.name_project == name_project)
    }

    /// Append an entry, replacing any previous registration of the same
    /// module.
    pub fn register(&mut self, entry: RegistryEntry) {
        self.entries.retain(|e| e.name_project != entry.name_project);
        if entry.main {
            for existing in &mut self.entries {
                existing.main = false;
            }
        }
        self.entries.push(entry);
    }

    /// Drop every entry registered under one of the given project names.
    /// Returns the dropped entries.
    pub fn remove_projects(&mut self, names: &[String]) -> Vec<RegistryEntry> {
        let (dropped, kept) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|e| names.iter().any(|n| n == &e.name_project));
        self.entries = kept;
        dropped
    }

    /// Feature names registered for the given project names.
    pub fn feature_names_for(&self, names: &[String]) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| names.iter().any(|n| n == &e.name_project))
            .map(|e| e.name.clone())
            .collect()
    }
}
