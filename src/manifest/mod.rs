//! Dependency manifest (`package.json`) editing.
//!
//! The manifest is a larger persisted document of which SPLM only owns
//! the `dependencies` mapping; every other field (name, version, scripts,
//! ...) must round-trip verbatim across edits. Loading keeps the full
//! document as ordered JSON and mutations touch nothing but the
//! dependency map; saving pretty-prints with a trailing newline.
//!
//! Mutation contract (spec of the ADD/REMOVE/MODIFY workflows):
//! - [`Manifest::add_modules`] is idempotent: keys that already exist are
//!   left untouched.
//! - [`Manifest::remove_modules`] tolerates absent keys.
//! - [`Manifest::set_version`] fails when the key is absent; MODIFY treats
//!   that as fatal.

mod identifier;

pub use identifier::{ModuleRef, SourceSpec, resolve_name};

use crate::constants::MANIFEST_FILE;
use crate::core::SplmError;
use crate::utils::fs::{atomic_write, read_text};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

const DEPENDENCIES_KEY: &str = "dependencies";

/// The in-memory dependency manifest.
#[derive(Debug, Clone)]
pub struct Manifest {
    document: Map<String, Value>,
}

impl Manifest {
    /// Parse a manifest from JSON text.
    pub fn parse(content: &str, origin: &str) -> Result<Self, SplmError> {
        let value: Value = serde_json::from_str(content).map_err(|e| SplmError::ManifestParse {
            path: origin.to_string(),
            reason: e.to_string(),
        })?;

        match value {
            Value::Object(document) => Ok(Self { document }),
            other => Err(SplmError::ManifestParse {
                path: origin.to_string(),
                reason: format!("expected a JSON object, found {}", json_kind(&other)),
            }),
        }
    }

    /// Load the manifest from `<project_root>/package.json`.
    pub fn load(project_root: &Path) -> Result<Self, SplmError> {
        let path = project_root.join(MANIFEST_FILE);
        let content = read_text(&path)?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Persist the manifest, pretty-printed with a trailing newline.
    ///
    /// The whole document is rewritten; fields SPLM never touched are
    /// emitted exactly as they were loaded.
    pub fn save(&self, project_root: &Path) -> Result<(), SplmError> {
        let path = project_root.join(MANIFEST_FILE);
        atomic_write(&path, self.to_pretty_string().as_bytes())
    }

    /// Serialize to the on-disk representation.
    pub fn to_pretty_string(&self) -> String {
        let mut out = serde_json::to_string_pretty(&Value::Object(self.document.clone()))
            .unwrap_or_else(|_| "{}".to_string());
        out.push('\n');
        out
    }

    /// The project name declared by the manifest, if any.
    pub fn project_name(&self) -> Option<&str> {
        self.document.get("name").and_then(Value::as_str)
    }

    fn dependencies(&self) -> Option<&Map<String, Value>> {
        self.document.get(DEPENDENCIES_KEY).and_then(Value::as_object)
    }

    fn dependencies_mut(&mut self) -> &mut Map<String, Value> {
        let entry = self
            .document
            .entry(DEPENDENCIES_KEY.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        entry.as_object_mut().expect("dependencies is an object")
    }

    /// The version/source spec recorded for `name`, if declared.
    pub fn dependency(&self, name: &str) -> Option<&str> {
        self.dependencies()?.get(name)?.as_str()
    }

    /// Whether `name` is declared as a dependency.
    pub fn contains(&self, name: &str) -> bool {
        self.dependencies().is_some_and(|deps| deps.contains_key(name))
    }

    /// All declared dependency names, in document order.
    pub fn dependency_names(&self) -> Vec<String> {
        self.dependencies()
            .map(|deps| deps.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Insert manifest entries for the given modules, skipping names that
    /// are already declared. Returns the names actually inserted.
    pub fn add_modules(&mut self, modules: &[ModuleRef], default_spec: &str) -> Vec<String> {
        let mut inserted = Vec::new();
        for module in modules {
            let (key, value) = module.manifest_entry(default_spec);
            let deps = self.dependencies_mut();
            if deps.contains_key(&key) {
                debug!(name = %key, "dependency already declared, leaving it untouched");
                continue;
            }
            deps.insert(key.clone(), Value::String(value));
            inserted.push(key);
        }
        inserted
    }

    /// Delete the given dependency keys. Absent keys are a no-op.
    /// Returns true when at least one entry was removed.
    pub fn remove_modules(&mut self, names: &[String]) -> bool {
        let deps = self.dependencies_mut();
        let mut changed = false;
        for name in names {
            changed |= deps.shift_remove(name).is_some();
        }
        changed
    }

    /// Replace the spec of an existing dependency, returning the previous
    /// value. Fails when `name` is not declared.
    pub fn set_version(&mut self, name: &str, version: &str) -> Result<String, SplmError> {
        let deps = self.dependencies_mut();
        match deps.get_mut(name) {
            Some(value) => {
                let previous = value.as_str().unwrap_or_default().to_string();
                *value = Value::String(version.to_string());
                Ok(previous)
            }
            None => Err(SplmError::ModuleNotIntegrated { name: name.to_string() }),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Manifest {
        Manifest::parse(
            r#"{
  "name": "app",
  "version": "1.0.0",
  "scripts": { "start": "node index.js" },
  "dependencies": { "base_component": "*" }
}"#,
            "test",
        )
        .unwrap()
    }

    #[test]
    fn add_is_idempotent() {
        let mut manifest = sample();
        let refs = [ModuleRef::parse("user-management@2.1.0"), ModuleRef::parse("base_component")];

        let first = manifest.add_modules(&refs, "*");
        assert_eq!(first, vec!["user-management".to_string()]);
        assert_eq!(manifest.dependency("base_component"), Some("*"));
        assert_eq!(manifest.dependency("user-management"), Some("2.1.0"));

        let again = manifest.add_modules(&refs, "*");
        assert!(again.is_empty());
        assert_eq!(manifest.dependency("user-management"), Some("2.1.0"));
    }

    #[test]
    fn add_then_remove_round_trips() {
        let mut manifest = sample();
        let before = manifest.to_pretty_string();

        let refs = [ModuleRef::parse("geo-viewer@0.3.0"), ModuleRef::parse("routing")];
        manifest.add_modules(&refs, "*");
        manifest.remove_modules(&["geo-viewer".to_string(), "routing".to_string()]);

        assert_eq!(manifest.to_pretty_string(), before);
    }

    #[test]
    fn remove_tolerates_absent_keys() {
        let mut manifest = sample();
        assert!(!manifest.remove_modules(&["not-there".to_string()]));
        assert!(manifest.remove_modules(&["base_component".to_string()]));
        assert!(!manifest.contains("base_component"));
    }

    #[test]
    fn set_version_returns_previous_and_fails_on_absent() {
        let mut manifest = sample();
        let old = manifest.set_version("base_component", "2.0.0").unwrap();
        assert_eq!(old, "*");
        assert_eq!(manifest.dependency("base_component"), Some("2.0.0"));

        let err = manifest.set_version("ghost", "1.0.0").unwrap_err();
        assert!(matches!(err, SplmError::ModuleNotIntegrated { .. }));
    }

    #[test]
    fn non_dependency_fields_round_trip_verbatim() {
        let mut manifest = sample();
        manifest.add_modules(&[ModuleRef::parse("extra@1.0.0")], "*");

        let out = manifest.to_pretty_string();
        assert!(out.contains("\"scripts\""));
        assert!(out.contains("\"node index.js\""));
        assert!(out.contains("\"version\": \"1.0.0\""));
        assert!(out.ends_with('\n'));
    }

    #[test]
    fn versioned_add_matches_expected_shape() {
        // ADD("user-management@2.1.0") on {base_component: "*"} yields both keys.
        let mut manifest =
            Manifest::parse(r#"{ "dependencies": { "base_component": "*" } }"#, "test").unwrap();
        manifest.add_modules(&[ModuleRef::parse("user-management@2.1.0")], "*");

        assert_eq!(manifest.dependency("base_component"), Some("*"));
        assert_eq!(manifest.dependency("user-management"), Some("2.1.0"));
    }

    #[test]
    fn parse_rejects_non_objects() {
        assert!(matches!(
            Manifest::parse("[1, 2]", "test"),
            Err(SplmError::ManifestParse { .. })
        ));
        assert!(matches!(
            Manifest::parse("not json", "test"),
            Err(SplmError::ManifestParse { .. })
        ));
    }

    #[test]
    fn manifest_without_dependencies_gains_the_section_on_add() {
        let mut manifest = Manifest::parse(r#"{ "name": "app" }"#, "test").unwrap();
        assert!(manifest.dependency_names().is_empty());

        manifest.add_modules(&[ModuleRef::parse("base_component")], "latest");
        assert_eq!(manifest.dependency("base_component"), Some("latest"));
    }
}
