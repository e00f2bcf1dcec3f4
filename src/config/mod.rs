//! Project configuration (`splm.toml`).
//!
//! All keys are optional; a missing file yields the defaults, which
//! reproduce the historical behavior of the tooling: npm as the package
//! manager, the relaxed module-validation profile, and REMOVE continuing
//! past installer failures.
//!
//! ```toml
//! package-manager = "npm"
//! derivation-engine = "spl-js-engine"
//! default-version-spec = "*"
//! validation-profile = "relaxed"
//!
//! [remove]
//! on-installer-failure = "continue"
//! ```

use crate::constants::{CONFIG_FILE, DEFAULT_DERIVATION_ENGINE, DEFAULT_PACKAGE_MANAGER, DEFAULT_VERSION_SPEC};
use crate::core::SplmError;
use crate::utils::fs::read_text_optional;
use serde::Deserialize;
use std::path::Path;

/// How thoroughly an installed module layout is checked during ADD.
///
/// Both profiles require the `code/` subdirectory; they differ on the
/// descriptor files next to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationProfile {
    /// Require all of `config.json`, `extra.js` and `transformation.js`.
    Strict,
    /// Accept a single `*.uvl` feature-model fragment as a substitute for
    /// the strict descriptor set.
    #[default]
    Relaxed,
}

/// What REMOVE does when the package manager exits nonzero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallerFailurePolicy {
    /// Log the failure and keep cleaning up local state (registry step
    /// still runs). Historical behavior.
    #[default]
    Continue,
    /// Abort the workflow before the registry step.
    Abort,
}

/// REMOVE-specific settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RemoveConfig {
    /// Policy applied when `uninstall` exits nonzero.
    #[serde(default)]
    pub on_installer_failure: InstallerFailurePolicy,
}

/// Parsed `splm.toml`, with defaults for every missing key.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ProjectConfig {
    /// Executable used for `install` / `uninstall` subprocess calls.
    #[serde(default = "default_package_manager")]
    pub package_manager: String,

    /// Executable handed the final feature model during `generate`.
    #[serde(default = "default_derivation_engine")]
    pub derivation_engine: String,

    /// Version spec recorded for modules added without a version.
    #[serde(default = "default_version_spec")]
    pub default_version_spec: String,

    /// Module layout validation profile.
    #[serde(default)]
    pub validation_profile: ValidationProfile,

    /// REMOVE workflow policies.
    #[serde(default)]
    pub remove: RemoveConfig,
}

fn default_package_manager() -> String {
    DEFAULT_PACKAGE_MANAGER.to_string()
}

fn default_derivation_engine() -> String {
    DEFAULT_DERIVATION_ENGINE.to_string()
}

fn default_version_spec() -> String {
    DEFAULT_VERSION_SPEC.to_string()
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            package_manager: default_package_manager(),
            derivation_engine: default_derivation_engine(),
            default_version_spec: default_version_spec(),
            validation_profile: ValidationProfile::default(),
            remove: RemoveConfig::default(),
        }
    }
}

impl ProjectConfig {
    /// Load `splm.toml` from the project root, falling back to defaults
    /// when the file does not exist.
    pub fn load(project_root: &Path) -> Result<Self, SplmError> {
        let path = project_root.join(CONFIG_FILE);
        match read_text_optional(&path)? {
            Some(content) => {
                toml::from_str(&content).map_err(|e| SplmError::ConfigParse {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })
            }
            None => Ok(Self::default()),
        }
    }
}
