//! Installed-module location and layout validation.
//!
//! After the package manager materializes a module under
//! `node_modules/<name>/`, everything SPLM cares about lives in its
//! platform directory (`src/platform/`): the descriptor files, the
//! feature-model fragment (`*.uvl`) and the required `code/`
//! subdirectory.
//!
//! Validation is per-module and never raises: failures are captured in
//! the returned [`LayoutCheck`] list so an ADD batch can keep its valid
//! members while rolling back the invalid ones.

use crate::config::ValidationProfile;
use crate::constants::{CODE_DIR, FEATURE_MODEL_EXT, FEATURES_KEYWORD, MODULES_DIR, PLATFORM_SUBDIR, STRICT_LAYOUT_FILES};
use crate::utils::fs::read_text;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Outcome of validating one installed module layout.
#[derive(Debug, Clone)]
pub struct LayoutCheck {
    /// Resolved module name.
    pub name: String,
    /// Whether the layout is acceptable under the active profile.
    pub valid: bool,
    /// Why validation failed, when it did.
    pub reason: Option<String>,
}

/// A module's feature-model identifiers, extracted from its fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleFeature {
    /// Resolved module (package) name.
    pub module: String,
    /// Feature name: the fragment file's base name.
    pub feature_name: String,
    /// Feature-group name: the token on the line following the fragment's
    /// `features` marker line.
    pub feature_group: String,
}

impl ModuleFeature {
    /// The qualified name inserted under the project's mandatory group.
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.feature_name, self.feature_group)
    }
}

/// Resolves module names to installed package directories.
#[derive(Debug, Clone)]
pub struct ModuleLocator {
    modules_dir: PathBuf,
}

impl ModuleLocator {
    /// A locator rooted at the given project directory.
    pub fn new(project_root: &Path) -> Self {
        Self { modules_dir: project_root.join(MODULES_DIR) }
    }

    /// The platform directory of an installed module.
    pub fn platform_dir(&self, name: &str) -> PathBuf {
        let mut dir = self.modules_dir.join(name);
        for segment in PLATFORM_SUBDIR {
            dir.push(segment);
        }
        dir
    }

    /// Validate the installed layout of each module under the given
    /// profile. Per-module failures are captured, never raised.
    pub fn validate(&self, names: &[String], profile: ValidationProfile) -> Vec<LayoutCheck> {
        names.iter().map(|name| self.validate_one(name, profile)).collect()
    }

    fn validate_one(&self, name: &str, profile: ValidationProfile) -> LayoutCheck {
        let platform = self.platform_dir(name);
        debug!(module = %name, dir = %platform.display(), "checking module layout");

        let entries = match std::fs::read_dir(&platform) {
            Ok(entries) => entries,
            Err(e) => {
                return LayoutCheck {
                    name: name.to_string(),
                    valid: false,
                    reason: Some(format!("platform directory not readable: {e}")),
                };
            }
        };

        let mut missing: Vec<&str> = STRICT_LAYOUT_FILES.to_vec();
        let mut has_fragment = false;
        for entry in entries.flatten() {
            let file_name = entry.file_name().to_string_lossy().into_owned();
            debug!(module = %name, file = %file_name, "found");
            missing.retain(|required| *required != file_name);
            if Path::new(&file_name)
                .extension()
                .is_some_and(|ext| ext == FEATURE_MODEL_EXT)
            {
                has_fragment = true;
            }
        }

        // The code subdirectory is required under every profile.
        if !platform.join(CODE_DIR).is_dir() {
            return LayoutCheck {
                name: name.to_string(),
                valid: false,
                reason: Some(format!("missing '{CODE_DIR}' directory")),
            };
        }

        let satisfied = match profile {
            ValidationProfile::Strict => missing.is_empty(),
            ValidationProfile::Relaxed => missing.is_empty() || has_fragment,
        };

        if satisfied {
            LayoutCheck { name: name.to_string(), valid: true, reason: None }
        } else {
            LayoutCheck {
                name: name.to_string(),
                valid: false,
                reason: Some(format!("missing required files: {}", missing.join(", "))),
            }
        }
    }

    /// Locate each module's feature-model fragment and extract its
    /// identifiers. Modules without a usable fragment are skipped with a
    /// warning (non-fatal, per-name).
    pub fn locate_feature_models(&self, names: &[String]) -> Vec<ModuleFeature> {
        names
            .iter()
            .filter_map(|name| match self.locate_one(name) {
                Ok(found) => Some(found),
                Err(reason) => {
                    warn!(module = %name, %reason, "skipping module without feature model");
                    None
                }
            })
            .collect()
    }

    fn locate_one(&self, name: &str) -> Result<ModuleFeature, String> {
        let platform = self.platform_dir(name);
        let entries = std::fs::read_dir(&platform)
            .map_err(|e| format!("platform directory not readable: {e}"))?;

        let mut fragments: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == FEATURE_MODEL_EXT))
            .collect();
        fragments.sort();

        let fragment = fragments
            .into_iter()
            .next()
            .ok_or_else(|| format!("no .{FEATURE_MODEL_EXT} file in {}", platform.display()))?;

        let feature_name = fragment
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .ok_or_else(|| "fragment file has no base name".to_string())?;

        let content = read_text(&fragment).map_err(|e| e.to_string())?;
        let feature_group = extract_feature_group(&content)
            .ok_or_else(|| format!("no feature name after the '{FEATURES_KEYWORD}' marker"))?;

        Ok(ModuleFeature { module: name.to_string(), feature_name, feature_group })
    }
}

/// The token on the line immediately following the first line containing
/// the `features` marker, stripped of all whitespace.
fn extract_feature_group(content: &str) -> Option<String> {
    let mut lines = content.lines();
    while let Some(line) = lines.next() {
        if line.contains(FEATURES_KEYWORD) {
            let group: String =
                lines.next()?.chars().filter(|c| !c.is_whitespace()).collect();
            if group.is_empty() {
                return None;
            }
            return Some(group);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn platform_dir(root: &Path, name: &str) -> PathBuf {
        let dir = root.join(MODULES_DIR).join(name).join("src").join("platform");
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_strict_layout(dir: &Path) {
        for file in STRICT_LAYOUT_FILES {
            fs::write(dir.join(file), "{}").unwrap();
        }
        fs::create_dir_all(dir.join(CODE_DIR)).unwrap();
    }

    #[test]
    fn strict_layout_is_valid_under_both_profiles() {
        let root = TempDir::new().unwrap();
        let dir = platform_dir(root.path(), "full");
        write_strict_layout(&dir);

        let locator = ModuleLocator::new(root.path());
        for profile in [ValidationProfile::Strict, ValidationProfile::Relaxed] {
            let checks = locator.validate(&["full".to_string()], profile);
            assert!(checks[0].valid, "profile {profile:?}: {:?}", checks[0].reason);
        }
    }

    #[test]
    fn fragment_only_layout_depends_on_profile() {
        let root = TempDir::new().unwrap();
        let dir = platform_dir(root.path(), "fragment");
        fs::write(dir.join("fragment_component.uvl"), "features\n    Fragment\n").unwrap();
        fs::create_dir_all(dir.join(CODE_DIR)).unwrap();

        let locator = ModuleLocator::new(root.path());

        let relaxed = locator.validate(&["fragment".to_string()], ValidationProfile::Relaxed);
        assert!(relaxed[0].valid);

        let strict = locator.validate(&["fragment".to_string()], ValidationProfile::Strict);
        assert!(!strict[0].valid);
        assert!(strict[0].reason.as_ref().unwrap().contains("config.json"));
    }

    #[test]
    fn missing_code_directory_is_always_invalid() {
        let root = TempDir::new().unwrap();
        let dir = platform_dir(root.path(), "no-code");
        for file in STRICT_LAYOUT_FILES {
            fs::write(dir.join(file), "{}").unwrap();
        }
        fs::write(dir.join("no_code.uvl"), "features\n    NoCode\n").unwrap();

        let locator = ModuleLocator::new(root.path());
        for profile in [ValidationProfile::Strict, ValidationProfile::Relaxed] {
            let checks = locator.validate(&["no-code".to_string()], profile);
            assert!(!checks[0].valid);
            assert!(checks[0].reason.as_ref().unwrap().contains("code"));
        }
    }

    #[test]
    fn uninstalled_module_is_invalid_not_an_error() {
        let root = TempDir::new().unwrap();
        let locator = ModuleLocator::new(root.path());
        let checks = locator.validate(&["ghost".to_string()], ValidationProfile::Relaxed);
        assert_eq!(checks.len(), 1);
        assert!(!checks[0].valid);
    }

    #[test]
    fn locate_extracts_feature_name_and_group() {
        let root = TempDir::new().unwrap();
        let dir = platform_dir(root.path(), "user_management");
        fs::write(
            dir.join("user_management_component.uvl"),
            "features\n    UserManagement\n        mandatory\n            Login\n",
        )
        .unwrap();

        let locator = ModuleLocator::new(root.path());
        let found = locator.locate_feature_models(&["user_management".to_string()]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].feature_name, "user_management_component");
        assert_eq!(found[0].feature_group, "UserManagement");
        assert_eq!(found[0].qualified(), "user_management_component.UserManagement");
    }

    #[test]
    fn modules_without_fragment_are_skipped() {
        let root = TempDir::new().unwrap();
        let with = platform_dir(root.path(), "with");
        fs::write(with.join("with_component.uvl"), "features\n    With\n").unwrap();
        platform_dir(root.path(), "without");

        let locator = ModuleLocator::new(root.path());
        let found =
            locator.locate_feature_models(&["with".to_string(), "without".to_string()]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].module, "with");
    }

    #[test]
    fn fragment_without_features_marker_is_skipped() {
        let root = TempDir::new().unwrap();
        let dir = platform_dir(root.path(), "bare");
        fs::write(dir.join("bare.uvl"), "just text\nno marker\n").unwrap();

        let locator = ModuleLocator::new(root.path());
        assert!(locator.locate_feature_models(&["bare".to_string()]).is_empty());
    }

    #[test]
    fn feature_group_extraction_strips_whitespace() {
        assert_eq!(
            extract_feature_group("imports\nfeatures\n    \t Geo Viewer \n"),
            Some("GeoViewer".to_string())
        );
        assert_eq!(extract_feature_group("features\n"), None);
        assert_eq!(extract_feature_group("nothing here"), None);
    }
}
