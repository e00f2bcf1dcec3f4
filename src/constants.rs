//! Global constants used throughout the SPLM codebase.
//!
//! Artifact file names, installed-module layout paths, and feature-model
//! markers that are shared across modules. Defining them centrally keeps
//! the on-disk contract discoverable in one place.

/// Dependency manifest at the project root.
pub const MANIFEST_FILE: &str = "package.json";

/// Feature-model document at the project root.
pub const FEATURE_MODEL_FILE: &str = "base.uvl";

/// Module registry at the project root.
pub const REGISTRY_FILE: &str = "splModules.json";

/// Optional project configuration file.
pub const CONFIG_FILE: &str = "splm.toml";

/// Directory where the package manager materializes installed modules.
pub const MODULES_DIR: &str = "node_modules";

/// Path segments from an installed module's root to its platform directory.
pub const PLATFORM_SUBDIR: [&str; 2] = ["src", "platform"];

/// Required code subdirectory inside the platform directory.
pub const CODE_DIR: &str = "code";

/// Descriptor files required by the strict validation profile.
pub const STRICT_LAYOUT_FILES: [&str; 3] = ["config.json", "extra.js", "transformation.js"];

/// Extension of feature-model fragment files shipped by modules.
pub const FEATURE_MODEL_EXT: &str = "uvl";

/// Section keyword opening the import list of a feature model.
pub const IMPORTS_KEYWORD: &str = "imports";

/// Section keyword opening the feature tree of a feature model.
pub const FEATURES_KEYWORD: &str = "features";

/// Section keyword opening the (opaque) constraints tail of a feature model.
pub const CONSTRAINTS_KEYWORD: &str = "constraints";

/// Root-feature marker accepted when the project name does not match
/// any feature in the tree.
pub const FALLBACK_ROOT_FEATURE: &str = "MainSPL";

/// Indentation width, in spaces, of one feature-model nesting level.
pub const INDENT_WIDTH: usize = 4;

/// Version spec recorded for modules added without an explicit version.
pub const DEFAULT_VERSION_SPEC: &str = "*";

/// Package manager invoked for install/uninstall when not configured.
pub const DEFAULT_PACKAGE_MANAGER: &str = "npm";

/// External derivation engine invoked by `splm generate` when not configured.
pub const DEFAULT_DERIVATION_ENGINE: &str = "spl-js-engine";

/// Directory (relative to the project root) holding workflow lock files.
pub const LOCKS_DIR: [&str; 2] = [".splm", ".locks"];

/// Lock file guarding against concurrent workflow execution.
pub const PROJECT_LOCK_NAME: &str = "project";
