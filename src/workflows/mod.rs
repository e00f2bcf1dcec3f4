//! Integration workflows.
//!
//! Each workflow coordinates the three persisted artifacts (manifest,
//! feature model, registry) with the package-manager subprocess under the
//! project lock. The CLI layer is a thin shell over these functions so
//! they stay directly testable against temporary project trees.

pub mod add;
pub mod generate;
pub mod modify;
pub mod remove;

use crate::config::ProjectConfig;
use crate::core::SplmError;
use crate::installer::PackageManager;
use crate::project::{Project, ProjectLock};
use std::path::Path;

/// Shared per-workflow setup: located project, held lock, configuration
/// and the configured package manager.
pub struct Workspace {
    /// The located project.
    pub project: Project,
    /// Parsed `splm.toml` (or defaults).
    pub config: ProjectConfig,
    /// Package manager bound to the project root.
    pub pm: PackageManager,
    _lock: ProjectLock,
}

impl Workspace {
    /// Locate the project, take its lock and load configuration.
    pub fn open(explicit_root: Option<&Path>) -> Result<Self, SplmError> {
        let project = Project::find(explicit_root)?;
        let lock = project.lock()?;
        let config = ProjectConfig::load(project.root())?;
        let pm = PackageManager::new(&config.package_manager, project.root());
        Ok(Self { project, config, pm, _lock: lock })
    }
}
