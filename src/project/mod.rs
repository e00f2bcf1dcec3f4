//! Project discovery and workflow locking.
//!
//! A project is any directory containing `package.json`. Discovery walks
//! up from a starting directory (explicit `--project-root` skips the
//! walk), so workflows can run from anywhere inside the tree.
//!
//! Every mutating workflow takes a per-project advisory lock before
//! touching any artifact. Lock acquisition never blocks: a held lock
//! fails fast with [`SplmError::ProjectBusy`].

use crate::constants::{LOCKS_DIR, MANIFEST_FILE, PROJECT_LOCK_NAME};
use crate::core::SplmError;
use crate::utils::fs::ensure_dir;
use fs4::fs_std::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// A located SPL project.
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
}

impl Project {
    /// Locate the project.
    ///
    /// With an explicit root, that directory must itself hold the
    /// manifest. Otherwise the search starts at the current directory and
    /// walks up until a manifest is found.
    pub fn find(explicit_root: Option<&Path>) -> Result<Self, SplmError> {
        if let Some(root) = explicit_root {
            if root.join(MANIFEST_FILE).is_file() {
                return Ok(Self { root: root.to_path_buf() });
            }
            return Err(SplmError::ProjectNotFound { start: root.display().to_string() });
        }

        let start = std::env::current_dir().map_err(|source| SplmError::ResourceRead {
            path: ".".to_string(),
            source,
        })?;

        let mut dir = start.as_path();
        loop {
            trace!(dir = %dir.display(), "probing for manifest");
            if dir.join(MANIFEST_FILE).is_file() {
                return Ok(Self { root: dir.to_path_buf() });
            }
            match dir.parent() {
                Some(parent) => dir = parent,
                None => {
                    return Err(SplmError::ProjectNotFound {
                        start: start.display().to_string(),
                    });
                }
            }
        }
    }

    /// The project root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the dependency manifest.
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    /// Acquire the project's workflow lock, failing fast when held.
    pub fn lock(&self) -> Result<ProjectLock, SplmError> {
        let mut dir = self.root.clone();
        for segment in LOCKS_DIR {
            dir.push(segment);
        }
        ensure_dir(&dir)?;

        let path = dir.join(PROJECT_LOCK_NAME);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| SplmError::ResourceWrite {
                path: path.display().to_string(),
                source,
            })?;

        let acquired = file.try_lock_exclusive().map_err(|_| SplmError::ProjectBusy {
            root: self.root.display().to_string(),
        })?;
        if !acquired {
            return Err(SplmError::ProjectBusy { root: self.root.display().to_string() });
        }

        debug!(lock = %path.display(), "acquired project lock");
        Ok(ProjectLock { file, path })
    }
}

/// Held advisory lock; released (and its file removed) on drop.
#[derive(Debug)]
pub struct ProjectLock {
    file: File,
    path: PathBuf,
}

impl Drop for ProjectLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        // Best effort: a leftover file is harmless, the lock is advisory.
        let _ = std::fs::remove_file(&self.path);
    }
}
