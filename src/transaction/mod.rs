//! Rollback transactions for mutating workflows.
//!
//! A workflow opens a [`Transaction`], records the inverse of each
//! mutation as it commits it to disk, and either `commit`s (discarding
//! the undo log) or `unwind`s on failure. Unwinding replays the log in
//! reverse, restoring every artifact to its pre-workflow content and
//! asking the package manager to undo installs. A failure during the
//! unwind itself surfaces as [`SplmError::RollbackFailed`] so the user
//! knows the project needs inspection.

use crate::core::SplmError;
use crate::installer::PackageManager;
use crate::utils::fs::{atomic_write, read_text_optional};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One inverse action recorded by a workflow.
#[derive(Debug, Clone)]
pub enum UndoAction {
    /// Restore a file to its snapshotted content; `None` means the file
    /// did not exist and is deleted on undo.
    RestoreFile {
        /// Absolute path of the file.
        path: PathBuf,
        /// Pre-mutation content, if the file existed.
        previous: Option<String>,
    },
    /// Uninstall packages that the workflow installed.
    UninstallPackages(Vec<String>),
    /// Re-run a bare install so `node_modules` matches the (restored)
    /// manifest again.
    Resync,
}

/// An in-flight workflow mutation with its undo log.
#[derive(Debug, Default)]
pub struct Transaction {
    name: &'static str,
    undo: Vec<UndoAction>,
}

impl Transaction {
    /// Open a transaction for the named workflow.
    pub fn new(name: &'static str) -> Self {
        Self { name, undo: Vec::new() }
    }

    /// Snapshot a file's current content before the workflow rewrites it.
    pub fn snapshot_file(&mut self, path: &Path) -> Result<(), SplmError> {
        let previous = read_text_optional(path)?;
        debug!(path = %path.display(), existed = previous.is_some(), "snapshotting");
        self.undo.push(UndoAction::RestoreFile { path: path.to_path_buf(), previous });
        Ok(())
    }

    /// Record an arbitrary inverse action.
    pub fn record(&mut self, action: UndoAction) {
        self.undo.push(action);
    }

    /// Discard the undo log; the workflow's effects are final.
    pub fn commit(mut self) {
        debug!(workflow = self.name, actions = self.undo.len(), "committing");
        self.undo.clear();
    }

    /// Replay the undo log in reverse.
    ///
    /// Every action is attempted; the first failure is reported as
    /// [`SplmError::RollbackFailed`] after the remaining actions have
    /// still been tried.
    pub async fn unwind(self, pm: &PackageManager) -> Result<(), SplmError> {
        let mut first_failure: Option<String> = None;

        for action in self.undo.into_iter().rev() {
            let outcome = match action {
                UndoAction::RestoreFile { path, previous } => restore_file(&path, previous),
                UndoAction::UninstallPackages(names) => {
                    pm.uninstall(&names).await.map_err(|e| e.to_string())
                }
                UndoAction::Resync => pm.install().await.map_err(|e| e.to_string()),
            };

            if let Err(reason) = outcome {
                warn!(workflow = self.name, %reason, "undo action failed");
                if first_failure.is_none() {
                    first_failure = Some(reason);
                }
            }
        }

        match first_failure {
            None => Ok(()),
            Some(reason) => Err(SplmError::RollbackFailed { operation: self.name.to_string(), reason }),
        }
    }
}

fn restore_file(path: &Path, previous: Option<String>) -> Result<(), String> {
    match previous {
        Some(content) => atomic_write(path, content.as_bytes()).map_err(|e| e.to_string()),
        None => match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(format!("failed to delete '{}': {e}", path.display())),
        },
    }
}
