//! Package-manager subprocess execution.
//!
//! Install and uninstall are delegated to an external package manager
//! (npm by default, configurable via `splm.toml`). The subprocess runs
//! with inherited stdio so its progress output reaches the user
//! directly; SPLM only interprets the exit status. The same streamed
//! execution path also runs the derivation engine during GENERATE.

use crate::core::SplmError;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

/// Builder for a streamed subprocess invocation.
///
/// The child inherits stdin/stdout/stderr; only the exit status is
/// observed. A nonzero status maps to [`SplmError::Installer`] carrying
/// the rendered command line.
pub struct StreamedCommand {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
}

impl StreamedCommand {
    /// A new invocation of `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into(), args: Vec::new(), current_dir: None }
    }

    /// Append arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the working directory of the child.
    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// The command line, rendered for logs and error messages.
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    /// Run the child to completion, failing on a nonzero exit status.
    ///
    /// The program is probed on PATH first so a missing executable is
    /// reported as [`SplmError::PackageManagerNotFound`] instead of a
    /// bare spawn error.
    pub async fn run(self) -> Result<(), SplmError> {
        let resolved = which::which(&self.program).map_err(|_| {
            SplmError::PackageManagerNotFound { program: self.program.clone() }
        })?;
        debug!(program = %resolved.display(), "resolved executable");

        let command_line = self.command_line();
        info!(command = %command_line, "running");

        let mut command = Command::new(resolved);
        command.args(&self.args);
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }

        let status = command.status().await.map_err(|source| SplmError::ResourceRead {
            path: self.program.clone(),
            source,
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(SplmError::Installer { command: command_line, code: status.code() })
        }
    }
}

/// The configured package manager, bound to one project directory.
#[derive(Debug, Clone)]
pub struct PackageManager {
    program: String,
    project_dir: PathBuf,
}

impl PackageManager {
    /// A package manager running `program` inside `project_dir`.
    pub fn new(program: impl Into<String>, project_dir: impl Into<PathBuf>) -> Self {
        Self { program: program.into(), project_dir: project_dir.into() }
    }

    /// The configured executable name.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run a bare `install`, syncing `node_modules` with the manifest.
    pub async fn install(&self) -> Result<(), SplmError> {
        StreamedCommand::new(&self.program)
            .args(["install"])
            .current_dir(&self.project_dir)
            .run()
            .await
    }

    /// Uninstall the given packages. A no-op for an empty list.
    pub async fn uninstall(&self, names: &[String]) -> Result<(), SplmError> {
        if names.is_empty() {
            return Ok(());
        }
        StreamedCommand::new(&self.program)
            .args(["uninstall"])
            .args(names.iter().cloned())
            .current_dir(&self.project_dir)
            .run()
            .await
    }
}

/// A streamed invocation of an arbitrary engine executable.
pub async fn run_engine(program: &str, args: &[String], dir: &Path) -> Result<(), SplmError> {
    StreamedCommand::new(program)
        .args(args.iter().cloned())
        .current_dir(dir)
        .run()
        .await
}
