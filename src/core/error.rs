//! Error types for SPLM operations.
//!
//! [`SplmError`] enumerates every failure mode of the integration
//! workflows, mirroring the taxonomy of the persisted artifacts it
//! guards: read/write failures on the manifest, feature model and
//! registry abort the running workflow; layout-validation failures are
//! per-module and non-fatal; installer failures carry the subprocess
//! exit status; structural-edit failures replace what used to be a
//! silent no-op when an insertion anchor is missing.

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for SPLM operations.
#[derive(Error, Debug)]
pub enum SplmError {
    /// No `package.json` was found walking up from the starting directory.
    #[error("no SPL project found starting from '{start}'")]
    ProjectNotFound {
        /// Directory the search started from.
        start: String,
    },

    /// Another workflow holds the advisory lock on the project.
    #[error("project '{root}' is busy: another splm workflow is running")]
    ProjectBusy {
        /// Root of the locked project.
        root: String,
    },

    /// Reading a persisted artifact failed.
    #[error("failed to read '{path}'")]
    ResourceRead {
        /// Path of the artifact.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Writing a persisted artifact failed.
    #[error("failed to write '{path}'")]
    ResourceWrite {
        /// Path of the artifact.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The dependency manifest is not valid JSON (or not an object).
    #[error("invalid manifest '{path}': {reason}")]
    ManifestParse {
        /// Path of the manifest.
        path: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// The feature-model document does not follow the line grammar.
    #[error("invalid feature model '{path}' at line {line}: {reason}")]
    ModelParse {
        /// Path of the document.
        path: String,
        /// 1-based line number of the offending line.
        line: usize,
        /// Parser diagnostic.
        reason: String,
    },

    /// The module registry is not a valid JSON entry list.
    #[error("invalid module registry '{path}': {reason}")]
    RegistryParse {
        /// Path of the registry.
        path: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// The project configuration file is malformed.
    #[error("invalid project configuration '{path}': {reason}")]
    ConfigParse {
        /// Path of the configuration file.
        path: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// The product specification handed to `generate` is malformed.
    #[error("invalid product specification '{path}': {reason}")]
    ProductParse {
        /// Path of the product spec.
        path: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// MODIFY was asked to change a module the manifest does not declare.
    #[error("module '{name}' is not declared in the manifest")]
    ModuleNotIntegrated {
        /// Requested module name.
        name: String,
    },

    /// Every module in an ADD batch failed layout validation.
    #[error("no valid modules remain after layout validation")]
    NoValidModules,

    /// None of the validated modules ships a feature-model fragment.
    #[error("no feature-model fragment found in any of the added modules")]
    NoFeatureModels,

    /// A structural edit of the feature model found no insertion anchor.
    #[error("feature model edit failed: {reason}")]
    StructuralEdit {
        /// What was missing (root feature, mandatory group, ...).
        reason: String,
    },

    /// A subprocess (package manager or derivation engine) failed.
    #[error("`{command}` {}", exit_reason(.code))]
    Installer {
        /// The command line that was executed.
        command: String,
        /// Exit code, if the process exited normally.
        code: Option<i32>,
    },

    /// The configured package manager (or engine) executable is missing.
    #[error("executable '{program}' not found on PATH")]
    PackageManagerNotFound {
        /// Program name that was probed.
        program: String,
    },

    /// Product spec and manifest disagree on a module version.
    #[error(
        "version mismatch for module '{module}': manifest declares '{manifest_version}', product requests '{product_version}'"
    )]
    Consistency {
        /// Module with diverging versions.
        module: String,
        /// Version currently in the manifest.
        manifest_version: String,
        /// Version requested by the product spec.
        product_version: String,
    },

    /// A rollback itself failed; the project needs manual attention.
    #[error("rollback of {operation} failed: {reason}")]
    RollbackFailed {
        /// The operation whose rollback failed.
        operation: String,
        /// Why the rollback failed.
        reason: String,
    },
}

fn exit_reason(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with status {code}"),
        None => "was terminated by a signal".to_string(),
    }
}

/// An error paired with a user-facing suggestion and optional details.
///
/// Produced by [`user_friendly_error`] at the top of the CLI; everything
/// below works with plain `Result` values.
pub struct ErrorContext {
    /// The underlying error chain.
    pub error: anyhow::Error,
    /// One-line hint on how to resolve the problem.
    pub suggestion: Option<String>,
    /// Extra free-form details.
    pub details: Option<String>,
}

impl ErrorContext {
    /// Wrap an error without any suggestion.
    pub fn new(error: anyhow::Error) -> Self {
        Self { error, suggestion: None, details: None }
    }

    /// Attach a resolution hint.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach extra details.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error (and its cause chain) to stderr with colors.
    pub fn display(&self) {
        eprintln!("{} {}", "error:".red().bold(), self.error);
        for cause in self.error.chain().skip(1) {
            eprintln!("  {} {cause}", "caused by:".dimmed());
        }
        if let Some(details) = &self.details {
            eprintln!("\n{details}");
        }
        if let Some(suggestion) = &self.suggestion {
            eprintln!("\n{} {suggestion}", "hint:".yellow().bold());
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nhint: {suggestion}")?;
        }
        Ok(())
    }
}

/// Convert any error into an [`ErrorContext`] with a contextual suggestion.
///
/// Downcasts to [`SplmError`] where possible; unrecognized errors pass
/// through without a hint.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let suggestion = match error.downcast_ref::<SplmError>() {
        Some(SplmError::ProjectNotFound { .. }) => Some(
            "run splm inside an SPL project (a directory containing package.json), or pass --project-root"
                .to_string(),
        ),
        Some(SplmError::ProjectBusy { .. }) => {
            Some("wait for the other splm command to finish and retry".to_string())
        }
        Some(SplmError::PackageManagerNotFound { program }) => Some(format!(
            "install '{program}' or point `package-manager` in splm.toml at an available executable"
        )),
        Some(SplmError::ModuleNotIntegrated { name }) => {
            Some(format!("integrate it first with `splm add {name}`"))
        }
        Some(SplmError::Consistency { .. }) => {
            Some("re-run `splm generate` without --no-sync to reconcile versions automatically".to_string())
        }
        Some(SplmError::StructuralEdit { .. }) => Some(
            "check that base.uvl declares the project root feature with a `mandatory` group beneath it"
                .to_string(),
        ),
        Some(SplmError::RollbackFailed { .. }) => Some(
            "the project artifacts may be inconsistent; inspect package.json, base.uvl and splModules.json manually"
                .to_string(),
        ),
        Some(SplmError::ManifestParse { .. }) => {
            Some("fix the JSON syntax in package.json and retry".to_string())
        }
        _ => None,
    };

    let mut ctx = ErrorContext::new(error);
    if let Some(suggestion) = suggestion {
        ctx = ctx.with_suggestion(suggestion);
    }
    ctx
}
