//! SPLM - SPL module manager.
//!
//! SPLM integrates pluggable feature modules into a software-product-line
//! (SPL) project. An integration touches three coupled artifacts at the
//! project root, plus the package manager's installed tree:
//!
//! - `package.json` - the dependency manifest (only its `dependencies`
//!   map is owned by SPLM, everything else round-trips verbatim)
//! - `base.uvl` - the feature-model document describing how module
//!   features compose into the product line
//! - `splModules.json` - the registry mapping feature names to installed
//!   packages
//!
//! The workflows (`add`, `remove`, `modify`, `generate`) keep the three
//! artifacts mutually consistent across partial failures: mutations are
//! written atomically, each workflow runs under a per-project advisory
//! lock, and an undo log restores the pre-workflow state when the
//! package-manager subprocess fails partway through.
//!
//! # Module Organization
//!
//! - [`cli`]: command-line parsing and dispatch
//! - [`workflows`]: the ADD/REMOVE/MODIFY/GENERATE orchestrations
//! - [`manifest`]: manifest editing and module-identifier parsing
//! - [`model`]: feature-model parsing and structural editing
//! - [`registry`]: module-registry bookkeeping
//! - [`locator`]: installed-module layout validation and fragment lookup
//! - [`installer`]: package-manager and engine subprocess execution
//! - [`transaction`]: undo logs for rollback
//! - [`project`]: project discovery and workflow locking
//! - [`config`]: `splm.toml` project configuration
//! - [`core`]: error taxonomy and user-facing error display

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod installer;
pub mod locator;
pub mod manifest;
pub mod model;
pub mod project;
pub mod registry;
pub mod transaction;
pub mod utils;
pub mod workflows;
