//! Core types and error handling for SPLM.
//!
//! The error system follows two principles:
//! 1. **Strongly-typed errors** ([`SplmError`]) for precise handling in code
//! 2. **User-friendly messages** ([`ErrorContext`]) with actionable
//!    suggestions for CLI users
//!
//! Workflows operate on [`anyhow::Result`] with `?` and `.context()`; the
//! typed variants live underneath and are recovered by downcasting in
//! [`user_friendly_error`] just before the process exits.

mod error;

pub use error::{ErrorContext, SplmError, user_friendly_error};
