//! Cross-platform utility functions.

pub mod fs;
