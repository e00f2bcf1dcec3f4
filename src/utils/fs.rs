//! File system helpers shared by every artifact editor.
//!
//! All three persisted artifacts (manifest, feature model, registry) are
//! rewritten in full on every mutation. [`atomic_write`] makes that
//! rewrite crash-safe: content goes to a temporary sibling first, is
//! synced, and then renamed over the destination, so a reader never
//! observes a truncated artifact.

use crate::core::SplmError;
use std::fs;
use std::path::Path;

/// Create a directory and all of its parents if missing.
pub fn ensure_dir(path: &Path) -> Result<(), SplmError> {
    fs::create_dir_all(path).map_err(|source| SplmError::ResourceWrite {
        path: path.display().to_string(),
        source,
    })
}

/// Write `content` to `path` atomically (temp file + fsync + rename).
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<(), SplmError> {
    use std::io::Write;

    let write_err = |source: std::io::Error| SplmError::ResourceWrite {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir(parent)?;
        }
    }

    let temp_path = path.with_extension("tmp");

    {
        let mut file = fs::File::create(&temp_path).map_err(write_err)?;
        file.write_all(content).map_err(write_err)?;
        file.sync_all().map_err(write_err)?;
    }

    fs::rename(&temp_path, path).map_err(write_err)
}

/// Read a UTF-8 text file, mapping failures to [`SplmError::ResourceRead`].
pub fn read_text(path: &Path) -> Result<String, SplmError> {
    fs::read_to_string(path).map_err(|source| SplmError::ResourceRead {
        path: path.display().to_string(),
        source,
    })
}

/// Read a UTF-8 text file, returning `None` when it does not exist.
pub fn read_text_optional(path: &Path) -> Result<Option<String>, SplmError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => {
            Err(SplmError::ResourceRead { path: path.display().to_string(), source })
        }
    }
}
