//! Manifest file I/O.
//!
//! The output is first written to a sibling staging file and then renamed
//! over the target, so a failed run never leaves a half-written manifest
//! behind. Input and output may be the same path.

use crate::error::{FixerError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Reads a manifest as UTF-8.
pub fn read_manifest(path: &Path) -> Result<String> {
    log::debug!("Reading manifest: {}", path.display());
    fs::read_to_string(path).map_err(|e| {
        FixerError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to read {}: {}", path.display(), e),
        ))
    })
}

/// Path of the staging file used while writing `target`.
fn staging_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "manifest".to_string());
    target.with_file_name(format!(".{}.tmp", name))
}

/// Replaces the contents of `path` with `content`.
///
/// # Errors
///
/// - `Io`: the staging file cannot be written or renamed; the staging file
///   is removed and `path` is left as it was
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let staging = staging_path(path);
    log::debug!("Staging output: {}", staging.display());

    let result = fs::write(&staging, content).and_then(|_| fs::rename(&staging, path));
    if let Err(e) = result {
        if staging.exists() {
            if let Err(cleanup) = fs::remove_file(&staging) {
                log::warn!("Failed to remove {}: {}", staging.display(), cleanup);
            }
        }
        return Err(FixerError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to write {}: {}", path.display(), e),
        )));
    }

    log::debug!("Updated: {}", path.display());
    Ok(())
}
