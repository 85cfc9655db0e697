//! Staged, atomic file replacement helpers.
//!
//! In-place rewrites stage their output in a temporary file inside the
//! target's own directory and rename over the target, so an interrupted
//! rewrite can never leave a truncated file behind.
use std::fs;
use std::io::Write as _;
use std::path::Path;

use tempfile::NamedTempFile;

/// Fsync the parent directory of `path` for durability.
///
/// # Errors
///
/// Returns an IO error if the parent directory cannot be opened or fsynced.
pub fn fsync_parent_dir(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        let dir = fs::File::open(parent)?;
        dir.sync_all()?;
    }
    Ok(())
}

/// Replace the contents of `path` with `bytes` via a staged temp file and
/// rename in the same directory. An existing target keeps its permission
/// mode.
///
/// # Errors
///
/// Returns an IO error if staging, the rename, or the parent fsync fails.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let prior_perm = fs::metadata(path).ok().map(|m| m.permissions());
    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(bytes)?;
    if let Some(perm) = prior_perm {
        tmp.as_file().set_permissions(perm)?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    fsync_parent_dir(path)
}
