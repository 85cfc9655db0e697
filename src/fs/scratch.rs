//! Per-run scratch directory holding pre-mutation snapshots.
//!
//! Each snapshotted path is captured as a payload entry plus a JSON sidecar
//! manifest recording what kind of node existed, its permission mode, and a
//! SHA-256 payload hash for regular files. An absent path records a `none`
//! tombstone so restore knows to delete rather than overwrite. The scratch
//! directory lives for exactly one pipeline execution; dropping [`Scratch`]
//! removes it on every exit path.
use std::fs;
use std::os::unix::fs as unix_fs;
use std::os::unix::fs::PermissionsExt as _;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::TempDir;

use crate::constants::MANIFEST_SUFFIX;
use crate::fs::atomic::fsync_parent_dir;
use crate::fs::meta::{kind_of, sha256_hex_of};
use crate::types::errors::{Result, StepError};

/// Sidecar manifest written next to each snapshot payload.
#[derive(Debug, Deserialize, Serialize)]
pub struct SnapshotManifest {
    pub schema: String,
    /// `file` | `symlink` | `dir` | `none`
    pub prior_kind: String,
    pub mode: Option<u32>,
    pub prior_dest: Option<String>,
    pub payload_hash: Option<String>,
}

const MANIFEST_SCHEMA: &str = "scratch_meta.v1";

/// Owner of the per-run snapshot area. Write-once per path per run.
pub struct Scratch {
    dir: TempDir,
}

impl Scratch {
    /// Create the scratch directory for one pipeline execution.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the directory cannot be created.
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: TempDir::new()?,
        })
    }

    /// Flat scratch entry name derived from the path's absolute location.
    fn entry_key(path: &Path) -> String {
        path.to_string_lossy()
            .trim_start_matches('/')
            .replace('/', "%")
    }

    fn payload_path(&self, path: &Path) -> PathBuf {
        self.dir.path().join(Self::entry_key(path))
    }

    fn manifest_path(&self, path: &Path) -> PathBuf {
        self.dir
            .path()
            .join(format!("{}{MANIFEST_SUFFIX}", Self::entry_key(path)))
    }

    /// Capture the current state of `path` into the scratch directory.
    ///
    /// Regular files are copied byte-for-byte with their mode and payload
    /// hash recorded; symlinks are re-created in the scratch area pointing
    /// at the same destination (never followed); directories are copied
    /// recursively preserving the symlink-vs-file distinction per entry.
    ///
    /// # Errors
    ///
    /// `InternalConsistency` if `path` was already snapshotted this run;
    /// `Io` on any copy failure.
    pub fn snapshot(&self, path: &Path) -> Result<()> {
        let manifest_path = self.manifest_path(path);
        if manifest_path.exists() {
            return Err(StepError::InternalConsistency(format!(
                "{} snapshotted twice in one run",
                path.display()
            )));
        }
        let payload = self.payload_path(path);
        let manifest = match kind_of(path).as_str() {
            "missing" => SnapshotManifest {
                schema: MANIFEST_SCHEMA.to_string(),
                prior_kind: "none".to_string(),
                mode: None,
                prior_dest: None,
                payload_hash: None,
            },
            "symlink" => {
                let dest = fs::read_link(path)?;
                unix_fs::symlink(&dest, &payload)?;
                SnapshotManifest {
                    schema: MANIFEST_SCHEMA.to_string(),
                    prior_kind: "symlink".to_string(),
                    mode: None,
                    prior_dest: Some(dest.to_string_lossy().into_owned()),
                    payload_hash: None,
                }
            }
            "dir" => {
                copy_tree(path, &payload)?;
                let mode = fs::symlink_metadata(path)?.permissions().mode();
                SnapshotManifest {
                    schema: MANIFEST_SCHEMA.to_string(),
                    prior_kind: "dir".to_string(),
                    mode: Some(mode),
                    prior_dest: None,
                    payload_hash: None,
                }
            }
            _ => {
                fs::copy(path, &payload)?;
                let mode = fs::metadata(path)?.permissions().mode();
                SnapshotManifest {
                    schema: MANIFEST_SCHEMA.to_string(),
                    prior_kind: "file".to_string(),
                    mode: Some(mode),
                    prior_dest: None,
                    payload_hash: sha256_hex_of(&payload),
                }
            }
        };
        let body = serde_json::to_vec_pretty(&manifest).map_err(|e| {
            StepError::InternalConsistency(format!("manifest serialize failed: {e}"))
        })?;
        fs::write(&manifest_path, body)?;
        Ok(())
    }

    /// Restore `path` to its snapshotted state.
    ///
    /// A `none` tombstone deletes whatever is now at `path`; a `file`
    /// payload is hash-verified, copied back, and has its recorded mode
    /// re-applied; a `symlink` is re-pointed; a `dir` tree replaces the
    /// live one.
    ///
    /// # Errors
    ///
    /// `InternalConsistency` when no snapshot exists for `path` (restore
    /// without a prior snapshot, fatal by contract) or the payload fails
    /// hash verification; `Io` on any copy failure.
    pub fn restore(&self, path: &Path) -> Result<()> {
        let manifest_path = self.manifest_path(path);
        let body = fs::read(&manifest_path).map_err(|_| {
            StepError::InternalConsistency(format!(
                "restore of {} without a prior snapshot",
                path.display()
            ))
        })?;
        let manifest: SnapshotManifest = serde_json::from_slice(&body).map_err(|e| {
            StepError::InternalConsistency(format!(
                "manifest for {} unreadable: {e}",
                path.display()
            ))
        })?;
        let payload = self.payload_path(path);
        match manifest.prior_kind.as_str() {
            "none" => {
                remove_node(path)?;
            }
            "symlink" => {
                let dest = manifest.prior_dest.ok_or_else(|| {
                    StepError::InternalConsistency(format!(
                        "symlink manifest for {} lacks a destination",
                        path.display()
                    ))
                })?;
                remove_node(path)?;
                unix_fs::symlink(dest, path)?;
            }
            "dir" => {
                remove_node(path)?;
                copy_tree(&payload, path)?;
            }
            "file" => {
                if let Some(ref expected) = manifest.payload_hash {
                    match sha256_hex_of(&payload) {
                        Some(actual) if actual == *expected => {}
                        _ => {
                            return Err(StepError::InternalConsistency(format!(
                                "snapshot payload for {} failed hash verification",
                                path.display()
                            )))
                        }
                    }
                }
                remove_node(path)?;
                fs::copy(&payload, path)?;
                if let Some(mode) = manifest.mode {
                    fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
                }
            }
            other => {
                return Err(StepError::InternalConsistency(format!(
                    "unknown prior_kind {other:?} for {}",
                    path.display()
                )))
            }
        }
        fsync_parent_dir(path)?;
        Ok(())
    }
}

/// Delete whatever node is at `path`; absent is success.
pub(crate) fn remove_node(path: &Path) -> std::io::Result<()> {
    match fs::symlink_metadata(path) {
        Ok(md) if md.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Recursive copy preserving the symlink-vs-file distinction and the
/// directory mode.
fn copy_tree(src: &Path, dst: &Path) -> std::io::Result<()> {
    fs::create_dir(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let ft = entry.file_type()?;
        let to = dst.join(entry.file_name());
        if ft.is_symlink() {
            let dest = fs::read_link(entry.path())?;
            unix_fs::symlink(dest, &to)?;
        } else if ft.is_dir() {
            copy_tree(&entry.path(), &to)?;
        } else {
            fs::copy(entry.path(), &to)?;
        }
    }
    let mode = fs::metadata(src)?.permissions().mode();
    fs::set_permissions(dst, fs::Permissions::from_mode(mode))
}
