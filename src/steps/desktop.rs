use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use rustix::fs::{chownat, AtFlags, Gid, Uid, CWD};
use std::os::unix::fs::PermissionsExt as _;

use crate::constants::DESKTOP_ENTRY_MODE;
use crate::fs::atomic::fsync_parent_dir;
use crate::fs::scratch::remove_node;
use crate::fs::Scratch;
use crate::steps::MigrationStep;
use crate::types::errors::{Result, StepError};

/// Copies a desktop entry into the user's desktop directory, then fixes
/// ownership (without following symlinks) and mode on the installed copy.
///
/// A failing chown or chmod removes the partial copy before the error is
/// surfaced, so no half-installed entry remains.
pub struct InstallDesktopEntry {
    source: PathBuf,
    target: PathBuf,
    uid: u32,
    gid: u32,
}

impl InstallDesktopEntry {
    pub fn new(source: impl Into<PathBuf>, desktop_dir: &Path, uid: u32, gid: u32) -> Self {
        let source = source.into();
        let name = source
            .file_name()
            .map(OsStr::to_os_string)
            .unwrap_or_default();
        let target = desktop_dir.join(name);
        Self {
            source,
            target,
            uid,
            gid,
        }
    }

    /// Installed location of the entry.
    pub fn target(&self) -> &Path {
        &self.target
    }

    fn install(&self) -> Result<()> {
        fs::copy(&self.source, &self.target)?;
        chownat(
            CWD,
            &self.target,
            Some(Uid::from_raw(self.uid)),
            Some(Gid::from_raw(self.gid)),
            AtFlags::SYMLINK_NOFOLLOW,
        )
        .map_err(|e| StepError::Permission {
            path: self.target.clone(),
            source: std::io::Error::from_raw_os_error(e.raw_os_error()),
        })?;
        fs::set_permissions(&self.target, fs::Permissions::from_mode(DESKTOP_ENTRY_MODE))?;
        fsync_parent_dir(&self.target)?;
        Ok(())
    }
}

impl MigrationStep for InstallDesktopEntry {
    fn name(&self) -> String {
        format!("install-desktop:{}", self.target.display())
    }

    fn path(&self) -> Option<PathBuf> {
        Some(self.target.clone())
    }

    fn run(&self) -> Result<()> {
        self.install().map_err(|e| {
            let _ = remove_node(&self.target);
            e
        })
    }

    fn rollback(&self, _scratch: &Scratch) -> Result<()> {
        remove_node(&self.target)?;
        Ok(())
    }
}
