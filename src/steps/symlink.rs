use std::fs;
use std::os::unix::fs as unix_fs;
use std::path::PathBuf;

use crate::fs::atomic::fsync_parent_dir;
use crate::fs::Scratch;
use crate::steps::MigrationStep;
use crate::types::errors::{Result, StepError};

/// Creates a symbolic link at `link` pointing at `target`.
///
/// An existing `link` is accepted only when it is already the wanted
/// symlink; anything else at that path is a conflict. Rollback removes the
/// link only when it is the symlink this step would have created.
pub struct EnsureSymlink {
    link: PathBuf,
    target: PathBuf,
}

impl EnsureSymlink {
    pub fn new(link: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            link: link.into(),
            target: target.into(),
        }
    }

    fn points_at_target(&self) -> bool {
        fs::read_link(&self.link).is_ok_and(|cur| cur == self.target)
    }
}

impl MigrationStep for EnsureSymlink {
    fn name(&self) -> String {
        format!("symlink:{}->{}", self.link.display(), self.target.display())
    }

    fn path(&self) -> Option<PathBuf> {
        Some(self.link.clone())
    }

    fn run(&self) -> Result<()> {
        match fs::symlink_metadata(&self.link) {
            Ok(md) if md.file_type().is_symlink() => {
                if self.points_at_target() {
                    Ok(())
                } else {
                    Err(StepError::Conflict {
                        path: self.link.clone(),
                        msg: format!(
                            "existing symlink points at {}",
                            fs::read_link(&self.link)
                                .unwrap_or_default()
                                .display()
                        ),
                    })
                }
            }
            Ok(_) => Err(StepError::Conflict {
                path: self.link.clone(),
                msg: "exists and is not a symlink".to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                unix_fs::symlink(&self.target, &self.link)?;
                fsync_parent_dir(&self.link)?;
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn rollback(&self, _scratch: &Scratch) -> Result<()> {
        if let Ok(md) = fs::symlink_metadata(&self.link) {
            if md.file_type().is_symlink() && self.points_at_target() {
                fs::remove_file(&self.link)?;
                fsync_parent_dir(&self.link)?;
            }
        }
        Ok(())
    }
}
