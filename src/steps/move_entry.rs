use std::fs;
use std::path::PathBuf;

use crate::fs::atomic::fsync_parent_dir;
use crate::fs::Scratch;
use crate::steps::MigrationStep;
use crate::types::errors::{Result, StepError};

/// Renames a filesystem entry to its new location.
///
/// Re-running after a completed move succeeds trivially: a missing source
/// with the destination in place is treated as already migrated.
pub struct MoveEntry {
    source: PathBuf,
    dest: PathBuf,
}

impl MoveEntry {
    pub fn new(source: impl Into<PathBuf>, dest: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            dest: dest.into(),
        }
    }
}

impl MigrationStep for MoveEntry {
    fn name(&self) -> String {
        format!("move:{}->{}", self.source.display(), self.dest.display())
    }

    fn path(&self) -> Option<PathBuf> {
        Some(self.dest.clone())
    }

    fn run(&self) -> Result<()> {
        let source_present = fs::symlink_metadata(&self.source).is_ok();
        let dest_present = fs::symlink_metadata(&self.dest).is_ok();
        match (source_present, dest_present) {
            (false, true) => Ok(()),
            (false, false) => Err(StepError::NotFound(self.source.clone())),
            (true, true) => Err(StepError::Conflict {
                path: self.dest.clone(),
                msg: "destination already exists".to_string(),
            }),
            (true, false) => {
                fs::rename(&self.source, &self.dest)?;
                fsync_parent_dir(&self.dest)?;
                Ok(())
            }
        }
    }

    fn rollback(&self, _scratch: &Scratch) -> Result<()> {
        let source_present = fs::symlink_metadata(&self.source).is_ok();
        let dest_present = fs::symlink_metadata(&self.dest).is_ok();
        if dest_present && !source_present {
            fs::rename(&self.dest, &self.source)?;
            fsync_parent_dir(&self.source)?;
        }
        Ok(())
    }
}
