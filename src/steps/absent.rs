use std::path::PathBuf;

use crate::fs::scratch::remove_node;
use crate::steps::MigrationStep;
use crate::types::errors::Result;

/// Idempotently deletes a path; already-absent is success.
///
/// Rollback is intentionally empty: if the pipeline fails after this step,
/// the removed path is not restored. Callers accept that asymmetry when
/// they order one of these into a pipeline.
pub struct EnsureAbsent {
    path: PathBuf,
}

impl EnsureAbsent {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MigrationStep for EnsureAbsent {
    fn name(&self) -> String {
        format!("absent:{}", self.path.display())
    }

    fn path(&self) -> Option<PathBuf> {
        Some(self.path.clone())
    }

    fn run(&self) -> Result<()> {
        remove_node(&self.path)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn removes_file_and_is_idempotent() {
        let td = tempfile::tempdir().unwrap();
        let p = td.path().join("stale.desktop");
        std::fs::write(&p, b"x").unwrap();

        let step = EnsureAbsent::new(&p);
        step.run().unwrap();
        assert!(!p.exists());
        // second run on the now-absent path still succeeds
        step.run().unwrap();
    }

    #[test]
    fn removes_directory_tree() {
        let td = tempfile::tempdir().unwrap();
        let d = td.path().join("stale-dir");
        std::fs::create_dir(&d).unwrap();
        std::fs::write(d.join("inner"), b"x").unwrap();

        EnsureAbsent::new(&d).run().unwrap();
        assert!(!d.exists());
    }
}
