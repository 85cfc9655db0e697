//! Migration step abstraction and the concrete step variants.
//!
//! A step's lifecycle is `snapshot` → `run` → (when a later step fails)
//! `rollback`. `snapshot` and `rollback` default to no-ops so steps without
//! reversible state implement only `run`.
pub mod absent;
pub mod block;
pub mod desktop;
pub mod move_entry;
pub mod symlink;
pub mod timer;

pub use absent::EnsureAbsent;
pub use block::RemoveBlock;
pub use desktop::InstallDesktopEntry;
pub use move_entry::MoveEntry;
pub use symlink::EnsureSymlink;
pub use timer::EnableUserTimer;

use std::path::PathBuf;

use crate::fs::Scratch;
use crate::types::errors::Result;

/// One reversible unit of a migration pipeline.
///
/// Contract: after `snapshot(); run(); rollback()` every path the step
/// touches is bit-for-bit and mode-for-mode what it was before `run`,
/// except where a step documents an accepted asymmetry. `rollback` must be
/// idempotent: the runner may invoke it on a step whose `run` only
/// partially applied.
pub trait MigrationStep {
    /// Step name used in facts and run reports.
    fn name(&self) -> String;

    /// Primary path the step mutates, for facts. `None` for steps whose
    /// effect lives outside the filesystem.
    fn path(&self) -> Option<PathBuf> {
        None
    }

    /// Capture enough state into `scratch` to undo `run`.
    ///
    /// # Errors
    ///
    /// Any error here aborts the pipeline before `run` executes.
    fn snapshot(&self, scratch: &Scratch) -> Result<()> {
        let _ = scratch;
        Ok(())
    }

    /// Apply the step's mutation. Must either fully succeed or leave the
    /// touched paths in their pre-run state.
    ///
    /// # Errors
    ///
    /// Any error triggers rollback of this step and all prior ones.
    fn run(&self) -> Result<()>;

    /// Undo `run` using `scratch`.
    ///
    /// # Errors
    ///
    /// A rollback error is pipeline-fatal: it leaves host state ambiguous
    /// and is surfaced next to the original failure.
    fn rollback(&self, scratch: &Scratch) -> Result<()> {
        let _ = scratch;
        Ok(())
    }
}
