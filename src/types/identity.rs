//! Resolved target identity for a migration run.
//!
//! The crate never queries the passwd or group databases itself; the
//! orchestrator resolves the GUI account once and passes it in.
use std::path::PathBuf;

/// The OS account whose home directory the migration rewrites.
#[derive(Clone, Debug)]
pub struct GuiUser {
    pub name: String,
    pub home: PathBuf,
    pub uid: u32,
    pub gid: u32,
}
