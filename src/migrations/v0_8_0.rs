//! Layout upgrade for the 0.8.0 release.
//!
//! The launcher directory becomes the updater directory, login-time
//! desktop entries are replaced by the installed updater entry, the notify
//! cron block leaves the system crontab, and a per-user timer takes over
//! scheduling.
use std::path::Path;
use std::sync::Arc;

use crate::adapters::ServiceManager;
use crate::constants::{
    APPLICATIONS_DIR, CRON_BLOCK_BEGIN, CRON_BLOCK_END, CRON_BLOCK_INNER, LEGACY_AUTOSTART_FILE,
    LEGACY_LAUNCHER_DESKTOP_FILE, NOTIFY_TIMER_UNIT, SYSTEM_CRONTAB, UPDATER_DESKTOP_FILE,
};
use crate::steps::{
    EnableUserTimer, EnsureAbsent, EnsureSymlink, InstallDesktopEntry, MigrationStep, MoveEntry,
    RemoveBlock,
};
use crate::types::identity::GuiUser;

/// Ordered step list with all paths resolved against `user`. The timer
/// step is last by contract: it is irreversible.
pub fn steps(user: &GuiUser, manager: Arc<dyn ServiceManager>) -> Vec<Box<dyn MigrationStep>> {
    steps_with_roots(
        user,
        manager,
        Path::new(APPLICATIONS_DIR),
        Path::new(SYSTEM_CRONTAB),
    )
}

/// Same as [`steps`] with the system locations overridable, for tests.
pub fn steps_with_roots(
    user: &GuiUser,
    manager: Arc<dyn ServiceManager>,
    applications_dir: &Path,
    crontab: &Path,
) -> Vec<Box<dyn MigrationStep>> {
    let desktop = user.home.join("Desktop");
    let autostart = user.home.join(".config").join("autostart");
    let app_entry = applications_dir.join(UPDATER_DESKTOP_FILE);
    vec![
        Box::new(EnsureAbsent::new(desktop.join(LEGACY_LAUNCHER_DESKTOP_FILE))),
        Box::new(EnsureAbsent::new(autostart.join(LEGACY_AUTOSTART_FILE))),
        Box::new(MoveEntry::new(
            user.home.join(".securedrop_launcher"),
            user.home.join(".securedrop_updater"),
        )),
        Box::new(EnsureSymlink::new(
            autostart.join(UPDATER_DESKTOP_FILE),
            app_entry.clone(),
        )),
        Box::new(InstallDesktopEntry::new(
            app_entry, &desktop, user.uid, user.gid,
        )),
        Box::new(RemoveBlock::new(
            crontab,
            CRON_BLOCK_BEGIN,
            CRON_BLOCK_INNER,
            CRON_BLOCK_END,
        )),
        Box::new(EnableUserTimer::new(
            user.name.clone(),
            NOTIFY_TIMER_UNIT,
            manager,
        )),
    ]
}
