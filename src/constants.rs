//! Shared crate-wide constants.
//!
//! Centralizes magic values used across modules. Adjusting these here will
//! propagate through the crate.

/// Sidecar filename suffix for snapshot manifests in the scratch directory.
/// Example entry pair: `etc%crontab` and `etc%crontab.meta.json`.
pub const MANIFEST_SUFFIX: &str = ".meta.json";

/// UUIDv5 namespace tag for deterministic pipeline/step IDs.
pub const NS_TAG: &str = "https://turntable/migration";

/// Mode bits applied to an installed desktop entry.
pub const DESKTOP_ENTRY_MODE: u32 = 0o755;

/// System directory holding installed application desktop entries.
pub const APPLICATIONS_DIR: &str = "/usr/share/applications";

/// System-wide scheduled-task table edited by the 0.8.0 migration.
pub const SYSTEM_CRONTAB: &str = "/etc/crontab";

/// First line of the workstation block inside the system crontab.
pub const CRON_BLOCK_BEGIN: &str = "### BEGIN securedrop-workstation ###";

/// Marker required on the line after the begin marker; a begin line not
/// followed by this is a foreign block and passes through untouched.
pub const CRON_BLOCK_INNER: &str = "/opt/securedrop/launcher/sdw-notify.py";

/// Last line of the workstation block.
pub const CRON_BLOCK_END: &str = "### END securedrop-workstation ###";

/// Per-user timer unit that replaces the cron entry as of 0.8.0.
pub const NOTIFY_TIMER_UNIT: &str = "sdw-notify.timer";

/// Installed desktop entry name for the updater.
pub const UPDATER_DESKTOP_FILE: &str = "press.freedom.SecureDropUpdater.desktop";

/// Legacy launcher desktop shortcut removed by the 0.8.0 migration.
pub const LEGACY_LAUNCHER_DESKTOP_FILE: &str = "securedrop-launcher.desktop";

/// Legacy login-time autostart entry removed by the 0.8.0 migration.
pub const LEGACY_AUTOSTART_FILE: &str = "SDWLogin.desktop";
