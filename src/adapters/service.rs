use std::process::Command;

use crate::types::errors::{Result, StepError};

/// Scheduler operations the timer step needs.
pub trait ServiceManager: Send + Sync {
    /// Reload the service manager's unit configuration.
    fn daemon_reload(&self) -> Result<()>;

    /// Enable and immediately start a per-user timer unit, running as the
    /// given account.
    fn enable_user_timer(&self, user: &str, unit: &str) -> Result<()>;
}

/// systemd-backed implementation. Commands are spawned with explicit
/// argument lists; nothing is ever passed through a shell.
#[derive(Clone, Copy, Debug, Default)]
pub struct Systemctl;

fn run_checked(cmd: &mut Command) -> Result<()> {
    let status = cmd.status()?;
    if status.success() {
        Ok(())
    } else {
        Err(StepError::Io(std::io::Error::other(format!(
            "{cmd:?} exited with {status}"
        ))))
    }
}

impl ServiceManager for Systemctl {
    fn daemon_reload(&self) -> Result<()> {
        run_checked(Command::new("systemctl").arg("daemon-reload"))
    }

    fn enable_user_timer(&self, user: &str, unit: &str) -> Result<()> {
        run_checked(Command::new("runuser").args([
            "-u", user, "--", "systemctl", "--user", "enable", "--now", unit,
        ]))
    }
}
