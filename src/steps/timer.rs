use std::sync::Arc;

use crate::adapters::ServiceManager;
use crate::steps::MigrationStep;
use crate::types::errors::Result;

/// Reloads the service-manager configuration and enables the named
/// per-user timer unit.
///
/// Irreversible: there is no snapshot and no rollback, and command
/// failures are reported through the audit log rather than propagated.
/// Order one of these only as the final step of a pipeline — a failure in
/// any later step could not undo what the scheduler already observed.
pub struct EnableUserTimer {
    user: String,
    unit: String,
    manager: Arc<dyn ServiceManager>,
}

impl EnableUserTimer {
    pub fn new(
        user: impl Into<String>,
        unit: impl Into<String>,
        manager: Arc<dyn ServiceManager>,
    ) -> Self {
        Self {
            user: user.into(),
            unit: unit.into(),
            manager,
        }
    }
}

impl MigrationStep for EnableUserTimer {
    fn name(&self) -> String {
        format!("enable-timer:{}", self.unit)
    }

    fn run(&self) -> Result<()> {
        if let Err(e) = self.manager.daemon_reload() {
            log::warn!("daemon-reload failed: {e}");
        }
        if let Err(e) = self.manager.enable_user_timer(&self.user, &self.unit) {
            log::warn!(
                "enable --now {} for {} failed: {e}",
                self.unit,
                self.user
            );
        }
        Ok(())
    }
}
