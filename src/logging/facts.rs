use log::Level;
use serde_json::Value;

/// Structured per-stage facts; one JSON object per pipeline event.
pub trait FactsEmitter {
    fn emit(&self, subsystem: &str, event: &str, decision: &str, fields: Value);
}

/// Human-readable audit lines.
pub trait AuditSink {
    fn log(&self, level: Level, msg: &str);
}

/// Default sink: facts as JSON lines and audit text through the `log`
/// facade.
#[derive(Default)]
pub struct JsonlSink;

impl FactsEmitter for JsonlSink {
    fn emit(&self, subsystem: &str, _event: &str, _decision: &str, fields: Value) {
        log::info!(target: "turntable::facts", "{subsystem} {fields}");
    }
}

impl AuditSink for JsonlSink {
    fn log(&self, level: Level, msg: &str) {
        log::log!(level, "{msg}");
    }
}
