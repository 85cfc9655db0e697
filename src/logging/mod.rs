pub mod audit;
pub mod facts;

pub use audit::{ts_now, Decision, Stage};
pub use facts::{AuditSink, FactsEmitter, JsonlSink};
