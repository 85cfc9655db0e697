//! Stage-scoped fact emission with a minimal shared envelope.
//!
//! Every fact carries `schema_version`, `ts`, `pipeline_id`, and `path` so
//! downstream consumers can join all rows of one run.
use serde_json::{json, Value};

use crate::logging::FactsEmitter;

pub(crate) const SCHEMA_VERSION: i64 = 1;

const SUBSYSTEM: &str = "turntable";

/// RFC 3339 timestamp for fact envelopes.
#[must_use]
pub fn ts_now() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

/// Stage for typed audit emission.
#[derive(Clone, Copy, Debug)]
pub enum Stage {
    Plan,
    ApplyAttempt,
    ApplyResult,
    Rollback,
    RollbackSummary,
}

impl Stage {
    fn as_event(self) -> &'static str {
        match self {
            Stage::Plan => "plan",
            Stage::ApplyAttempt => "apply.attempt",
            Stage::ApplyResult => "apply.result",
            Stage::Rollback => "rollback",
            Stage::RollbackSummary => "rollback.summary",
        }
    }
}

/// Decision severity for audit events.
#[derive(Clone, Copy, Debug)]
pub enum Decision {
    Success,
    Failure,
    Warn,
}

impl Decision {
    fn as_str(self) -> &'static str {
        match self {
            Decision::Success => "success",
            Decision::Failure => "failure",
            Decision::Warn => "warn",
        }
    }
}

pub(crate) struct AuditCtx<'a> {
    facts: &'a dyn FactsEmitter,
    pipeline_id: String,
    ts: String,
}

impl<'a> AuditCtx<'a> {
    pub(crate) fn new(facts: &'a dyn FactsEmitter, pipeline_id: String, ts: String) -> Self {
        Self {
            facts,
            pipeline_id,
            ts,
        }
    }

    pub(crate) fn event(&'a self, stage: Stage) -> EventBuilder<'a> {
        EventBuilder::new(self, stage)
    }
}

/// Builder over fact emission with a centralized envelope.
pub(crate) struct EventBuilder<'a> {
    ctx: &'a AuditCtx<'a>,
    stage: Stage,
    fields: serde_json::Map<String, Value>,
}

impl<'a> EventBuilder<'a> {
    fn new(ctx: &'a AuditCtx<'a>, stage: Stage) -> Self {
        let mut fields = serde_json::Map::new();
        fields.insert("stage".to_string(), json!(stage.as_event()));
        Self { ctx, stage, fields }
    }

    pub(crate) fn step(mut self, step_id: impl Into<String>) -> Self {
        self.fields.insert("step_id".into(), json!(step_id.into()));
        self
    }

    pub(crate) fn path(mut self, path: Option<String>) -> Self {
        if let Some(p) = path {
            self.fields.insert("path".into(), json!(p));
        }
        self
    }

    pub(crate) fn field(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    pub(crate) fn emit(self, decision: Decision) {
        let mut fields = self.fields;
        fields
            .entry("schema_version")
            .or_insert(json!(SCHEMA_VERSION));
        fields.entry("ts").or_insert(json!(self.ctx.ts));
        fields
            .entry("pipeline_id")
            .or_insert(json!(self.ctx.pipeline_id));
        fields.entry("path").or_insert(json!(""));
        fields.entry("decision").or_insert(json!(decision.as_str()));
        self.ctx.facts.emit(
            SUBSYSTEM,
            self.stage.as_event(),
            decision.as_str(),
            Value::Object(fields),
        );
    }
}
