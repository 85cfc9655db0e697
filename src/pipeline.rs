//! The transactional step runner.
//!
//! Steps execute strictly in order. Each one is snapshotted before it
//! runs; the first snapshot or run failure stops the walk, rolls back the
//! failing step and then every completed step in reverse order, and the
//! report carries the original error next to any rollback errors.
use std::time::Instant;

use log::Level;
use serde_json::json;

use crate::fs::Scratch;
use crate::logging::audit::AuditCtx;
use crate::logging::{ts_now, AuditSink, Decision, FactsEmitter, Stage};
use crate::steps::MigrationStep;
use crate::types::ids::{pipeline_id, step_id};
use crate::types::report::RunReport;

pub struct Pipeline<E: FactsEmitter, A: AuditSink> {
    facts: E,
    audit: A,
}

impl<E: FactsEmitter, A: AuditSink> Pipeline<E, A> {
    pub fn new(facts: E, audit: A) -> Self {
        Self { facts, audit }
    }

    /// Execute `steps` in order with all-or-nothing effective semantics.
    ///
    /// The scratch directory for this run is created up front and removed
    /// on every exit path. On full success no rollback is invoked and no
    /// snapshot data survives the call.
    pub fn run(&self, steps: &[Box<dyn MigrationStep>]) -> RunReport {
        let t0 = Instant::now();
        let mut report = RunReport::default();
        let names: Vec<String> = steps.iter().map(|s| s.name()).collect();
        let pid = pipeline_id(&names);
        report.pipeline_uuid = Some(pid);
        let ctx = AuditCtx::new(&self.facts, pid.to_string(), ts_now());

        let scratch = match Scratch::new() {
            Ok(s) => s,
            Err(e) => {
                report.errors.push(format!("scratch: {e}"));
                report.duration_ms = t0.elapsed().as_millis() as u64;
                return report;
            }
        };

        let step_ids: Vec<String> = names
            .iter()
            .enumerate()
            .map(|(idx, name)| step_id(&pid, name, idx).to_string())
            .collect();
        for (idx, step) in steps.iter().enumerate() {
            ctx.event(Stage::Plan)
                .step(step_ids[idx].clone())
                .path(step.path().map(|p| p.display().to_string()))
                .field("name", json!(names[idx]))
                .emit(Decision::Success);
        }

        let mut completed: Vec<usize> = Vec::new();
        for (idx, step) in steps.iter().enumerate() {
            let path = step.path().map(|p| p.display().to_string());
            ctx.event(Stage::ApplyAttempt)
                .step(step_ids[idx].clone())
                .path(path.clone())
                .emit(Decision::Success);
            self.audit
                .log(Level::Info, &format!("applying {}", names[idx]));

            if let Err(e) = step.snapshot(&scratch) {
                ctx.event(Stage::ApplyResult)
                    .step(step_ids[idx].clone())
                    .path(path)
                    .field("error", json!(format!("snapshot: {e}")))
                    .emit(Decision::Failure);
                self.audit
                    .log(Level::Error, &format!("{}: snapshot: {e}", names[idx]));
                report.errors.push(format!("{}: snapshot: {e}", names[idx]));
                // run never executed, nothing of this step to undo
                self.rollback_completed(&ctx, steps, &names, &step_ids, &completed, &scratch, &mut report);
                report.duration_ms = t0.elapsed().as_millis() as u64;
                return report;
            }

            if let Err(e) = step.run() {
                ctx.event(Stage::ApplyResult)
                    .step(step_ids[idx].clone())
                    .path(path)
                    .field("error", json!(e.to_string()))
                    .emit(Decision::Failure);
                self.audit
                    .log(Level::Error, &format!("{}: {e}", names[idx]));
                report.errors.push(format!("{}: {e}", names[idx]));
                report.rolled_back = true;
                // the failing step first; its rollback is idempotent by contract
                self.rollback_one(&ctx, step.as_ref(), &names[idx], &step_ids[idx], &scratch, &mut report);
                self.rollback_completed(&ctx, steps, &names, &step_ids, &completed, &scratch, &mut report);
                report.duration_ms = t0.elapsed().as_millis() as u64;
                return report;
            }

            ctx.event(Stage::ApplyResult)
                .step(step_ids[idx].clone())
                .path(path)
                .emit(Decision::Success);
            completed.push(idx);
            report.executed.push(names[idx].clone());
        }

        report.duration_ms = t0.elapsed().as_millis() as u64;
        report
    }

    #[allow(clippy::too_many_arguments)]
    fn rollback_completed(
        &self,
        ctx: &AuditCtx<'_>,
        steps: &[Box<dyn MigrationStep>],
        names: &[String],
        step_ids: &[String],
        completed: &[usize],
        scratch: &Scratch,
        report: &mut RunReport,
    ) {
        if !completed.is_empty() {
            report.rolled_back = true;
        }
        for &idx in completed.iter().rev() {
            self.rollback_one(ctx, steps[idx].as_ref(), &names[idx], &step_ids[idx], scratch, report);
        }
        let decision = if report.rollback_errors.is_empty() {
            Decision::Success
        } else {
            Decision::Failure
        };
        ctx.event(Stage::RollbackSummary)
            .field("rolled_back_steps", json!(completed.len()))
            .field("rollback_errors", json!(report.rollback_errors.len()))
            .emit(decision);
    }

    fn rollback_one(
        &self,
        ctx: &AuditCtx<'_>,
        step: &dyn MigrationStep,
        name: &str,
        step_id: &str,
        scratch: &Scratch,
        report: &mut RunReport,
    ) {
        let path = step.path().map(|p| p.display().to_string());
        match step.rollback(scratch) {
            Ok(()) => {
                ctx.event(Stage::Rollback)
                    .step(step_id.to_string())
                    .path(path)
                    .emit(Decision::Success);
                self.audit.log(Level::Info, &format!("rolled back {name}"));
            }
            Err(e) => {
                ctx.event(Stage::Rollback)
                    .step(step_id.to_string())
                    .path(path)
                    .field("error", json!(e.to_string()))
                    .emit(Decision::Failure);
                self.audit
                    .log(Level::Error, &format!("{name}: rollback: {e}"));
                report.rollback_errors.push(format!("{name}: rollback: {e}"));
            }
        }
    }
}
