//! Deterministic UUIDv5 identifiers for pipelines and steps.
//!
//! The UUID namespace is derived from a stable tag (`NS_TAG`) so that
//! `pipeline_id` and `step_id` are reproducible across runs of the same
//! step sequence, which keeps the facts stream joinable across retries.
use std::fmt::Write;

use uuid::Uuid;

use crate::constants::NS_TAG;

fn namespace() -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, NS_TAG.as_bytes())
}

/// Compute a deterministic UUIDv5 for a pipeline from its step names in
/// order. Two pipelines with identical step sequences have the same id.
#[must_use]
pub fn pipeline_id(step_names: &[String]) -> Uuid {
    let ns = namespace();
    let mut s = String::new();
    for name in step_names {
        s.push_str(name);
        s.push('\n');
    }
    Uuid::new_v5(&ns, s.as_bytes())
}

/// Compute a deterministic UUIDv5 for a step as a function of the pipeline
/// id, the step's name, and its stable position index.
#[must_use]
pub fn step_id(pipeline_id: &Uuid, name: &str, idx: usize) -> Uuid {
    let mut s = name.to_string();
    let _ = write!(s, "#{idx}");
    Uuid::new_v5(pipeline_id, s.as_bytes())
}
