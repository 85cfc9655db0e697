use uuid::Uuid;

/// Outcome of one pipeline execution.
#[derive(Clone, Debug, Default)]
pub struct RunReport {
    /// Deterministic id of the executed pipeline.
    pub pipeline_uuid: Option<Uuid>,
    /// Names of steps whose `run` completed, in execution order.
    pub executed: Vec<String>,
    pub duration_ms: u64,
    /// The first snapshot/run failure, rendered with its step name.
    pub errors: Vec<String>,
    /// True when a failure triggered reverse-order rollback.
    pub rolled_back: bool,
    /// Rollback failures. Non-empty means the host state is ambiguous and
    /// the migration requires manual intervention.
    pub rollback_errors: Vec<String>,
}

impl RunReport {
    /// True iff every step ran and no rollback was needed or failed.
    #[must_use]
    pub fn ok(&self) -> bool {
        self.errors.is_empty() && self.rollback_errors.is_empty()
    }
}
