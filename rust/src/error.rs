//! Typed failures returned by the timeline engine.

use thiserror::Error;

/// Errors that terminate a scheduling run.
///
/// Window overflow is deliberately absent: an over-budget plan is reported
/// through `feasible`/`overflow` in the plan metadata instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Total duration must be > 0 days (got {0})")]
    InvalidDuration(i64),
    #[error("Task id duplicate or missing: {0:?}")]
    DuplicateTaskId(String),
    #[error("Dependency references unknown task: {from} -> {to}")]
    UnknownDependencyReference { from: String, to: String },
    #[error("Cycle detected in dependencies involving: {0:?}")]
    CycleDetected(Vec<String>),
    #[error("Schedule invalid: {}", .0.join("; "))]
    InvalidSchedule(Vec<String>),
    #[error("Invalid plan document: {0}")]
    InvalidInput(String),
}

impl ScheduleError {
    /// Stable machine-readable code for this failure kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidDuration(_) => "INVALID_DURATION",
            Self::DuplicateTaskId(_) => "DUPLICATE_TASK_ID",
            Self::UnknownDependencyReference { .. } => "UNKNOWN_DEPENDENCY_REFERENCE",
            Self::CycleDetected(_) => "CYCLE_DETECTED",
            Self::InvalidSchedule(_) => "INVALID_SCHEDULE",
            Self::InvalidInput(_) => "INVALID_INPUT",
        }
    }
}

impl From<serde_json::Error> for ScheduleError {
    fn from(err: serde_json::Error) -> Self {
        ScheduleError::InvalidInput(err.to_string())
    }
}
