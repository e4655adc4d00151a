//! Types for critical path scheduling.

/// Day offset from the plan start; offset 1 is the start date itself.
pub type Offset = i64;

/// Per-task timing information for critical path calculation.
///
/// Finish offsets are inclusive: a one-day task starting at offset 4 has
/// `earliest_finish == 4`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TaskTiming {
    /// Earliest possible start (forward pass, after deadline reconciliation).
    pub earliest_start: Offset,
    /// Earliest possible finish (forward pass, after deadline reconciliation).
    pub earliest_finish: Offset,
    /// Latest allowable start (backward pass).
    pub latest_start: Offset,
    /// Latest allowable finish (backward pass).
    pub latest_finish: Offset,
    /// Slack = latest_start - earliest_start.
    pub slack: Offset,
}

impl TaskTiming {
    pub fn is_critical(&self) -> bool {
        self.slack == 0
    }
}
