//! Critical path scheduling.
//!
//! Forward pass (earliest start/finish), deadline reconciliation, backward
//! pass (latest start/finish), and slack over a plan's dependency graph.
//! All offsets are whole days, 1-based from the plan start date.

mod calculation;
mod types;

pub use calculation::{
    backward_pass, calculate_critical_path, day_offset, forward_pass, reconcile_deadline,
    CriticalPathResult, ForwardPass, TaskData,
};
pub use types::{Offset, TaskTiming};
