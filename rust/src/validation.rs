//! Post-condition checks on a finished schedule.

use rustc_hash::FxHashMap;

use crate::error::ScheduleError;
use crate::models::{Edge, ScheduleEntry};

/// Verify that every entry has `end >= start` and every edge `(a, b)` has
/// `end(a) <= start(b)`.
///
/// All violations are collected before returning, so the error lists every
/// broken constraint rather than the first.
pub fn validate_schedule(entries: &[ScheduleEntry], edges: &[Edge]) -> Result<(), ScheduleError> {
    let by_id: FxHashMap<&str, &ScheduleEntry> =
        entries.iter().map(|e| (e.task_id.as_str(), e)).collect();
    let mut violations = Vec::new();

    for entry in entries {
        if entry.end_date < entry.start_date {
            violations.push(format!(
                "Negative duration for {}: {} ends before it starts ({})",
                entry.task_id, entry.end_date, entry.start_date
            ));
        }
    }

    for edge in edges {
        match (by_id.get(edge.from.as_str()), by_id.get(edge.to.as_str())) {
            (Some(a), Some(b)) => {
                if a.end_date > b.start_date {
                    violations.push(format!(
                        "Dependency inversion: {} ends {} after {} starts {}",
                        edge.from, a.end_date, edge.to, b.start_date
                    ));
                }
            }
            _ => violations.push(format!(
                "Missing schedule entry for dependency {} -> {}",
                edge.from, edge.to
            )),
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ScheduleError::InvalidSchedule(violations))
    }
}
