//! Window clamp: fit scheduled offsets into the requested duration window
//! and convert them to calendar dates.

use chrono::{NaiveDate, TimeDelta};

use crate::critical_path::{Offset, TaskTiming};
use crate::error::ScheduleError;
use crate::graph::{DependencyGraph, TaskIdx};
use crate::log_changes;
use crate::models::ScheduleEntry;

/// Offsets after clamping, indexed by graph index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClampedOffsets {
    pub starts: Vec<Offset>,
    pub finishes: Vec<Offset>,
    /// Tasks whose finish exceeded the window, in topological order.
    pub overflow: Vec<TaskIdx>,
}

impl ClampedOffsets {
    pub fn feasible(&self) -> bool {
        self.overflow.is_empty()
    }
}

/// Force every task finishing after `window_days` to finish on the last
/// day of the window.
///
/// A clamped task keeps as much of its duration as fits, but never starts
/// before its predecessors' (clamped) finish, so the result still respects
/// `end(pred) <= start(succ)`. Overflow is reported, never an error.
pub fn clamp_to_window(
    graph: &DependencyGraph,
    timings: &[TaskTiming],
    durations: &[Offset],
    window_days: Offset,
    verbosity: u8,
) -> ClampedOffsets {
    let mut starts: Vec<Offset> = timings.iter().map(|t| t.earliest_start).collect();
    let mut finishes: Vec<Offset> = timings.iter().map(|t| t.earliest_finish).collect();
    let mut overflow = Vec::new();

    for &idx in graph.order() {
        if finishes[idx] <= window_days {
            continue;
        }

        let pred_floor = graph
            .predecessors(idx)
            .iter()
            .map(|&p| finishes[p])
            .max()
            .unwrap_or(1);
        let finish = window_days;
        let start = (finish - durations[idx] + 1).max(pred_floor).max(1);

        log_changes!(
            verbosity,
            "{} overflows window (day {} > {}); clamped to days {}..{}",
            graph.id_of(idx),
            finishes[idx],
            window_days,
            start,
            finish
        );

        starts[idx] = start;
        finishes[idx] = finish;
        overflow.push(idx);
    }

    ClampedOffsets {
        starts,
        finishes,
        overflow,
    }
}

/// Calendar date for a 1-based offset, or `None` past chrono's date range.
pub fn offset_to_date(start: NaiveDate, offset: Offset) -> Option<NaiveDate> {
    start.checked_add_signed(TimeDelta::try_days(offset.checked_sub(1)?)?)
}

/// Build one schedule entry per task, in topological order.
///
/// Offsets that land outside the representable calendar are reported as an
/// invalid schedule rather than wrapped or saturated.
pub fn to_schedule_entries(
    graph: &DependencyGraph,
    offsets: &ClampedOffsets,
    plan_start: NaiveDate,
) -> Result<Vec<ScheduleEntry>, ScheduleError> {
    graph
        .order()
        .iter()
        .map(|&idx| {
            let id = graph.id_of(idx);
            let to_date = |offset: Offset| {
                offset_to_date(plan_start, offset).ok_or_else(|| {
                    ScheduleError::InvalidSchedule(vec![format!(
                        "{id} falls on day {offset}, outside the supported date range"
                    )])
                })
            };
            Ok(ScheduleEntry {
                task_id: id.to_string(),
                start_date: to_date(offsets.starts[idx])?,
                end_date: to_date(offsets.finishes[idx])?,
            })
        })
        .collect()
}
