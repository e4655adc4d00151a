//! Task normalization: raw generator output to canonical tasks.

use chrono::NaiveDate;
use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::Value;

use crate::error::ScheduleError;
use crate::models::{DeadlineMarker, Edge, ScheduleHint, Task, TaskInput, TaskStatus};
use crate::parsing::{parse_deadline_value, parse_duration_value};

/// Plan-wide values the normalizer falls back to.
#[derive(Clone, Copy, Debug)]
pub struct NormalizeContext {
    pub plan_start: NaiveDate,
    pub default_task_days: u32,
}

/// Resolve a hint value (date or "Day N") to an absolute date.
fn hint_date(value: Option<&Value>, plan_start: NaiveDate) -> Option<NaiveDate> {
    value.and_then(|v| parse_deadline_value(v).resolve(plan_start))
}

/// Inclusive day span between a hint's start and end, at least one day.
fn hint_span_days(hint: &ScheduleHint, plan_start: NaiveDate) -> Option<u32> {
    let start = hint_date(hint.start_date.as_ref(), plan_start)?;
    let end = hint_date(hint.end_date.as_ref(), plan_start)?;
    let span = (end - start).num_days() + 1;
    Some(u32::try_from(span.max(1)).unwrap_or(u32::MAX))
}

/// Produce a canonical task from a raw task and an optional schedule hint.
///
/// `position` is the task's zero-based index in the plan, used for the
/// default title. The id must already have been checked by
/// [`check_task_ids`].
pub fn normalize_task(
    raw: &TaskInput,
    position: usize,
    hint: Option<&ScheduleHint>,
    ctx: &NormalizeContext,
) -> Task {
    let id = raw.id.clone().unwrap_or_default();

    let explicit_days = raw
        .duration
        .as_ref()
        .and_then(parse_duration_value)
        .or_else(|| raw.duration_days.as_ref().and_then(parse_duration_value));
    let duration_days = explicit_days
        .or_else(|| hint.and_then(|h| hint_span_days(h, ctx.plan_start)))
        .unwrap_or(ctx.default_task_days.max(1));

    let deadline_raw = raw
        .deadline
        .as_ref()
        .map(parse_deadline_value)
        .unwrap_or(DeadlineMarker::None);
    let deadline = deadline_raw.resolve(ctx.plan_start);

    let display_start = hint_date(raw.start_date.as_ref(), ctx.plan_start)
        .or_else(|| hint.and_then(|h| hint_date(h.start_date.as_ref(), ctx.plan_start)))
        .unwrap_or(ctx.plan_start);
    let display_deadline = deadline
        .or_else(|| hint.and_then(|h| hint_date(h.end_date.as_ref(), ctx.plan_start)))
        .unwrap_or(ctx.plan_start);

    let title = raw
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Task {}", position + 1));

    Task {
        id,
        title,
        status: raw.status.as_deref().map(TaskStatus::parse).unwrap_or_default(),
        duration_days,
        deadline_raw,
        deadline,
        display_start,
        display_deadline,
    }
}

/// Reject missing, empty, or repeated task ids.
pub fn check_task_ids(tasks: &[TaskInput]) -> Result<(), ScheduleError> {
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    for task in tasks {
        let id = task.id.as_deref().unwrap_or("");
        if id.trim().is_empty() || !seen.insert(id) {
            return Err(ScheduleError::DuplicateTaskId(id.to_string()));
        }
    }
    Ok(())
}

/// Normalize every task of a plan, pairing each with its hint by id.
pub fn normalize_tasks(
    tasks: &[TaskInput],
    hints: &[ScheduleHint],
    ctx: &NormalizeContext,
) -> Result<Vec<Task>, ScheduleError> {
    check_task_ids(tasks)?;

    // First hint per task id wins
    let mut hint_map: FxHashMap<&str, &ScheduleHint> = FxHashMap::default();
    for hint in hints {
        hint_map.entry(hint.task_id.as_str()).or_insert(hint);
    }

    Ok(tasks
        .iter()
        .enumerate()
        .map(|(position, raw)| {
            let hint = raw.id.as_deref().and_then(|id| hint_map.get(id).copied());
            normalize_task(raw, position, hint, ctx)
        })
        .collect())
}

/// Merge explicit edges with per-task predecessor lists, dropping repeats.
pub fn collect_edges(explicit: &[Edge], tasks: &[TaskInput]) -> Vec<Edge> {
    let mut seen: FxHashSet<(&str, &str)> = FxHashSet::default();
    let mut edges = Vec::with_capacity(explicit.len());

    let listed = tasks.iter().flat_map(|task| {
        let to = task.id.as_deref().unwrap_or("");
        task.dependencies.iter().map(move |from| (from.as_str(), to))
    });

    for (from, to) in explicit
        .iter()
        .map(|e| (e.from.as_str(), e.to.as_str()))
        .chain(listed)
    {
        if seen.insert((from, to)) {
            edges.push(Edge::new(from, to));
        }
    }
    edges
}
