//! Critical path calculation using forward and backward passes.

use chrono::NaiveDate;

use crate::graph::{DependencyGraph, TaskIdx};
use crate::models::Task;
use crate::{log_changes, log_checks, log_debug};

use super::types::{Offset, TaskTiming};

/// Inclusive 1-based offset of `date` relative to `start`.
pub fn day_offset(start: NaiveDate, date: NaiveDate) -> Offset {
    (date - start).num_days() + 1
}

/// Per-task inputs indexed by graph index.
#[derive(Clone, Debug)]
pub struct TaskData {
    pub durations: Vec<Offset>,
    /// Deadline offsets, `None` for tasks without a resolved deadline.
    pub deadlines: Vec<Option<Offset>>,
}

impl TaskData {
    /// Lay out task durations and deadlines by graph index.
    ///
    /// Tasks whose id is not in the graph are skipped; the engine builds the
    /// graph from the same task list so this does not happen in practice.
    pub fn new(tasks: &[Task], graph: &DependencyGraph, plan_start: NaiveDate) -> Self {
        let n = graph.len();
        let mut durations = vec![1; n];
        let mut deadlines = vec![None; n];

        for task in tasks {
            if let Some(idx) = graph.index_of(&task.id) {
                durations[idx] = Offset::from(task.duration_days.max(1));
                deadlines[idx] = task.deadline.map(|d| day_offset(plan_start, d));
            }
        }

        Self {
            durations,
            deadlines,
        }
    }
}

/// Earliest start/finish offsets after the forward pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ForwardPass {
    pub earliest_start: Vec<Offset>,
    pub earliest_finish: Vec<Offset>,
    /// Tasks whose deadline fell before their dependency-driven finish.
    pub ignored_deadlines: Vec<TaskIdx>,
}

impl ForwardPass {
    /// Maximum earliest finish over all tasks (0 for an empty plan).
    pub fn project_finish(&self) -> Offset {
        self.earliest_finish.iter().copied().max().unwrap_or(0)
    }
}

/// Pull a task's finish out to its deadline when that does not break a
/// dependency. Returns the reconciled `(start, finish)` and whether the
/// deadline was honored.
///
/// A deadline earlier than the dependency-driven finish is ignored: the
/// dependency constraint always wins.
pub fn reconcile_deadline(
    earliest_start: Offset,
    earliest_finish: Offset,
    duration: Offset,
    deadline: Option<Offset>,
) -> (Offset, Offset, bool) {
    match deadline {
        Some(deadline) if deadline >= earliest_finish => {
            (deadline - duration + 1, deadline, true)
        }
        Some(_) => (earliest_start, earliest_finish, false),
        None => (earliest_start, earliest_finish, true),
    }
}

/// Forward pass in topological order.
///
/// `ES = max(EF[pred]) + 1` (or 1 without predecessors),
/// `EF = ES + duration - 1`, followed by deadline reconciliation. The
/// reconciliation happens as each task is reached so successors start
/// after the reconciled finish.
pub fn forward_pass(graph: &DependencyGraph, data: &TaskData, verbosity: u8) -> ForwardPass {
    let n = graph.len();
    let mut earliest_start = vec![0; n];
    let mut earliest_finish = vec![0; n];
    let mut ignored_deadlines = Vec::new();

    for &idx in graph.order() {
        let max_pred_finish = graph
            .predecessors(idx)
            .iter()
            .map(|&p| earliest_finish[p])
            .max()
            .unwrap_or(0);

        let duration = data.durations[idx];
        let es = max_pred_finish + 1;
        let ef = es + duration - 1;

        let (es, ef, honored) = reconcile_deadline(es, ef, duration, data.deadlines[idx]);
        if !honored {
            log_changes!(
                verbosity,
                "deadline for {} (day {:?}) precedes earliest finish (day {}); ignoring",
                graph.id_of(idx),
                data.deadlines[idx],
                ef
            );
            ignored_deadlines.push(idx);
        }

        log_debug!(verbosity, "forward {}: ES={} EF={}", graph.id_of(idx), es, ef);
        earliest_start[idx] = es;
        earliest_finish[idx] = ef;
    }

    ForwardPass {
        earliest_start,
        earliest_finish,
        ignored_deadlines,
    }
}

/// Backward pass in reverse topological order, returning `(LS, LF)`.
///
/// Sinks finish at the project finish; other tasks must finish the day
/// before their earliest-starting successor's latest start.
pub fn backward_pass(
    graph: &DependencyGraph,
    data: &TaskData,
    project_finish: Offset,
) -> (Vec<Offset>, Vec<Offset>) {
    let n = graph.len();
    let mut latest_start = vec![0; n];
    let mut latest_finish = vec![0; n];

    for &idx in graph.order().iter().rev() {
        let lf = graph
            .successors(idx)
            .iter()
            .map(|&s| latest_start[s] - 1)
            .min()
            .unwrap_or(project_finish);
        latest_finish[idx] = lf;
        latest_start[idx] = lf - data.durations[idx] + 1;
    }

    (latest_start, latest_finish)
}

/// Result of the critical path calculation for a whole plan.
#[derive(Clone, Debug)]
pub struct CriticalPathResult {
    /// Timing for each task, indexed by graph index.
    pub timings: Vec<TaskTiming>,
    /// Zero-slack tasks in topological order.
    pub critical_path: Vec<TaskIdx>,
    /// Maximum earliest finish over all tasks.
    pub project_finish: Offset,
    pub ignored_deadlines: Vec<TaskIdx>,
}

impl CriticalPathResult {
    /// Ids of the critical path tasks.
    pub fn critical_path_ids(&self, graph: &DependencyGraph) -> Vec<String> {
        self.critical_path
            .iter()
            .map(|&idx| graph.id_of(idx).to_string())
            .collect()
    }
}

/// Run forward pass, deadline reconciliation, backward pass and slack
/// computation over the plan.
pub fn calculate_critical_path(
    graph: &DependencyGraph,
    data: &TaskData,
    verbosity: u8,
) -> CriticalPathResult {
    let forward = forward_pass(graph, data, verbosity);
    let project_finish = forward.project_finish();
    let (latest_start, latest_finish) = backward_pass(graph, data, project_finish);

    let timings: Vec<TaskTiming> = (0..graph.len())
        .map(|idx| TaskTiming {
            earliest_start: forward.earliest_start[idx],
            earliest_finish: forward.earliest_finish[idx],
            latest_start: latest_start[idx],
            latest_finish: latest_finish[idx],
            slack: latest_start[idx] - forward.earliest_start[idx],
        })
        .collect();

    let critical_path: Vec<TaskIdx> = graph
        .order()
        .iter()
        .copied()
        .filter(|&idx| timings[idx].is_critical())
        .collect();

    log_checks!(
        verbosity,
        "critical path: {} of {} tasks, project finish day {}",
        critical_path.len(),
        graph.len(),
        project_finish
    );

    CriticalPathResult {
        timings,
        critical_path,
        project_finish,
        ignored_deadlines: forward.ignored_deadlines,
    }
}
