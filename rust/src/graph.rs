//! Dependency graph construction and topological ordering.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;

use crate::error::ScheduleError;
use crate::models::Edge;

/// Dense task index, assigned in the order ids were supplied.
pub type TaskIdx = usize;

/// Adjacency structure over a plan's tasks plus a topological order.
///
/// Per-task data elsewhere in the crate lives in plain vectors indexed by
/// [`TaskIdx`]. Built fresh for every scheduling run; nothing is shared
/// between runs.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    ids: Vec<String>,
    positions: FxHashMap<String, TaskIdx>,
    predecessors: Vec<Vec<TaskIdx>>,
    successors: Vec<Vec<TaskIdx>>,
    order: Vec<TaskIdx>,
    /// Position of each task within `order`.
    rank: Vec<usize>,
}

impl DependencyGraph {
    /// Build the graph and its topological order.
    ///
    /// Ids should be unique; a repeated id maps to its first occurrence.
    /// Every edge endpoint must be one of `ids`, otherwise
    /// `UnknownDependencyReference` is returned before any ordering is
    /// attempted. Returns `CycleDetected` with the ids still holding
    /// positive in-degree if no complete order exists.
    pub fn build<S: AsRef<str>>(ids: &[S], edges: &[Edge]) -> Result<Self, ScheduleError> {
        let mut positions: FxHashMap<String, TaskIdx> =
            FxHashMap::with_capacity_and_hasher(ids.len(), Default::default());
        let mut task_ids: Vec<String> = Vec::with_capacity(ids.len());
        for id in ids {
            let id = id.as_ref();
            if !positions.contains_key(id) {
                positions.insert(id.to_string(), task_ids.len());
                task_ids.push(id.to_string());
            }
        }

        let n = task_ids.len();
        let mut predecessors: Vec<Vec<TaskIdx>> = vec![Vec::new(); n];
        let mut successors: Vec<Vec<TaskIdx>> = vec![Vec::new(); n];

        for edge in edges {
            let (Some(&from), Some(&to)) = (positions.get(&edge.from), positions.get(&edge.to))
            else {
                return Err(ScheduleError::UnknownDependencyReference {
                    from: edge.from.clone(),
                    to: edge.to.clone(),
                });
            };
            successors[from].push(to);
            predecessors[to].push(from);
        }

        let order = topological_sort(&predecessors, &successors).map_err(|unresolved| {
            ScheduleError::CycleDetected(
                unresolved
                    .into_iter()
                    .map(|idx| task_ids[idx].clone())
                    .collect(),
            )
        })?;

        let mut rank = vec![0; n];
        for (position, &idx) in order.iter().enumerate() {
            rank[idx] = position;
        }

        Ok(Self {
            ids: task_ids,
            positions,
            predecessors,
            successors,
            order,
            rank,
        })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn index_of(&self, id: &str) -> Option<TaskIdx> {
        self.positions.get(id).copied()
    }

    /// Panics if `idx` is not an index of this graph.
    pub fn id_of(&self, idx: TaskIdx) -> &str {
        &self.ids[idx]
    }

    /// Task indices in topological order.
    pub fn order(&self) -> &[TaskIdx] {
        &self.order
    }

    /// Position of a task within [`order`](Self::order).
    pub fn rank(&self, idx: TaskIdx) -> usize {
        self.rank[idx]
    }

    /// Task ids in topological order.
    pub fn topological_order(&self) -> Vec<&str> {
        self.order.iter().map(|&idx| self.ids[idx].as_str()).collect()
    }

    pub fn predecessors(&self, idx: TaskIdx) -> &[TaskIdx] {
        &self.predecessors[idx]
    }

    pub fn successors(&self, idx: TaskIdx) -> &[TaskIdx] {
        &self.successors[idx]
    }
}

/// Kahn's algorithm. The queue is seeded in index (insertion) order and
/// successors are released in edge order, so the result is deterministic.
///
/// On failure returns the indices whose in-degree never reached zero.
fn topological_sort(
    predecessors: &[Vec<TaskIdx>],
    successors: &[Vec<TaskIdx>],
) -> Result<Vec<TaskIdx>, Vec<TaskIdx>> {
    let mut in_degree: Vec<usize> = predecessors.iter().map(Vec::len).collect();

    let mut queue: VecDeque<TaskIdx> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, &degree)| degree == 0)
        .map(|(idx, _)| idx)
        .collect();

    let mut order = Vec::with_capacity(in_degree.len());

    while let Some(idx) = queue.pop_front() {
        order.push(idx);
        for &next in &successors[idx] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                queue.push_back(next);
            }
        }
    }

    if order.len() != in_degree.len() {
        return Err(in_degree
            .iter()
            .enumerate()
            .filter(|(_, &degree)| degree > 0)
            .map(|(idx, _)| idx)
            .collect());
    }

    Ok(order)
}
