//! Core data types for plans entering and leaving the engine.
//!
//! Input types are deliberately loose: the upstream generator is untrusted,
//! so ids may be absent and duration/deadline fields may be numbers or
//! free-form strings. Output types are strict.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A dependency edge: `from` must finish before `to` starts.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Lifecycle status of a task.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Done,
}

impl TaskStatus {
    /// Lenient parse; unknown values map to `Pending`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "in-progress" | "inprogress" | "in progress" => Self::InProgress,
            "done" | "complete" | "completed" => Self::Done,
            _ => Self::Pending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Done => "done",
        }
    }
}

/// A raw task as supplied by the caller or the upstream generator.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    /// Human duration: number or string such as "3d", "2 weeks".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<Value>,
    /// Deadline: ISO date, "Day N", or a bare day number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Value>,
    /// Predecessor ids listed on the task itself.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
}

/// Externally supplied timing hint for one task, keyed by task id.
///
/// Values accept the same forms as deadlines (ISO date or "Day N").
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleHint {
    pub task_id: String,
    #[serde(default)]
    pub start_date: Option<Value>,
    #[serde(default)]
    pub end_date: Option<Value>,
}

/// A plan submitted for scheduling.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub goal: String,
    #[serde(default)]
    pub tasks: Vec<TaskInput>,
    #[serde(default)]
    pub dependencies: Vec<Edge>,
    #[serde(default)]
    pub schedule: Vec<ScheduleHint>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

/// Typed deadline marker produced by the parser.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DeadlineMarker {
    #[default]
    None,
    Date { date: NaiveDate },
    DayN { day: i64 },
}

impl DeadlineMarker {
    /// Absolute date for this marker; day 1 is `start`.
    pub fn resolve(&self, start: NaiveDate) -> Option<NaiveDate> {
        match *self {
            DeadlineMarker::None => None,
            DeadlineMarker::Date { date } => Some(date),
            DeadlineMarker::DayN { day } => {
                start.checked_add_signed(chrono::TimeDelta::try_days(day.checked_sub(1)?)?)
            }
        }
    }
}

/// Canonical task produced by the normalizer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub status: TaskStatus,
    pub duration_days: u32,
    pub deadline_raw: DeadlineMarker,
    /// Resolved deadline constraint, if any.
    pub deadline: Option<NaiveDate>,
    /// Display start (explicit, hinted, or plan start).
    pub display_start: NaiveDate,
    /// Display deadline (explicit, hinted, or plan start).
    pub display_deadline: NaiveDate,
}

impl Task {
    /// Render back into input form; re-normalizing the result is a no-op.
    pub fn to_input(&self) -> TaskInput {
        let deadline = match self.deadline_raw {
            DeadlineMarker::None => None,
            DeadlineMarker::Date { date } => Some(Value::String(date.to_string())),
            DeadlineMarker::DayN { day } => Some(Value::String(format!("Day {day}"))),
        };
        TaskInput {
            id: Some(self.id.clone()),
            title: Some(self.title.clone()),
            status: Some(self.status.as_str().to_string()),
            duration: None,
            duration_days: Some(Value::from(self.duration_days)),
            deadline,
            start_date: Some(Value::String(self.display_start.to_string())),
            dependencies: Vec::new(),
        }
    }
}

/// One scheduled interval. `end_date >= start_date` for engine output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub task_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Task as returned to the caller, enriched with its scheduled dates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledTask {
    pub id: String,
    pub title: String,
    pub status: TaskStatus,
    pub duration_days: u32,
    pub start_date: NaiveDate,
    /// Scheduled finish date.
    pub deadline: NaiveDate,
    pub slack: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanMetadata {
    pub start_date: NaiveDate,
    pub total_duration_days: i64,
    pub feasible: bool,
    pub overflow: Vec<String>,
    pub critical_path: Vec<String>,
    /// Tasks whose deadline could not be honored without breaking a dependency.
    pub ignored_deadlines: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Caller-supplied metadata keys carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Final result of a successful scheduling run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledPlan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub goal: String,
    pub tasks: Vec<ScheduledTask>,
    pub dependencies: Vec<Edge>,
    pub schedule: Vec<ScheduleEntry>,
    pub metadata: PlanMetadata,
}
