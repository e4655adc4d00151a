//! Timeline engine: turns a loosely specified plan (tasks, dependencies,
//! deadline hints) into a validated day-granularity calendar schedule that
//! fits a fixed duration window.
//!
//! The pipeline is pure and synchronous; every call owns its state.
//!
//! ```text
//! parse/normalize -> dependency graph -> forward pass + deadlines
//!     -> backward pass + slack -> window clamp -> dates -> validation
//! ```

pub mod clamp;
mod config;
pub mod critical_path;
mod engine;
mod error;
pub mod graph;
pub mod logging;
mod models;
pub mod normalize;
pub mod parsing;
pub mod validation;

#[cfg(feature = "python")]
mod python;

pub use config::EngineOptions;
pub use engine::{schedule, schedule_at, schedule_json};
pub use error::ScheduleError;
pub use graph::DependencyGraph;
pub use models::{
    DeadlineMarker, Edge, PlanInput, PlanMetadata, ScheduleEntry, ScheduleHint, ScheduledPlan,
    ScheduledTask, Task, TaskInput, TaskStatus,
};
pub use parsing::{parse_deadline, parse_duration};
