//! Configuration types for a scheduling run.

use chrono::{NaiveDate, Utc};

/// Options controlling one invocation of the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineOptions {
    /// Calendar date of offset 1.
    pub start_date: NaiveDate,
    /// Size of the scheduling window in days. Must be > 0.
    pub total_duration_days: i64,
    /// Duration applied to tasks with no usable duration information.
    pub default_task_days: u32,
    /// Verbosity level: 0=silent, 1=changes, 2=checks, 3=debug.
    pub verbosity: u8,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            start_date: Utc::now().date_naive(),
            total_duration_days: 30,
            default_task_days: 2,
            verbosity: 0,
        }
    }
}

impl EngineOptions {
    pub fn new(start_date: NaiveDate, total_duration_days: i64) -> Self {
        Self {
            start_date,
            total_duration_days,
            ..Self::default()
        }
    }

    pub fn with_default_task_days(mut self, days: u32) -> Self {
        self.default_task_days = days;
        self
    }

    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Default task duration, never below one day.
    pub fn effective_default_days(&self) -> u32 {
        self.default_task_days.max(1)
    }
}
