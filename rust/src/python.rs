//! Python bindings for the timeline engine.
//!
//! Plans cross the boundary as JSON strings so the Python side can pass
//! generator output through unchanged.

use chrono::NaiveDate;
use pyo3::prelude::*;

use crate::config::EngineOptions;
use crate::engine::schedule_json;

/// Schedule a plan document.
///
/// # Arguments
/// * `plan_json` - Plan as JSON: `{goal, tasks, dependencies, schedule?, metadata?}`
/// * `start_date` - Calendar date of day 1
/// * `total_duration_days` - Size of the scheduling window
/// * `default_task_days` - Duration for tasks without usable duration info
/// * `verbosity` - 0=silent, 1=changes, 2=checks, 3=debug
///
/// # Returns
/// * The scheduled plan as a JSON string
///
/// # Raises
/// * ValueError with `"<CODE>: <message>"` if scheduling fails
#[pyfunction]
#[pyo3(signature = (plan_json, start_date, total_duration_days, default_task_days=2, verbosity=0))]
fn schedule_plan(
    plan_json: &str,
    start_date: NaiveDate,
    total_duration_days: i64,
    default_task_days: u32,
    verbosity: u8,
) -> PyResult<String> {
    let options = EngineOptions::new(start_date, total_duration_days)
        .with_default_task_days(default_task_days)
        .with_verbosity(verbosity);

    schedule_json(plan_json, &options).map_err(|e| {
        pyo3::exceptions::PyValueError::new_err(format!("{}: {}", e.code(), e))
    })
}

/// The timeline_engine Python module.
#[pymodule]
fn timeline_engine(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(schedule_plan, m)?)?;
    Ok(())
}
