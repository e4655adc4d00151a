//! Scheduling pipeline: normalize, build the graph, run the critical path
//! passes, clamp into the window, convert to dates, validate.
//!
//! Every stage is a hard gate. A failure returns a typed error and no
//! partial plan; window overflow is the only condition reported inside a
//! successful result.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::clamp::{clamp_to_window, to_schedule_entries};
use crate::config::EngineOptions;
use crate::critical_path::{calculate_critical_path, TaskData};
use crate::error::ScheduleError;
use crate::graph::DependencyGraph;
use crate::models::{PlanInput, PlanMetadata, ScheduledPlan, ScheduledTask};
use crate::normalize::{collect_edges, normalize_tasks, NormalizeContext};
use crate::validation::validate_schedule;
use crate::{log_changes, log_checks};

/// Metadata keys owned by the engine; caller values for these are replaced.
const ENGINE_METADATA_KEYS: &[&str] = &[
    "startDate",
    "totalDurationDays",
    "feasible",
    "overflow",
    "criticalPath",
    "ignoredDeadlines",
    "createdAt",
    "updatedAt",
];

/// Schedule a plan, stamping the result with the current time.
pub fn schedule(plan: &PlanInput, options: &EngineOptions) -> Result<ScheduledPlan, ScheduleError> {
    schedule_at(plan, options, Utc::now())
}

/// Schedule a plan using `now` for `updatedAt` (and for `createdAt` when the
/// plan does not carry one).
pub fn schedule_at(
    plan: &PlanInput,
    options: &EngineOptions,
    now: DateTime<Utc>,
) -> Result<ScheduledPlan, ScheduleError> {
    let verbosity = options.verbosity;
    let plan_start = options.start_date;

    if options.total_duration_days <= 0 {
        return Err(ScheduleError::InvalidDuration(options.total_duration_days));
    }

    let ctx = NormalizeContext {
        plan_start,
        default_task_days: options.effective_default_days(),
    };
    let tasks = normalize_tasks(&plan.tasks, &plan.schedule, &ctx)?;
    let edges = collect_edges(&plan.dependencies, &plan.tasks);
    log_checks!(
        verbosity,
        "normalized {} tasks, {} dependencies",
        tasks.len(),
        edges.len()
    );

    let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
    let graph = DependencyGraph::build(&ids, &edges)?;

    let data = TaskData::new(&tasks, &graph, plan_start);
    let critical = calculate_critical_path(&graph, &data, verbosity);

    let clamped = clamp_to_window(
        &graph,
        &critical.timings,
        &data.durations,
        options.total_duration_days,
        verbosity,
    );
    let schedule = to_schedule_entries(&graph, &clamped, plan_start)?;

    validate_schedule(&schedule, &edges)?;

    let feasible = clamped.feasible();
    if !feasible {
        log_changes!(
            verbosity,
            "plan does not fit {} days; {} task(s) clamped",
            options.total_duration_days,
            clamped.overflow.len()
        );
    }

    let scheduled_tasks: Vec<ScheduledTask> = tasks
        .iter()
        .filter_map(|task| {
            let idx = graph.index_of(&task.id)?;
            let entry = &schedule[graph.rank(idx)];
            Some(ScheduledTask {
                id: task.id.clone(),
                title: task.title.clone(),
                status: task.status,
                duration_days: task.duration_days,
                start_date: entry.start_date,
                deadline: entry.end_date,
                slack: critical.timings[idx].slack,
            })
        })
        .collect();

    let ids_of = |indices: &[usize]| -> Vec<String> {
        indices.iter().map(|&idx| graph.id_of(idx).to_string()).collect()
    };

    let metadata = PlanMetadata {
        start_date: plan_start,
        total_duration_days: options.total_duration_days,
        feasible,
        overflow: ids_of(&clamped.overflow),
        critical_path: critical.critical_path_ids(&graph),
        ignored_deadlines: ids_of(&critical.ignored_deadlines),
        created_at: created_at(plan.metadata.as_ref()).unwrap_or(now),
        updated_at: now,
        extra: carried_metadata(plan.metadata.as_ref()),
    };

    Ok(ScheduledPlan {
        id: plan.id.clone(),
        goal: plan.goal.clone(),
        tasks: scheduled_tasks,
        dependencies: edges,
        schedule,
        metadata,
    })
}

/// Parse a plan document, schedule it, and render the result as JSON.
pub fn schedule_json(plan_json: &str, options: &EngineOptions) -> Result<String, ScheduleError> {
    let plan: PlanInput = serde_json::from_str(plan_json)?;
    let scheduled = schedule(&plan, options)?;
    Ok(serde_json::to_string(&scheduled)?)
}

fn created_at(metadata: Option<&Map<String, Value>>) -> Option<DateTime<Utc>> {
    let raw = metadata?.get("createdAt")?.as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn carried_metadata(metadata: Option<&Map<String, Value>>) -> Map<String, Value> {
    metadata
        .map(|m| {
            m.iter()
                .filter(|(k, _)| !ENGINE_METADATA_KEYS.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Edge, ScheduleEntry, ScheduleHint, TaskInput};
    use chrono::{NaiveDate, TimeZone};
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
    }

    fn make_task(id: &str, days: u32) -> TaskInput {
        TaskInput {
            id: Some(id.to_string()),
            title: Some(format!("Task {id}")),
            duration_days: Some(json!(days)),
            ..TaskInput::default()
        }
    }

    fn make_plan(tasks: Vec<TaskInput>, pairs: &[(&str, &str)]) -> PlanInput {
        PlanInput {
            goal: "Ship it".to_string(),
            tasks,
            dependencies: pairs.iter().map(|(a, b)| Edge::new(*a, *b)).collect(),
            ..PlanInput::default()
        }
    }

    fn options(window: i64) -> EngineOptions {
        EngineOptions::new(date(2025, 1, 1), window)
    }

    fn entry<'a>(plan: &'a ScheduledPlan, id: &str) -> &'a ScheduleEntry {
        plan.schedule.iter().find(|e| e.task_id == id).unwrap()
    }

    fn chain_plan(days: &[u32]) -> PlanInput {
        let tasks: Vec<TaskInput> = days
            .iter()
            .enumerate()
            .map(|(i, &d)| make_task(&format!("t{}", i + 1), d))
            .collect();
        let ids: Vec<String> = (1..=days.len()).map(|i| format!("t{i}")).collect();
        let pairs: Vec<(&str, &str)> = ids
            .windows(2)
            .map(|w| (w[0].as_str(), w[1].as_str()))
            .collect();
        make_plan(tasks, &pairs)
    }

    #[test]
    fn test_chain_in_wide_window() {
        let plan = chain_plan(&[3, 4, 2]);
        let result = schedule_at(&plan, &options(30), now()).unwrap();

        assert_eq!(
            (entry(&result, "t1").start_date, entry(&result, "t1").end_date),
            (date(2025, 1, 1), date(2025, 1, 3))
        );
        assert_eq!(
            (entry(&result, "t2").start_date, entry(&result, "t2").end_date),
            (date(2025, 1, 4), date(2025, 1, 7))
        );
        assert_eq!(
            (entry(&result, "t3").start_date, entry(&result, "t3").end_date),
            (date(2025, 1, 8), date(2025, 1, 9))
        );
        assert_eq!(result.metadata.critical_path, vec!["t1", "t2", "t3"]);
        assert!(result.metadata.feasible);
        assert!(result.metadata.overflow.is_empty());
        assert!(result.tasks.iter().all(|t| t.slack == 0));
    }

    #[test]
    fn test_chain_in_five_day_window() {
        let plan = chain_plan(&[3, 4, 2]);
        let result = schedule_at(&plan, &options(5), now()).unwrap();

        assert!(!result.metadata.feasible);
        assert_eq!(result.metadata.overflow, vec!["t2", "t3"]);
        let last_day = date(2025, 1, 5);
        for e in &result.schedule {
            assert!(e.end_date <= last_day, "{} ends after day 5", e.task_id);
            assert!(e.start_date >= date(2025, 1, 1));
        }
    }

    #[test]
    fn test_three_five_day_tasks_in_ten_day_window() {
        let plan = chain_plan(&[5, 5, 5]);
        let result = schedule_at(&plan, &options(10), now()).unwrap();

        assert!(!result.metadata.feasible);
        assert!(result.metadata.overflow.contains(&"t3".to_string()));
        for e in &result.schedule {
            assert!(e.start_date >= date(2025, 1, 1));
            assert!(e.end_date <= date(2025, 1, 10));
        }
        assert!(validate_schedule(&result.schedule, &result.dependencies).is_ok());
    }

    #[test]
    fn test_unknown_edge_endpoint() {
        let plan = make_plan(vec![make_task("t1", 1)], &[("t1", "ghost")]);
        let err = schedule_at(&plan, &options(30), now()).unwrap_err();
        assert_eq!(err.code(), "UNKNOWN_DEPENDENCY_REFERENCE");
    }

    #[test]
    fn test_cycle_produces_no_schedule() {
        let plan = make_plan(
            vec![make_task("a", 1), make_task("b", 1), make_task("c", 1)],
            &[("a", "b"), ("b", "c"), ("c", "a")],
        );
        let err = schedule_at(&plan, &options(30), now()).unwrap_err();
        assert_eq!(
            err,
            ScheduleError::CycleDetected(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );
    }

    #[test]
    fn test_invalid_duration() {
        let plan = chain_plan(&[1]);
        assert_eq!(
            schedule_at(&plan, &options(0), now()).unwrap_err(),
            ScheduleError::InvalidDuration(0)
        );
        assert_eq!(
            schedule_at(&plan, &options(-3), now()).unwrap_err().code(),
            "INVALID_DURATION"
        );
    }

    #[test]
    fn test_duplicate_and_missing_ids() {
        let dup = make_plan(vec![make_task("a", 1), make_task("a", 2)], &[]);
        assert_eq!(
            schedule_at(&dup, &options(30), now()).unwrap_err().code(),
            "DUPLICATE_TASK_ID"
        );

        let missing = make_plan(vec![make_task("a", 1), TaskInput::default()], &[]);
        assert_eq!(
            schedule_at(&missing, &options(30), now()).unwrap_err().code(),
            "DUPLICATE_TASK_ID"
        );
    }

    #[test]
    fn test_successor_starts_day_after_latest_predecessor() {
        let plan = make_plan(
            vec![make_task("a", 2), make_task("b", 6), make_task("c", 3), make_task("d", 1)],
            &[("a", "c"), ("b", "c")],
        );
        let result = schedule_at(&plan, &options(30), now()).unwrap();

        let b_end = entry(&result, "b").end_date;
        assert_eq!(entry(&result, "c").start_date, b_end.succ_opt().unwrap());
        assert_eq!(entry(&result, "a").start_date, date(2025, 1, 1));
        assert_eq!(entry(&result, "d").start_date, date(2025, 1, 1));
        assert_eq!(result.metadata.critical_path, vec!["b", "c"]);

        let a = result.tasks.iter().find(|t| t.id == "a").unwrap();
        assert_eq!(a.slack, 4);
    }

    #[test]
    fn test_deadline_honored_and_ignored() {
        let mut tasks = vec![make_task("a", 5), make_task("b", 2), make_task("c", 1)];
        tasks[1].deadline = Some(json!("Day 3"));
        tasks[2].deadline = Some(json!("2025-01-20"));
        let plan = make_plan(tasks, &[("a", "b")]);

        let result = schedule_at(&plan, &options(30), now()).unwrap();

        // b cannot finish by day 3 behind a 5-day predecessor
        assert_eq!(entry(&result, "b").start_date, date(2025, 1, 6));
        assert_eq!(result.metadata.ignored_deadlines, vec!["b"]);
        // c finishes exactly on its deadline
        assert_eq!(entry(&result, "c").start_date, date(2025, 1, 20));
        assert_eq!(entry(&result, "c").end_date, date(2025, 1, 20));
    }

    #[test]
    fn test_hints_and_task_dependency_lists() {
        let mut plan = make_plan(
            vec![
                TaskInput {
                    id: Some("design".to_string()),
                    ..TaskInput::default()
                },
                TaskInput {
                    id: Some("build".to_string()),
                    dependencies: vec!["design".to_string()],
                    ..TaskInput::default()
                },
            ],
            &[],
        );
        plan.schedule = vec![ScheduleHint {
            task_id: "design".to_string(),
            start_date: Some(json!("2025-01-01")),
            end_date: Some(json!("2025-01-04")),
        }];

        let result = schedule_at(&plan, &options(30), now()).unwrap();

        assert_eq!(result.dependencies, vec![Edge::new("design", "build")]);
        assert_eq!(entry(&result, "design").end_date, date(2025, 1, 4));
        // build falls back to the two-day default
        assert_eq!(
            (entry(&result, "build").start_date, entry(&result, "build").end_date),
            (date(2025, 1, 5), date(2025, 1, 6))
        );
        assert_eq!(result.tasks[1].title, "Task 2");
    }

    #[test]
    fn test_metadata_passthrough() {
        let mut plan = chain_plan(&[1]);
        plan.id = Some("plan-1".to_string());
        plan.metadata = Some(
            json!({ "createdAt": "2024-12-31T08:00:00Z", "model": "draft-gen", "feasible": "maybe" })
                .as_object()
                .unwrap()
                .clone(),
        );

        let result = schedule_at(&plan, &options(30), now()).unwrap();
        assert_eq!(result.id.as_deref(), Some("plan-1"));
        assert_eq!(
            result.metadata.created_at,
            Utc.with_ymd_and_hms(2024, 12, 31, 8, 0, 0).unwrap()
        );
        assert_eq!(result.metadata.updated_at, now());
        assert_eq!(result.metadata.extra.get("model"), Some(&json!("draft-gen")));
        assert!(!result.metadata.extra.contains_key("feasible"));

        let rendered = serde_json::to_value(&result).unwrap();
        assert_eq!(rendered["metadata"]["feasible"], json!(true));
        assert_eq!(rendered["metadata"]["model"], json!("draft-gen"));
        assert_eq!(rendered["metadata"]["startDate"], json!("2025-01-01"));
    }

    #[test]
    fn test_tasks_pair_with_their_own_entries() {
        let plan = make_plan(
            vec![make_task("d", 1), make_task("c", 2), make_task("b", 3), make_task("a", 4)],
            &[("a", "b"), ("b", "c"), ("c", "d")],
        );
        let result = schedule_at(&plan, &options(30), now()).unwrap();

        let ids: Vec<&str> = result.tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["d", "c", "b", "a"]);
        let order: Vec<&str> = result.schedule.iter().map(|e| e.task_id.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c", "d"]);
        for task in &result.tasks {
            let e = entry(&result, &task.id);
            assert_eq!((task.start_date, task.deadline), (e.start_date, e.end_date));
        }
        assert_eq!(result.tasks[0].start_date, date(2025, 1, 10));
    }

    #[test]
    fn test_dates_beyond_calendar_range_are_rejected() {
        let plan = make_plan(
            vec![TaskInput {
                id: Some("forever".to_string()),
                duration: Some(json!("9999999y")),
                ..TaskInput::default()
            }],
            &[],
        );
        let err = schedule_at(&plan, &options(5_000_000_000), now()).unwrap_err();
        assert_eq!(err.code(), "INVALID_SCHEDULE");

        // the same plan clamped into a normal window still schedules
        let result = schedule_at(&plan, &options(30), now()).unwrap();
        assert!(!result.metadata.feasible);
        assert_eq!(entry(&result, "forever").end_date, date(2025, 1, 30));
    }

    #[test]
    fn test_empty_plan_is_feasible() {
        let plan = make_plan(vec![], &[]);
        let result = schedule_at(&plan, &options(7), now()).unwrap();
        assert!(result.schedule.is_empty());
        assert!(result.metadata.feasible);
        assert!(result.metadata.critical_path.is_empty());
    }

    #[test]
    fn test_schedule_json_round() {
        let input = json!({
            "goal": "Launch a website in 14 days",
            "tasks": [
                { "id": "t1", "title": "Design UI", "duration": "3d" },
                { "id": "t2", "title": "Develop backend", "duration": "1w", "status": "in-progress" }
            ],
            "dependencies": [{ "from": "t1", "to": "t2" }]
        })
        .to_string();

        let output = schedule_json(&input, &options(14)).unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["schedule"][1]["startDate"], json!("2025-01-04"));
        assert_eq!(value["schedule"][1]["endDate"], json!("2025-01-10"));
        assert_eq!(value["tasks"][1]["status"], json!("in-progress"));
        assert_eq!(value["metadata"]["feasible"], json!(true));
    }

    #[test]
    fn test_schedule_json_rejects_malformed_document() {
        let err = schedule_json("{ not json", &options(14)).unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");
    }
}
