//! Parsers for human-entered durations and deadline hints.
//!
//! Both parsers are total: malformed input yields `None` /
//! `DeadlineMarker::None` and the caller applies its default.
//!
//! Duration grammar (case-insensitive): `N`, `Nd`, `N days`, `Nw`, `N weeks`,
//! `Nm`, `N months`, `Ny`, `N years`. A month is 30 days and a year 365;
//! neither is calendar-aware.
//!
//! Deadline grammar: `Day N`, a bare integer `N` (day N), `YYYY-MM-DD`, or an
//! RFC 3339 timestamp (truncated to its UTC date).

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde_json::Value;

use crate::models::DeadlineMarker;

const DAYS_PER_WEEK: u64 = 7;
const DAYS_PER_MONTH: u64 = 30;
const DAYS_PER_YEAR: u64 = 365;

fn duration_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{1,7})\s*([a-z]*)$").expect("duration pattern is valid")
    })
}

fn day_marker_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:day\s*)?(\d{1,7})$").expect("day marker pattern is valid")
    })
}

/// Days per unit for a duration suffix, `None` for unknown suffixes.
fn unit_days(unit: &str) -> Option<u64> {
    match unit {
        "" | "d" | "day" | "days" => Some(1),
        "w" | "wk" | "wks" | "week" | "weeks" => Some(DAYS_PER_WEEK),
        "m" | "mo" | "mos" | "month" | "months" => Some(DAYS_PER_MONTH),
        "y" | "yr" | "yrs" | "year" | "years" => Some(DAYS_PER_YEAR),
        _ => None,
    }
}

/// Parse a duration string into a positive day count.
pub fn parse_duration(input: &str) -> Option<u32> {
    let normalized = input.trim().to_ascii_lowercase();
    let caps = duration_pattern().captures(&normalized)?;
    let count: u64 = caps[1].parse().ok()?;
    let days = count.checked_mul(unit_days(&caps[2])?)?;
    positive_days(days)
}

/// Parse a duration from a raw JSON value (number or string).
pub fn parse_duration_value(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => {
            if let Some(days) = n.as_u64() {
                positive_days(days)
            } else {
                // Fractional days round up to whole days
                let days = n.as_f64()?;
                if days.is_finite() && days > 0.0 && days <= u32::MAX as f64 {
                    Some(days.ceil() as u32)
                } else {
                    None
                }
            }
        }
        Value::String(s) => parse_duration(s),
        _ => None,
    }
}

fn positive_days(days: u64) -> Option<u32> {
    if days == 0 {
        return None;
    }
    u32::try_from(days).ok()
}

/// Parse a deadline expression into a typed marker.
pub fn parse_deadline(input: &str) -> DeadlineMarker {
    let normalized = input.trim().to_ascii_lowercase();
    if normalized.is_empty() {
        return DeadlineMarker::None;
    }

    if let Some(caps) = day_marker_pattern().captures(&normalized) {
        return match caps[1].parse::<i64>() {
            Ok(day) => DeadlineMarker::DayN { day },
            Err(_) => DeadlineMarker::None,
        };
    }

    match parse_calendar_date(&normalized) {
        Some(date) => DeadlineMarker::Date { date },
        None => DeadlineMarker::None,
    }
}

/// Parse a deadline from a raw JSON value (number or string).
pub fn parse_deadline_value(value: &Value) -> DeadlineMarker {
    match value {
        Value::Number(n) => match n.as_u64() {
            Some(day) if day <= 9_999_999 => DeadlineMarker::DayN { day: day as i64 },
            _ => DeadlineMarker::None,
        },
        Value::String(s) => parse_deadline(s),
        _ => DeadlineMarker::None,
    }
}

/// Parse `YYYY-MM-DD`, falling back to an RFC 3339 timestamp.
pub fn parse_calendar_date(input: &str) -> Option<NaiveDate> {
    let trimmed = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(&trimmed.to_ascii_uppercase())
        .ok()
        .map(|dt| dt.with_timezone(&Utc).date_naive())
}
