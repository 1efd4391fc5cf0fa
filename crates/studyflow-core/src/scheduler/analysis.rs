//! Workload analysis and study guidance.
//!
//! Stateless helpers that run over a finished schedule (or the source
//! assignment) without feeding back into the distribution:
//! - break length per session tier
//! - deterministic study tips from assignment attributes
//! - per-day workload totals and overload warnings

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::assignment::Assignment;
use crate::scheduler::materializer::ScheduleItem;

/// Fraction of the daily cap considered a full weekend day.
pub const WEEKEND_LOAD_FACTOR: f64 = 0.7;

/// A date whose scheduled load exceeds the configured limit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BalanceWarning {
    /// The overloaded date
    pub date: NaiveDate,
    /// Total hours scheduled on that date
    pub scheduled_hours: f64,
    /// The limit the date was checked against
    pub limit_hours: f64,
    /// Human-readable adjustment suggestion
    pub suggestion: String,
}

/// Recommended break length in minutes for a session of `length` hours.
pub fn break_duration(length: f64) -> u32 {
    if length <= 1.0 {
        10
    } else if length <= 2.0 {
        15
    } else {
        20
    }
}

/// Assemble study tips from assignment attributes.
///
/// Deterministic: the same assignment always yields the same list.
pub fn study_tips(assignment: &Assignment) -> Vec<String> {
    let mut tips = Vec::new();

    if assignment.difficulty >= 4 {
        tips.push("Break difficult topics into smaller chunks and tackle one per session".to_string());
        tips.push("Use active recall instead of re-reading your notes".to_string());
    }
    if assignment.importance >= 20.0 {
        tips.push(format!(
            "This counts for {}% of your grade - start with the highest-value topics",
            assignment.importance
        ));
    }
    if assignment.grade_gap().is_some() {
        tips.push("Focus review time on the topics that cost you marks previously".to_string());
    }

    tips.push("Take the suggested breaks - cramming past focus limits loses retention".to_string());
    tips.push("End each session by writing a one-paragraph summary of what you covered".to_string());

    tips
}

/// Total scheduled hours per distinct date.
pub fn daily_workload(schedule: &[ScheduleItem]) -> BTreeMap<NaiveDate, f64> {
    let mut workload = BTreeMap::new();
    for item in schedule {
        *workload.entry(item.date).or_insert(0.0) += item.length;
    }
    workload
}

/// Flag dates whose load exceeds `max_daily_hours`, and weekend dates
/// exceeding 70% of it.
pub fn balance_adjustments(schedule: &[ScheduleItem], max_daily_hours: f64) -> Vec<BalanceWarning> {
    let weekend_limit = max_daily_hours * WEEKEND_LOAD_FACTOR;

    daily_workload(schedule)
        .into_iter()
        .filter_map(|(date, hours)| {
            let weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
            if hours > max_daily_hours {
                Some(BalanceWarning {
                    date,
                    scheduled_hours: hours,
                    limit_hours: max_daily_hours,
                    suggestion: format!(
                        "{:.1}h scheduled on {date}; move {:.1}h to a lighter day",
                        hours,
                        hours - max_daily_hours
                    ),
                })
            } else if weekend && hours > weekend_limit {
                Some(BalanceWarning {
                    date,
                    scheduled_hours: hours,
                    limit_hours: weekend_limit,
                    suggestion: format!(
                        "{hours:.1}h scheduled on weekend {date}; consider shifting some to a weekday"
                    ),
                })
            } else {
                None
            }
        })
        .collect()
}
