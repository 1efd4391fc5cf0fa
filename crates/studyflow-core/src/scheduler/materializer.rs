//! Schedule materialization.
//!
//! Final stage of the scheduling pipeline: expands the abstract
//! distribution into dated, labeled session records ready for display
//! or persistence.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::assignment::Assignment;
use crate::scheduler::planner::{DistributionEntry, Priority};

/// Focus labels for long progressions, in curriculum order.
const PROGRESSION_LABELS: [&str; 6] = [
    "Introduction & Overview",
    "Core Concepts & Theory",
    "Practice Problems",
    "Application & Analysis",
    "Review & Synthesis",
    "Final Preparation",
];

/// Suggested time-of-day windows.
const HIGH_PRIORITY_WEEKDAY: &str = "8:00 AM - 10:00 AM";
const HIGH_PRIORITY_WEEKEND: &str = "10:00 AM - 12:00 PM";
const HARD_SESSION: &str = "2:00 PM - 4:00 PM";
const DEFAULT_SESSION: &str = "6:00 PM - 8:00 PM";

/// A concrete planned study session.
///
/// Created fresh on every scheduling call and never mutated afterward;
/// ownership passes entirely to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleItem {
    /// Assignment this session studies for
    pub assignment_id: String,
    /// Assignment title, for display
    pub assignment_title: String,
    /// Item title, `"<course>: <focus>"`
    pub title: String,
    /// Description referencing the session's position in the plan
    pub description: String,
    /// What this session should cover
    pub focus: String,
    /// Concrete calendar date
    pub date: NaiveDate,
    /// The date formatted as `YYYY-MM-DD`
    pub date_string: String,
    /// Offset from the reference date
    pub days_from_now: i64,
    /// Session length in hours
    pub length: f64,
    /// Session priority
    pub priority: Priority,
    /// Whether the date falls on a weekend
    pub is_weekend: bool,
    /// Suggested time-of-day window
    pub optimal_time: String,
}

/// Expand a distribution into concrete schedule items.
pub fn materialize(
    distribution: &[DistributionEntry],
    assignment: &Assignment,
    today: NaiveDate,
) -> Vec<ScheduleItem> {
    let total = distribution.len();
    distribution
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let date = today + Duration::days(entry.days_from_now);
            let focus = session_focus(i, total, assignment.difficulty);
            ScheduleItem {
                assignment_id: assignment.id.clone(),
                assignment_title: assignment.title.clone(),
                title: format!("{}: {}", assignment.course, focus),
                description: format!(
                    "Study session {} of {} for {}",
                    i + 1,
                    total,
                    assignment.title
                ),
                focus: focus.to_string(),
                date,
                date_string: date.format("%Y-%m-%d").to_string(),
                days_from_now: entry.days_from_now,
                length: entry.length,
                priority: entry.priority,
                is_weekend: entry.is_weekend,
                optimal_time: optimal_time(entry.priority, entry.is_weekend, assignment.difficulty)
                    .to_string(),
            }
        })
        .collect()
}

/// Focus label for session `i` (0-based) of `total`.
///
/// Short plans get a planning/core/review arc, mid-size plans use a
/// progress ratio, and long plans walk the full progression list in
/// 4 segments (6 for difficulty >= 4).
pub fn session_focus(i: usize, total: usize, difficulty: u8) -> &'static str {
    if total <= 3 {
        if i == 0 {
            "Introduction & Planning"
        } else if i == total - 1 {
            "Final Review"
        } else {
            "Core Concepts"
        }
    } else if total <= 6 {
        let progress = i as f64 / (total - 1) as f64;
        if progress < 0.3 {
            "Introduction & Basics"
        } else if progress < 0.6 {
            "Core Concepts"
        } else {
            "Practice & Review"
        }
    } else {
        let segments = if difficulty >= 4 { 6 } else { 4 };
        let index = (i * segments / total).min(PROGRESSION_LABELS.len() - 1);
        PROGRESSION_LABELS[index]
    }
}

/// Suggested time window from priority, weekend flag, and difficulty.
pub fn optimal_time(priority: Priority, is_weekend: bool, difficulty: u8) -> &'static str {
    match priority {
        Priority::High if is_weekend => HIGH_PRIORITY_WEEKEND,
        Priority::High => HIGH_PRIORITY_WEEKDAY,
        _ if difficulty >= 4 => HARD_SESSION,
        _ => DEFAULT_SESSION,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment() -> Assignment {
        Assignment {
            id: "a-7".to_string(),
            title: "Lab report".to_string(),
            course: "CHEM 101".to_string(),
            due_date: NaiveDate::from_ymd_opt(2025, 3, 13).unwrap(),
            estimated_hours: 4.0,
            difficulty: 3,
            importance: 15.0,
            current_grade: None,
            target_grade: None,
        }
    }

    fn entry(day: i64) -> DistributionEntry {
        DistributionEntry {
            days_from_now: day,
            length: 2.0,
            priority: Priority::Medium,
            is_weekend: false,
        }
    }

    #[test]
    fn dates_and_strings_line_up() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let items = materialize(&[entry(1), entry(4)], &assignment(), today);

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].date, NaiveDate::from_ymd_opt(2025, 3, 4).unwrap());
        assert_eq!(items[0].date_string, "2025-03-04");
        assert_eq!(items[1].date_string, "2025-03-07");
    }

    #[test]
    fn titles_and_descriptions_reference_the_assignment() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let items = materialize(&[entry(1), entry(2)], &assignment(), today);

        assert_eq!(items[0].title, "CHEM 101: Introduction & Planning");
        assert_eq!(items[0].description, "Study session 1 of 2 for Lab report");
        assert_eq!(items[1].description, "Study session 2 of 2 for Lab report");
        assert_eq!(items[1].assignment_id, "a-7");
    }

    #[test]
    fn short_plan_focus_arc() {
        assert_eq!(session_focus(0, 3, 3), "Introduction & Planning");
        assert_eq!(session_focus(1, 3, 3), "Core Concepts");
        assert_eq!(session_focus(2, 3, 3), "Final Review");
        // a single session starts at the beginning
        assert_eq!(session_focus(0, 1, 3), "Introduction & Planning");
    }

    #[test]
    fn mid_plan_focus_uses_progress_ratio() {
        assert_eq!(session_focus(0, 5, 3), "Introduction & Basics");
        assert_eq!(session_focus(1, 5, 3), "Introduction & Basics");
        assert_eq!(session_focus(2, 5, 3), "Core Concepts");
        assert_eq!(session_focus(3, 5, 3), "Practice & Review");
        assert_eq!(session_focus(4, 5, 3), "Practice & Review");
    }

    #[test]
    fn long_plan_walks_progression() {
        // 8 sessions, 4 segments: pairs of sessions share a label
        assert_eq!(session_focus(0, 8, 3), "Introduction & Overview");
        assert_eq!(session_focus(2, 8, 3), "Core Concepts & Theory");
        assert_eq!(session_focus(4, 8, 3), "Practice Problems");
        assert_eq!(session_focus(7, 8, 3), "Application & Analysis");
        // difficulty >= 4 stretches into 6 segments
        assert_eq!(session_focus(6, 8, 5), "Review & Synthesis");
        assert_eq!(session_focus(7, 8, 5), "Final Preparation");
    }

    #[test]
    fn time_window_table() {
        assert_eq!(optimal_time(Priority::High, false, 3), HIGH_PRIORITY_WEEKDAY);
        assert_eq!(optimal_time(Priority::High, true, 3), HIGH_PRIORITY_WEEKEND);
        assert_eq!(optimal_time(Priority::Medium, false, 4), HARD_SESSION);
        assert_eq!(optimal_time(Priority::Normal, true, 2), DEFAULT_SESSION);
    }
}
