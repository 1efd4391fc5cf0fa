//! Heuristic study scheduler.
//!
//! Turns an assignment into a list of suggested study sessions in three
//! pure stages:
//! - Budget estimation: total study hours from effort, difficulty,
//!   importance, and grade gap
//! - Session planning: session length/count and a day distribution
//!   picked by timeline tier
//! - Materialization: concrete dated records with focus labels,
//!   priorities, and suggested time-of-day windows
//!
//! The reference date is always injected by the caller, so identical
//! inputs produce identical plans. The scheduler never touches the
//! stores; persisting a plan is the calling application's job.

pub mod analysis;
pub mod estimator;
pub mod materializer;
pub mod planner;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::assignment::Assignment;
use crate::error::SchedulerError;

pub use analysis::{balance_adjustments, break_duration, daily_workload, study_tips, BalanceWarning};
pub use estimator::estimate_hours;
pub use materializer::ScheduleItem;
pub use planner::{DistributionEntry, Priority, SessionParameters};

/// Scheduler configuration.
#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
    /// Daily study-hour cap used by balance analysis
    pub max_daily_hours: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { max_daily_hours: 3.0 }
    }
}

/// A complete study plan for one assignment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StudyPlan {
    /// Planned sessions, sorted by date
    pub items: Vec<ScheduleItem>,
    /// Estimated total study hours
    pub total_hours: f64,
    /// Number of planned sessions
    pub total_sessions: u32,
    /// Whole days between the reference date and the due date
    pub days_until_due: i64,
    /// Hours per session before weekend adjustments
    pub session_length: f64,
    /// Count of distinct dates used
    pub study_days: usize,
}

/// Heuristic study scheduler.
pub struct StudyScheduler {
    config: SchedulerConfig,
}

impl StudyScheduler {
    /// Create a scheduler with default config.
    pub fn new() -> Self {
        Self {
            config: SchedulerConfig::default(),
        }
    }

    /// Create with custom config.
    pub fn with_config(config: SchedulerConfig) -> Self {
        Self { config }
    }

    /// Generate a study plan for an assignment.
    ///
    /// `today` is the reference date; the due date may be today itself
    /// (planned as a one-day horizon) but not in the past.
    ///
    /// # Errors
    /// [`SchedulerError::PastDueDate`] when the due date precedes
    /// `today`; [`SchedulerError::InvalidAssignment`] for inputs that
    /// fail validation. Fails atomically, producing no partial plan.
    pub fn generate_plan(
        &self,
        assignment: &Assignment,
        today: NaiveDate,
    ) -> Result<StudyPlan, SchedulerError> {
        assignment.validate()?;

        let days_until_due = (assignment.due_date - today).num_days();
        if days_until_due < 0 {
            return Err(SchedulerError::PastDueDate {
                due: assignment.due_date,
                today,
            });
        }

        let total_hours = estimator::estimate_hours(assignment)?;
        let horizon = days_until_due.max(1);
        let params = planner::plan_sessions(assignment.difficulty, total_hours, horizon);
        let distribution = planner::distribute(&params, assignment.difficulty, horizon, today);
        let items = materializer::materialize(&distribution, assignment, today);

        let study_days = items.iter().map(|item| item.date).collect::<BTreeSet<_>>().len();

        tracing::debug!(
            assignment = %assignment.id,
            total_hours,
            total_sessions = params.total_sessions,
            days_until_due,
            study_days,
            "generated study plan"
        );

        Ok(StudyPlan {
            items,
            total_hours,
            total_sessions: params.total_sessions,
            days_until_due,
            session_length: params.session_length,
            study_days,
        })
    }

    /// Flag overloaded days in a plan against the configured daily cap.
    pub fn balance_adjustments(&self, plan: &StudyPlan) -> Vec<BalanceWarning> {
        analysis::balance_adjustments(&plan.items, self.config.max_daily_hours)
    }
}

impl Default for StudyScheduler {
    fn default() -> Self {
        Self::new()
    }
}
