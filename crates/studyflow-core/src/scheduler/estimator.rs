//! Study-hour budget estimation.
//!
//! First stage of the scheduling pipeline: turns an assignment's own
//! effort estimate plus difficulty, importance, and grade-gap signals
//! into a whole-hour budget bounded to [1, 20].

use crate::assignment::Assignment;
use crate::error::SchedulerError;

/// Lower bound of the study-hour budget.
pub const MIN_TOTAL_HOURS: f64 = 1.0;
/// Upper bound of the study-hour budget.
pub const MAX_TOTAL_HOURS: f64 = 20.0;
/// Importance percentage treated as "no adjustment".
pub const NEUTRAL_IMPORTANCE: f64 = 15.0;

/// Multiplier applied for each difficulty rating.
fn difficulty_multiplier(difficulty: u8) -> f64 {
    match difficulty {
        1 => 0.7,
        2 => 0.85,
        3 => 1.0,
        4 => 1.2,
        5 => 1.5,
        _ => 1.0,
    }
}

/// Estimate the total study-hour budget for an assignment.
///
/// Scales `estimated_hours` by the difficulty multiplier and the
/// importance ratio (15% is neutral); a positive grade gap adds
/// `gap / 100` on top. The result is clamped to [1, 20] and rounded to
/// the nearest whole hour.
///
/// # Errors
/// Propagates [`SchedulerError::InvalidAssignment`] from
/// [`Assignment::validate`]; no arithmetic runs on invalid input.
pub fn estimate_hours(assignment: &Assignment) -> Result<f64, SchedulerError> {
    assignment.validate()?;

    let mut hours = assignment.estimated_hours * difficulty_multiplier(assignment.difficulty);
    hours *= assignment.importance / NEUTRAL_IMPORTANCE;

    if let Some(gap) = assignment.grade_gap() {
        hours *= 1.0 + gap / 100.0;
    }

    Ok(hours.clamp(MIN_TOTAL_HOURS, MAX_TOTAL_HOURS).round())
}
