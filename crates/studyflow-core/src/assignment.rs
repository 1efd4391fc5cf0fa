//! Assignment input type and boundary validation.
//!
//! The scheduler only ever sees an [`Assignment`] that has passed
//! [`Assignment::validate`], so the distribution math never runs on
//! out-of-range difficulty or non-positive hour estimates.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::SchedulerError;

/// An assignment to plan study sessions for.
///
/// Owned by the caller; the scheduler treats it as plain input data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    /// Opaque identifier, carried through to schedule items
    pub id: String,
    /// Assignment title
    pub title: String,
    /// Course the assignment belongs to
    pub course: String,
    /// Calendar due date
    pub due_date: NaiveDate,
    /// Caller's own effort estimate in hours (must be positive)
    pub estimated_hours: f64,
    /// Difficulty rating, 1 (easy) to 5 (hard)
    pub difficulty: u8,
    /// Importance as a percentage of the course grade (15 is neutral)
    pub importance: f64,
    /// Current grade percentage, if known
    pub current_grade: Option<f64>,
    /// Target grade percentage, if set
    pub target_grade: Option<f64>,
}

impl Assignment {
    /// Check the fields the scheduler's arithmetic depends on.
    ///
    /// # Errors
    /// Returns [`SchedulerError::InvalidAssignment`] for non-positive or
    /// non-finite `estimated_hours`, difficulty outside 1-5, or a
    /// negative/non-finite importance.
    pub fn validate(&self) -> Result<(), SchedulerError> {
        if !self.estimated_hours.is_finite() || self.estimated_hours <= 0.0 {
            return Err(SchedulerError::InvalidAssignment {
                field: "estimated_hours".to_string(),
                message: format!("must be a positive number, got {}", self.estimated_hours),
            });
        }
        if !(1..=5).contains(&self.difficulty) {
            return Err(SchedulerError::InvalidAssignment {
                field: "difficulty".to_string(),
                message: format!("must be between 1 and 5, got {}", self.difficulty),
            });
        }
        if !self.importance.is_finite() || self.importance < 0.0 {
            return Err(SchedulerError::InvalidAssignment {
                field: "importance".to_string(),
                message: format!("must be a non-negative percentage, got {}", self.importance),
            });
        }
        for (field, value) in [
            ("current_grade", self.current_grade),
            ("target_grade", self.target_grade),
        ] {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(SchedulerError::InvalidAssignment {
                        field: field.to_string(),
                        message: format!("must be a finite percentage, got {v}"),
                    });
                }
            }
        }
        Ok(())
    }

    /// Grade gap (`target - current`) when both grades are present and
    /// the gap is positive.
    pub fn grade_gap(&self) -> Option<f64> {
        match (self.current_grade, self.target_grade) {
            (Some(current), Some(target)) if target > current => Some(target - current),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_assignment() -> Assignment {
        Assignment {
            id: "a-1".to_string(),
            title: "Problem set 3".to_string(),
            course: "MATH 201".to_string(),
            due_date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            estimated_hours: 4.0,
            difficulty: 3,
            importance: 15.0,
            current_grade: None,
            target_grade: None,
        }
    }

    #[test]
    fn valid_assignment_passes() {
        assert!(base_assignment().validate().is_ok());
    }

    #[test]
    fn zero_hours_rejected() {
        let mut a = base_assignment();
        a.estimated_hours = 0.0;
        let err = a.validate().unwrap_err();
        assert!(matches!(
            err,
            SchedulerError::InvalidAssignment { ref field, .. } if field == "estimated_hours"
        ));
    }

    #[test]
    fn out_of_range_difficulty_rejected() {
        for difficulty in [0u8, 6, 99] {
            let mut a = base_assignment();
            a.difficulty = difficulty;
            assert!(a.validate().is_err(), "difficulty {difficulty} should fail");
        }
    }

    #[test]
    fn nan_hours_rejected() {
        let mut a = base_assignment();
        a.estimated_hours = f64::NAN;
        assert!(a.validate().is_err());
    }

    #[test]
    fn grade_gap_requires_positive_delta() {
        let mut a = base_assignment();
        a.current_grade = Some(80.0);
        a.target_grade = Some(90.0);
        assert_eq!(a.grade_gap(), Some(10.0));

        a.target_grade = Some(70.0);
        assert_eq!(a.grade_gap(), None);

        a.target_grade = None;
        assert_eq!(a.grade_gap(), None);
    }
}
