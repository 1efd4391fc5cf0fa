//! Integration tests for the full scheduling workflow.
//!
//! Exercises the whole pipeline from assignment to finished plan,
//! including the invariants every tier must uphold, plus property
//! tests over the valid input space.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use studyflow_core::scheduler::{analysis, estimator};
use studyflow_core::{Assignment, Priority, SchedulerError, StudyScheduler};

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
}

fn assignment(days_out: i64, hours: f64, difficulty: u8, importance: f64) -> Assignment {
    Assignment {
        id: format!("a-{days_out}-{difficulty}"),
        title: "Term paper".to_string(),
        course: "HIST 330".to_string(),
        due_date: monday() + Duration::days(days_out),
        estimated_hours: hours,
        difficulty,
        importance,
        current_grade: None,
        target_grade: None,
    }
}

#[test]
fn full_workflow_ten_day_assignment() {
    let scheduler = StudyScheduler::new();
    let plan = scheduler
        .generate_plan(&assignment(10, 4.0, 3, 15.0), monday())
        .unwrap();

    assert_eq!(plan.total_hours, 4.0);
    assert_eq!(plan.session_length, 2.0);
    assert_eq!(plan.total_sessions, 2);
    assert_eq!(plan.items.len(), 2);
    assert_eq!(plan.days_until_due, 10);

    // concrete dates line up with offsets
    for item in &plan.items {
        assert_eq!(item.date, monday() + Duration::days(item.days_from_now));
        assert_eq!(item.date_string, item.date.format("%Y-%m-%d").to_string());
        assert!(item.title.starts_with("HIST 330: "));
    }

    // workload/balance run over the finished plan
    let workload = analysis::daily_workload(&plan.items);
    assert_eq!(workload.values().sum::<f64>(), 4.0);
    assert!(scheduler.balance_adjustments(&plan).is_empty());
}

#[test]
fn cram_session_is_capped_and_high_priority() {
    let plan = StudyScheduler::new()
        .generate_plan(&assignment(1, 2.0, 5, 10.0), monday())
        .unwrap();

    assert_eq!(plan.total_sessions, 1);
    assert_eq!(plan.items[0].days_from_now, 1);
    assert!(plan.items[0].length <= 1.5);
    assert_eq!(plan.items[0].priority, Priority::High);
}

#[test]
fn past_due_fails_atomically() {
    let err = StudyScheduler::new()
        .generate_plan(&assignment(-1, 4.0, 3, 15.0), monday())
        .unwrap_err();
    assert!(matches!(err, SchedulerError::PastDueDate { .. }));
}

#[test]
fn due_today_plans_a_one_day_horizon() {
    let plan = StudyScheduler::new()
        .generate_plan(&assignment(0, 3.0, 2, 15.0), monday())
        .unwrap();
    assert_eq!(plan.days_until_due, 0);
    assert!(plan.items.iter().all(|i| i.days_from_now == 1));
}

#[test]
fn identical_inputs_produce_identical_plans() {
    let scheduler = StudyScheduler::new();
    let a = assignment(15, 8.0, 4, 30.0);
    assert_eq!(
        scheduler.generate_plan(&a, monday()).unwrap(),
        scheduler.generate_plan(&a, monday()).unwrap()
    );
}

proptest! {
    #[test]
    fn estimated_budget_stays_in_bounds(
        hours in 0.1f64..100.0,
        difficulty in 1u8..=5,
        importance in 0.0f64..120.0,
    ) {
        let a = assignment(10, hours, difficulty, importance);
        let budget = estimator::estimate_hours(&a).unwrap();
        prop_assert!((1.0..=20.0).contains(&budget));
        prop_assert_eq!(budget, budget.round());
    }

    #[test]
    fn every_plan_upholds_the_invariants(
        days_out in 0i64..60,
        hours in 0.5f64..30.0,
        difficulty in 1u8..=5,
        importance in 1.0f64..60.0,
    ) {
        let plan = StudyScheduler::new()
            .generate_plan(&assignment(days_out, hours, difficulty, importance), monday())
            .unwrap();

        // session count matches the emitted items
        prop_assert_eq!(plan.items.len(), plan.total_sessions as usize);

        // offsets stay inside the horizon and arrive sorted
        let horizon = plan.days_until_due.max(1);
        let days: Vec<i64> = plan.items.iter().map(|i| i.days_from_now).collect();
        prop_assert!(days.iter().all(|d| (1..=horizon).contains(d)));
        let mut sorted = days.clone();
        sorted.sort_unstable();
        prop_assert_eq!(days, sorted);

        // quantized total stays within one session of the budget
        let planned: f64 = plan.items.iter().map(|i| i.length).sum();
        prop_assert!(planned <= plan.total_hours + plan.session_length);

        // distinct study dates match the summary
        let distinct: std::collections::BTreeSet<_> =
            plan.items.iter().map(|i| i.date).collect();
        prop_assert_eq!(plan.study_days, distinct.len());
    }
}
