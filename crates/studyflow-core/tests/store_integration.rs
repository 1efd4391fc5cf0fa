//! Integration tests for the account and calendar stores.
//!
//! Tests the application-level workflow: create an account, log in,
//! generate a plan, persist it as calendar events, and read it back
//! through the range and aggregate queries.

use chrono::{Duration, NaiveDate};
use studyflow_core::storage::{AccountStore, CalendarStore, EventCategory, NewEvent, NewUser};
use studyflow_core::{Assignment, StudyScheduler};

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
}

fn ada() -> NewUser {
    NewUser {
        username: "ada".to_string(),
        email: "ada@example.com".to_string(),
        password: "Sturdy-pass1".to_string(),
        mood: Some("focused".to_string()),
        agreed_to_terms: true,
    }
}

#[test]
fn full_plan_to_calendar_workflow() {
    let accounts = AccountStore::open_memory().unwrap();
    let calendar = CalendarStore::open_memory().unwrap();

    accounts.signup(&ada()).unwrap();
    let user = accounts.login("ada@example.com", "Sturdy-pass1").unwrap();

    let assignment = Assignment {
        id: "a-1".to_string(),
        title: "Term paper".to_string(),
        course: "HIST 330".to_string(),
        due_date: monday() + Duration::days(10),
        estimated_hours: 6.0,
        difficulty: 4,
        importance: 25.0,
        current_grade: None,
        target_grade: None,
    };
    let plan = StudyScheduler::new()
        .generate_plan(&assignment, monday())
        .unwrap();
    assert!(!plan.items.is_empty());

    // the application layer wires plan output into the calendar store
    for item in &plan.items {
        calendar
            .add_event(&NewEvent {
                username: user.username.clone(),
                date: item.date,
                title: item.title.clone(),
                category: EventCategory::Study,
                description: Some(item.description.clone()),
                start_time: None,
                end_time: None,
            })
            .unwrap();
    }

    // every planned session is visible in an 11-day window
    let window = calendar.events_in_range("ada", monday(), 11).unwrap();
    let stored: usize = window.values().map(Vec::len).sum();
    assert_eq!(stored, plan.items.len());

    let counts = calendar.counts_by_category("ada", monday(), 11).unwrap();
    let study_total: u32 = counts.values().map(|c| c.study).sum();
    assert_eq!(study_total, plan.total_sessions);
    assert_eq!(counts.len(), plan.study_days);
}

#[test]
fn replanning_after_clearing_a_date_is_consistent() {
    let calendar = CalendarStore::open_memory().unwrap();
    let date = monday() + Duration::days(2);

    for title in ["First pass", "Second pass"] {
        calendar
            .add_event(&NewEvent {
                username: "ada".to_string(),
                date,
                title: title.to_string(),
                category: EventCategory::Study,
                description: None,
                start_time: None,
                end_time: None,
            })
            .unwrap();
    }

    assert_eq!(calendar.delete_events_on("ada", date).unwrap(), 2);
    assert!(calendar.events_on("ada", date).unwrap().is_empty());
    assert!(calendar
        .counts_by_category("ada", monday(), 7)
        .unwrap()
        .is_empty());
}

#[test]
fn accounts_persist_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("accounts.db");

    {
        let accounts = AccountStore::open_at(&path).unwrap();
        accounts.signup(&ada()).unwrap();
    }

    let reopened = AccountStore::open_at(&path).unwrap();
    let user = reopened.get_user("ada").unwrap();
    assert_eq!(user.email, "ada@example.com");
    reopened.login("ada@example.com", "Sturdy-pass1").unwrap();
}

#[test]
fn session_flags_survive_store_roundtrip() {
    let accounts = AccountStore::open_memory().unwrap();
    accounts.signup(&ada()).unwrap();

    assert!(accounts.current_user().unwrap().is_none());
    accounts.login("ada@example.com", "Sturdy-pass1").unwrap();

    let current = accounts.current_user().unwrap().unwrap();
    assert_eq!(current.username, "ada");
    assert!(current.last_login.is_some());

    accounts.logout().unwrap();
    assert!(accounts.current_user().unwrap().is_none());
}
