//! Session sizing and day distribution.
//!
//! Second stage of the scheduling pipeline: picks a session length from
//! the time remaining, derives the session count, and spreads the
//! sessions across the available days. The timeline tier selects one of
//! three distribution strategies:
//! - **Very short** (<= 2 days): round-robin cramming, everything high
//!   priority, sessions capped at 1.5 h
//! - **Short** (3-7 days): weekday-first round-robin over the whole
//!   horizon
//! - **Long** (> 7 days): 2-3 sessions per 7-day week, weekday slots
//!   preferred, weekend slots as fallback

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Priority of a planned session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Close to today or close to the due date
    High,
    /// Weekday session in the first half of the horizon
    Medium,
    /// Everything else
    Normal,
}

/// Derived session sizing for one scheduling call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SessionParameters {
    /// Hours per session, 1-3
    pub session_length: f64,
    /// Number of sessions, >= 1
    pub total_sessions: u32,
}

/// One planned session before dates and labels are attached.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DistributionEntry {
    /// Offset from the reference date, >= 1
    pub days_from_now: i64,
    /// Session length in hours
    pub length: f64,
    /// Session priority
    pub priority: Priority,
    /// Whether the concrete date falls on Saturday or Sunday
    pub is_weekend: bool,
}

/// Derive session length and count from the time remaining.
///
/// Length tiers on `days_until_due`:
/// - `<= 3` days: `ceil(difficulty / 3)` clamped to 1-2 (cramming)
/// - `4-7` days: `ceil(difficulty / 2)` clamped to 1-3
/// - `> 7` days: `ceil(difficulty / 1.5)` clamped to 1-3
pub fn plan_sessions(difficulty: u8, total_hours: f64, days_until_due: i64) -> SessionParameters {
    let difficulty = f64::from(difficulty);
    let session_length = if days_until_due <= 3 {
        (difficulty / 3.0).ceil().clamp(1.0, 2.0)
    } else if days_until_due <= 7 {
        (difficulty / 2.0).ceil().clamp(1.0, 3.0)
    } else {
        (difficulty / 1.5).ceil().clamp(1.0, 3.0)
    };

    let total_sessions = ((total_hours / session_length).ceil() as u32).max(1);

    SessionParameters {
        session_length,
        total_sessions,
    }
}

/// Whether `today + days_from_now` lands on a weekend.
pub fn is_weekend(today: NaiveDate, days_from_now: i64) -> bool {
    matches!(
        (today + Duration::days(days_from_now)).weekday(),
        Weekday::Sat | Weekday::Sun
    )
}

/// Priority rule shared by the short and long strategies.
///
/// High near both ends of the horizon, medium for weekday sessions in
/// the first half, normal otherwise.
pub fn determine_priority(day: i64, days_until_due: i64, is_weekend: bool) -> Priority {
    if day <= 2 || day >= days_until_due - 1 {
        Priority::High
    } else if !is_weekend && day <= days_until_due / 2 {
        Priority::Medium
    } else {
        Priority::Normal
    }
}

/// Spread sessions across the available days.
///
/// `days_until_due` may be 0 for a due-today assignment; the planning
/// horizon is floored at one day. Entries come back sorted by
/// `days_from_now` ascending, exactly `params.total_sessions` of them.
pub fn distribute(
    params: &SessionParameters,
    difficulty: u8,
    days_until_due: i64,
    today: NaiveDate,
) -> Vec<DistributionEntry> {
    let horizon = days_until_due.max(1);
    if horizon <= 2 {
        distribute_very_short(params, horizon, today)
    } else if horizon <= 7 {
        distribute_short(params, difficulty, horizon, today)
    } else {
        distribute_long(params, horizon, today)
    }
}

/// A candidate day within the horizon.
#[derive(Debug, Clone, Copy)]
struct DaySlot {
    day: i64,
    is_weekend: bool,
}

fn day_slots(horizon: i64, today: NaiveDate) -> Vec<DaySlot> {
    (1..=horizon)
        .map(|day| DaySlot {
            day,
            is_weekend: is_weekend(today, day),
        })
        .collect()
}

/// Shorten a weekend session by half an hour, never below one hour.
fn weekend_length(length: f64) -> f64 {
    (length - 0.5).max(1.0)
}

/// Cramming: fill each day in turn with up to `ceil(total / days)`
/// sessions, capped at 1.5 h each, all high priority.
fn distribute_very_short(
    params: &SessionParameters,
    horizon: i64,
    today: NaiveDate,
) -> Vec<DistributionEntry> {
    let total = params.total_sessions as usize;
    let sessions_per_day = (params.total_sessions as f64 / horizon as f64).ceil() as usize;
    let length = params.session_length.min(1.5);

    let mut entries = Vec::with_capacity(total);
    'days: for day in 1..=horizon {
        for _ in 0..sessions_per_day {
            if entries.len() == total {
                break 'days;
            }
            entries.push(DistributionEntry {
                days_from_now: day,
                length,
                priority: Priority::High,
                is_weekend: is_weekend(today, day),
            });
        }
    }
    entries
}

/// Short horizon: round-robin over days sorted weekday-first, then
/// re-sorted chronologically.
fn distribute_short(
    params: &SessionParameters,
    difficulty: u8,
    horizon: i64,
    today: NaiveDate,
) -> Vec<DistributionEntry> {
    let mut slots = day_slots(horizon, today);
    slots.sort_by_key(|slot| (slot.is_weekend, slot.day));

    let mut entries: Vec<DistributionEntry> = (0..params.total_sessions as usize)
        .map(|i| {
            let slot = slots[i % slots.len()];
            let length = if slot.is_weekend && difficulty >= 4 {
                weekend_length(params.session_length)
            } else {
                params.session_length
            };
            DistributionEntry {
                days_from_now: slot.day,
                length,
                priority: determine_priority(slot.day, horizon, slot.is_weekend),
                is_weekend: slot.is_weekend,
            }
        })
        .collect();

    entries.sort_by_key(|entry| entry.days_from_now);
    entries
}

/// Long horizon: partition into 7-day weeks, place 2-3 sessions per
/// week on weekday slots first, weekend slots only when a week runs out
/// of weekdays.
fn distribute_long(
    params: &SessionParameters,
    horizon: i64,
    today: NaiveDate,
) -> Vec<DistributionEntry> {
    let total = params.total_sessions as usize;
    let weeks = (horizon + 6) / 7;
    let per_week = ((params.total_sessions as f64 / weeks as f64).ceil() as u32).clamp(2, 3);

    let mut entries = Vec::with_capacity(total);
    for week in 0..weeks {
        if entries.len() == total {
            break;
        }
        let first = week * 7 + 1;
        let last = (week * 7 + 7).min(horizon);

        let week_slots = day_slots_in(first, last, today);
        let (weekdays, weekends): (Vec<DaySlot>, Vec<DaySlot>) =
            week_slots.into_iter().partition(|slot| !slot.is_weekend);

        for slot in weekdays
            .into_iter()
            .chain(weekends)
            .take(per_week as usize)
        {
            if entries.len() == total {
                break;
            }
            entries.push(make_entry(slot, params.session_length, horizon));
        }
    }

    // The 2-3 per-week cap can run out of slots before every session is
    // placed; spread the remainder round-robin, weekdays first, so the
    // session count always matches the plan.
    if entries.len() < total {
        let mut slots = day_slots(horizon, today);
        slots.sort_by_key(|slot| (slot.is_weekend, slot.day));
        let mut cursor = 0;
        while entries.len() < total {
            let slot = slots[cursor % slots.len()];
            entries.push(make_entry(slot, params.session_length, horizon));
            cursor += 1;
        }
    }

    entries.sort_by_key(|entry| entry.days_from_now);
    entries
}

fn day_slots_in(first: i64, last: i64, today: NaiveDate) -> Vec<DaySlot> {
    (first..=last)
        .map(|day| DaySlot {
            day,
            is_weekend: is_weekend(today, day),
        })
        .collect()
}

fn make_entry(slot: DaySlot, session_length: f64, horizon: i64) -> DistributionEntry {
    let length = if slot.is_weekend {
        weekend_length(session_length)
    } else {
        session_length
    };
    DistributionEntry {
        days_from_now: slot.day,
        length,
        priority: determine_priority(slot.day, horizon, slot.is_weekend),
        is_weekend: slot.is_weekend,
    }
}
