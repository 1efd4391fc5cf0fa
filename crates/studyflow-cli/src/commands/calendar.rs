use chrono::NaiveDate;
use clap::Subcommand;
use studyflow_core::storage::{AccountStore, CalendarStore, EventCategory, NewEvent};

use super::require_session;

#[derive(Subcommand)]
pub enum CalendarAction {
    /// Add an event to the logged-in user's calendar
    Add {
        /// Event date (YYYY-MM-DD)
        date: NaiveDate,
        title: String,
        /// assignment | exam | study | other
        #[arg(long, default_value = "other")]
        category: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
    },
    /// List events on a date
    List {
        date: NaiveDate,
        #[arg(long)]
        json: bool,
    },
    /// List events over a window of days
    Range {
        from: NaiveDate,
        #[arg(long, default_value_t = 7)]
        days: u32,
        #[arg(long)]
        json: bool,
    },
    /// Per-date event counts by category over a window
    Counts {
        from: NaiveDate,
        #[arg(long, default_value_t = 7)]
        days: u32,
    },
    /// Update an event by id
    Update {
        id: String,
        date: NaiveDate,
        title: String,
        #[arg(long, default_value = "other")]
        category: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
    },
    /// Delete an event by id
    Delete { id: String },
    /// Delete every event on a date
    ClearDate { date: NaiveDate },
}

fn parse_category(s: &str) -> Result<EventCategory, Box<dyn std::error::Error>> {
    match s {
        "assignment" => Ok(EventCategory::Assignment),
        "exam" => Ok(EventCategory::Exam),
        "study" => Ok(EventCategory::Study),
        "other" => Ok(EventCategory::Other),
        _ => Err(format!("unknown category '{s}' (expected assignment|exam|study|other)").into()),
    }
}

pub fn run(action: CalendarAction) -> Result<(), Box<dyn std::error::Error>> {
    let accounts = AccountStore::open()?;
    let user = require_session(&accounts)?;
    let store = CalendarStore::open()?;

    match action {
        CalendarAction::Add {
            date,
            title,
            category,
            description,
            start,
            end,
        } => {
            let event = store.add_event(&NewEvent {
                username: user.username,
                date,
                title,
                category: parse_category(&category)?,
                description,
                start_time: start,
                end_time: end,
            })?;
            println!("event added: {}", event.id);
        }
        CalendarAction::List { date, json } => {
            let events = store.events_on(&user.username, date)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&events)?);
            } else {
                for event in events {
                    println!("{}  [{:?}] {}", event.id, event.category, event.title);
                }
            }
        }
        CalendarAction::Range { from, days, json } => {
            let window = store.events_in_range(&user.username, from, days)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&window)?);
            } else {
                for (date, events) in window {
                    println!("{date}:");
                    for event in events {
                        println!("  [{:?}] {}", event.category, event.title);
                    }
                }
            }
        }
        CalendarAction::Counts { from, days } => {
            let counts = store.counts_by_category(&user.username, from, days)?;
            for (date, count) in counts {
                println!(
                    "{date}: {} total (assignments {}, exams {}, study {}, other {})",
                    count.total(),
                    count.assignment,
                    count.exam,
                    count.study,
                    count.other
                );
            }
        }
        CalendarAction::Update {
            id,
            date,
            title,
            category,
            description,
            start,
            end,
        } => {
            store.update_event(
                &id,
                &NewEvent {
                    username: user.username,
                    date,
                    title,
                    category: parse_category(&category)?,
                    description,
                    start_time: start,
                    end_time: end,
                },
            )?;
            println!("event updated: {id}");
        }
        CalendarAction::Delete { id } => {
            store.delete_event(&id)?;
            println!("event deleted: {id}");
        }
        CalendarAction::ClearDate { date } => {
            let removed = store.delete_events_on(&user.username, date)?;
            println!("removed {removed} events on {date}");
        }
    }
    Ok(())
}
