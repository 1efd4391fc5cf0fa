//! SQLite-based storage for per-user calendar events.
//!
//! Events are keyed by user and calendar date, ordered within each
//! date by insertion position. Range queries and per-date category
//! counts serve the calendar views; the study planner's output is
//! persisted here by the application layer as `study` events.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::data_dir;
use crate::error::{CoreError, Result, StoreError};

// === Helper functions ===

/// Parse event category from database string
fn parse_category(category_str: &str) -> EventCategory {
    match category_str {
        "assignment" => EventCategory::Assignment,
        "exam" => EventCategory::Exam,
        "study" => EventCategory::Study,
        _ => EventCategory::Other,
    }
}

/// Format event category for database storage
fn format_category(category: EventCategory) -> &'static str {
    match category {
        EventCategory::Assignment => "assignment",
        EventCategory::Exam => "exam",
        EventCategory::Study => "study",
        EventCategory::Other => "other",
    }
}

/// Parse datetime from an RFC3339 string with fallback to current time
fn parse_datetime_fallback(dt_str: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(dt_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Build an EventRecord from a database row
fn row_to_event(row: &rusqlite::Row) -> rusqlite::Result<EventRecord> {
    let category_str: String = row.get(4)?;
    let date_str: String = row.get(2)?;
    let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
        .unwrap_or_else(|_| Utc::now().date_naive());

    Ok(EventRecord {
        id: row.get(0)?,
        username: row.get(1)?,
        date,
        title: row.get(3)?,
        category: parse_category(&category_str),
        description: row.get(5)?,
        start_time: row.get(6)?,
        end_time: row.get(7)?,
        created_at: parse_datetime_fallback(&row.get::<_, String>(8)?),
    })
}

/// Category of a calendar event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Assignment,
    Exam,
    Study,
    Other,
}

/// A stored calendar event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: String,
    pub username: String,
    pub date: NaiveDate,
    pub title: String,
    pub category: EventCategory,
    pub description: Option<String>,
    /// Display start time, e.g. "6:00 PM"
    pub start_time: Option<String>,
    /// Display end time
    pub end_time: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating an event; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub username: String,
    pub date: NaiveDate,
    pub title: String,
    pub category: EventCategory,
    pub description: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

/// Per-date event counts split by category.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CategoryCounts {
    pub assignment: u32,
    pub exam: u32,
    pub study: u32,
    pub other: u32,
}

impl CategoryCounts {
    pub fn total(&self) -> u32 {
        self.assignment + self.exam + self.study + self.other
    }
}

/// SQLite database for calendar event storage.
pub struct CalendarStore {
    conn: Connection,
}

impl CalendarStore {
    /// Open the store at `~/.config/studyflow/calendar.db`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()
            .map_err(|e| CoreError::Custom(e.to_string()))?
            .join("calendar.db");
        Self::open_at(&path)
    }

    /// Open the store at an explicit path.
    pub fn open_at(path: &std::path::Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| {
            CoreError::Store(StoreError::OpenFailed {
                path: path.to_path_buf(),
                source,
            })
        })?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory store (for tests).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(StoreError::from)?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS events (
                    id          TEXT PRIMARY KEY,
                    username    TEXT NOT NULL,
                    date        TEXT NOT NULL,
                    title       TEXT NOT NULL,
                    category    TEXT NOT NULL,
                    description TEXT,
                    start_time  TEXT,
                    end_time    TEXT,
                    position    INTEGER NOT NULL,
                    created_at  TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_events_user_date ON events(username, date);",
            )
            .map_err(|e| StoreError::MigrationFailed(e.to_string()))?;
        Ok(())
    }

    /// Add an event, appended after existing events on the same date.
    pub fn add_event(&self, event: &NewEvent) -> Result<EventRecord> {
        let id = Uuid::new_v4().to_string();
        let date_str = event.date.format("%Y-%m-%d").to_string();

        let position: i64 = self
            .conn
            .query_row(
                "SELECT COALESCE(MAX(position), -1) + 1 FROM events
                 WHERE username = ?1 AND date = ?2",
                params![event.username, date_str],
                |row| row.get(0),
            )
            .map_err(StoreError::from)?;

        self.conn
            .execute(
                "INSERT INTO events (id, username, date, title, category, description,
                                     start_time, end_time, position, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    id,
                    event.username,
                    date_str,
                    event.title,
                    format_category(event.category),
                    event.description,
                    event.start_time,
                    event.end_time,
                    position,
                    Utc::now().to_rfc3339(),
                ],
            )
            .map_err(StoreError::from)?;

        tracing::debug!(%id, username = %event.username, date = %date_str, "event added");
        self.get_event(&id)
    }

    /// Fetch a single event by id.
    pub fn get_event(&self, id: &str) -> Result<EventRecord> {
        self.conn
            .query_row(
                "SELECT id, username, date, title, category, description, start_time,
                        end_time, created_at
                 FROM events WHERE id = ?1",
                params![id],
                row_to_event,
            )
            .optional()
            .map_err(StoreError::from)?
            .ok_or_else(|| {
                StoreError::NotFound {
                    kind: "event",
                    key: id.to_string(),
                }
                .into()
            })
    }

    /// Replace an event's stored fields, keeping id and position.
    pub fn update_event(&self, id: &str, event: &NewEvent) -> Result<EventRecord> {
        let changed = self
            .conn
            .execute(
                "UPDATE events SET username = ?1, date = ?2, title = ?3, category = ?4,
                        description = ?5, start_time = ?6, end_time = ?7
                 WHERE id = ?8",
                params![
                    event.username,
                    event.date.format("%Y-%m-%d").to_string(),
                    event.title,
                    format_category(event.category),
                    event.description,
                    event.start_time,
                    event.end_time,
                    id,
                ],
            )
            .map_err(StoreError::from)?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                kind: "event",
                key: id.to_string(),
            }
            .into());
        }
        self.get_event(id)
    }

    /// Delete a single event by id.
    pub fn delete_event(&self, id: &str) -> Result<()> {
        let changed = self
            .conn
            .execute("DELETE FROM events WHERE id = ?1", params![id])
            .map_err(StoreError::from)?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                kind: "event",
                key: id.to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Delete every event a user has on a date; returns how many went.
    pub fn delete_events_on(&self, username: &str, date: NaiveDate) -> Result<usize> {
        let changed = self
            .conn
            .execute(
                "DELETE FROM events WHERE username = ?1 AND date = ?2",
                params![username, date.format("%Y-%m-%d").to_string()],
            )
            .map_err(StoreError::from)?;
        Ok(changed)
    }

    /// Events for one user on one date, in insertion order.
    pub fn events_on(&self, username: &str, date: NaiveDate) -> Result<Vec<EventRecord>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, username, date, title, category, description, start_time,
                        end_time, created_at
                 FROM events WHERE username = ?1 AND date = ?2
                 ORDER BY position",
            )
            .map_err(StoreError::from)?;
        let rows = stmt
            .query_map(
                params![username, date.format("%Y-%m-%d").to_string()],
                row_to_event,
            )
            .map_err(StoreError::from)?;

        let mut events = Vec::new();
        for row in rows {
            events.push(row.map_err(StoreError::from)?);
        }
        Ok(events)
    }

    /// Events within a window of `days` days starting at `from`,
    /// grouped by date in chronological order.
    pub fn events_in_range(
        &self,
        username: &str,
        from: NaiveDate,
        days: u32,
    ) -> Result<BTreeMap<NaiveDate, Vec<EventRecord>>> {
        let until = from + Duration::days(i64::from(days));

        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, username, date, title, category, description, start_time,
                        end_time, created_at
                 FROM events WHERE username = ?1 AND date >= ?2 AND date < ?3
                 ORDER BY date, position",
            )
            .map_err(StoreError::from)?;
        let rows = stmt
            .query_map(
                params![
                    username,
                    from.format("%Y-%m-%d").to_string(),
                    until.format("%Y-%m-%d").to_string(),
                ],
                row_to_event,
            )
            .map_err(StoreError::from)?;

        let mut by_date: BTreeMap<NaiveDate, Vec<EventRecord>> = BTreeMap::new();
        for row in rows {
            let event = row.map_err(StoreError::from)?;
            by_date.entry(event.date).or_default().push(event);
        }
        Ok(by_date)
    }

    /// Per-date category counts over the same window as
    /// [`CalendarStore::events_in_range`].
    pub fn counts_by_category(
        &self,
        username: &str,
        from: NaiveDate,
        days: u32,
    ) -> Result<BTreeMap<NaiveDate, CategoryCounts>> {
        let until = from + Duration::days(i64::from(days));

        let mut stmt = self
            .conn
            .prepare(
                "SELECT date, category, COUNT(*) FROM events
                 WHERE username = ?1 AND date >= ?2 AND date < ?3
                 GROUP BY date, category",
            )
            .map_err(StoreError::from)?;
        let rows = stmt
            .query_map(
                params![
                    username,
                    from.format("%Y-%m-%d").to_string(),
                    until.format("%Y-%m-%d").to_string(),
                ],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, u32>(2)?,
                    ))
                },
            )
            .map_err(StoreError::from)?;

        let mut counts: BTreeMap<NaiveDate, CategoryCounts> = BTreeMap::new();
        for row in rows {
            let (date_str, category_str, count) = row.map_err(StoreError::from)?;
            let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
                .map_err(|e| StoreError::QueryFailed(format!("bad date '{date_str}': {e}")))?;
            let entry = counts.entry(date).or_default();
            match parse_category(&category_str) {
                EventCategory::Assignment => entry.assignment += count,
                EventCategory::Exam => entry.exam += count,
                EventCategory::Study => entry.study += count,
                EventCategory::Other => entry.other += count,
            }
        }
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(username: &str, date: NaiveDate, title: &str, category: EventCategory) -> NewEvent {
        NewEvent {
            username: username.to_string(),
            date,
            title: title.to_string(),
            category,
            description: None,
            start_time: Some("6:00 PM".to_string()),
            end_time: Some("8:00 PM".to_string()),
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    #[test]
    fn add_and_fetch_preserves_order() {
        let store = CalendarStore::open_memory().unwrap();
        store
            .add_event(&event("ada", date(3), "First", EventCategory::Study))
            .unwrap();
        store
            .add_event(&event("ada", date(3), "Second", EventCategory::Study))
            .unwrap();

        let events = store.events_on("ada", date(3)).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].title, "First");
        assert_eq!(events[1].title, "Second");
    }

    #[test]
    fn events_are_scoped_per_user() {
        let store = CalendarStore::open_memory().unwrap();
        store
            .add_event(&event("ada", date(3), "Mine", EventCategory::Study))
            .unwrap();
        store
            .add_event(&event("grace", date(3), "Hers", EventCategory::Exam))
            .unwrap();

        let events = store.events_on("ada", date(3)).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Mine");
    }

    #[test]
    fn update_replaces_fields() {
        let store = CalendarStore::open_memory().unwrap();
        let created = store
            .add_event(&event("ada", date(3), "Draft", EventCategory::Other))
            .unwrap();

        let mut changed = event("ada", date(4), "Final", EventCategory::Exam);
        changed.description = Some("room 204".to_string());
        let updated = store.update_event(&created.id, &changed).unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "Final");
        assert_eq!(updated.date, date(4));
        assert_eq!(updated.category, EventCategory::Exam);
        assert!(store.events_on("ada", date(3)).unwrap().is_empty());
    }

    #[test]
    fn delete_by_id_and_by_date() {
        let store = CalendarStore::open_memory().unwrap();
        let first = store
            .add_event(&event("ada", date(3), "First", EventCategory::Study))
            .unwrap();
        store
            .add_event(&event("ada", date(3), "Second", EventCategory::Study))
            .unwrap();
        store
            .add_event(&event("ada", date(4), "Keep", EventCategory::Study))
            .unwrap();

        store.delete_event(&first.id).unwrap();
        assert_eq!(store.events_on("ada", date(3)).unwrap().len(), 1);

        assert_eq!(store.delete_events_on("ada", date(3)).unwrap(), 1);
        assert!(store.events_on("ada", date(3)).unwrap().is_empty());
        assert_eq!(store.events_on("ada", date(4)).unwrap().len(), 1);

        assert!(store.delete_event(&first.id).is_err());
    }

    #[test]
    fn range_query_covers_window_start_inclusive() {
        let store = CalendarStore::open_memory().unwrap();
        store
            .add_event(&event("ada", date(3), "In", EventCategory::Study))
            .unwrap();
        store
            .add_event(&event("ada", date(9), "Also in", EventCategory::Exam))
            .unwrap();
        store
            .add_event(&event("ada", date(10), "Out", EventCategory::Study))
            .unwrap();

        let window = store.events_in_range("ada", date(3), 7).unwrap();
        assert_eq!(window.len(), 2);
        assert!(window.contains_key(&date(3)));
        assert!(window.contains_key(&date(9)));
        assert!(!window.contains_key(&date(10)));
    }

    #[test]
    fn category_counts_group_by_date() {
        let store = CalendarStore::open_memory().unwrap();
        store
            .add_event(&event("ada", date(3), "PS2", EventCategory::Assignment))
            .unwrap();
        store
            .add_event(&event("ada", date(3), "Prep", EventCategory::Study))
            .unwrap();
        store
            .add_event(&event("ada", date(3), "More prep", EventCategory::Study))
            .unwrap();
        store
            .add_event(&event("ada", date(5), "Midterm", EventCategory::Exam))
            .unwrap();

        let counts = store.counts_by_category("ada", date(1), 10).unwrap();
        assert_eq!(counts[&date(3)].assignment, 1);
        assert_eq!(counts[&date(3)].study, 2);
        assert_eq!(counts[&date(3)].total(), 3);
        assert_eq!(counts[&date(5)].exam, 1);
    }
}
