//! Append-only event log.

use chrono::Utc;
use rusqlite::{params, Connection, Result};

/// A recorded event row.
#[derive(Debug, Clone)]
pub struct EventRecord {
    pub id: i64,
    pub source: String,
    pub user_id: i64,
    pub recorded_on: String,
    pub data: String,
}

/// Append one event; returns its row id.
pub fn record_event(conn: &Connection, source: &str, user_id: i64, data: &str) -> Result<i64> {
    conn.execute(
        "INSERT INTO events (source, user_id, recorded_on, data) VALUES (?1, ?2, ?3, ?4)",
        params![source, user_id, Utc::now().to_rfc3339(), data],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Number of events of one kind.
pub fn count_events(conn: &Connection, source: &str) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM events WHERE source = ?1",
        params![source],
        |row| row.get(0),
    )
}

/// Most recent events of one kind, newest first.
pub fn list_events(conn: &Connection, source: &str, limit: i64) -> Result<Vec<EventRecord>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT id, source, user_id, recorded_on, data
        FROM events
        WHERE source = ?1
        ORDER BY id DESC
        LIMIT ?2
        "#,
    )?;
    let events = stmt
        .query_map(params![source, limit], |row| {
            Ok(EventRecord {
                id: row.get(0)?,
                source: row.get(1)?,
                user_id: row.get(2)?,
                recorded_on: row.get(3)?,
                data: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>>>()?;
    Ok(events)
}
