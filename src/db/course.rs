//! Course structure (units and ordered lessons) and the SQLite-backed course
//! collaborator used by the submission recorder.

use rusqlite::{params, Connection, Result};

use crate::auth::Learner;
use crate::content::{CourseOutline, LessonDirectory, LessonRef};
use crate::services::recorder::{EventLog, ProgressTracker, StoreError};

use super::LogOnError;

/// Upsert the outline's units and lessons; positions follow file order.
pub fn seed_outline(conn: &Connection, outline: &CourseOutline) -> Result<()> {
    let tx = conn.unchecked_transaction()?;

    for (unit_pos, unit) in outline.units.iter().enumerate() {
        tx.execute(
            r#"
            INSERT INTO units (id, title, position) VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET title = excluded.title, position = excluded.position
            "#,
            params![unit.id, unit.title, unit_pos as i64],
        )?;

        for (lesson_pos, lesson) in unit.lessons.iter().enumerate() {
            tx.execute(
                r#"
                INSERT INTO lessons (id, unit_id, title, position) VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(id) DO UPDATE SET
                    unit_id = excluded.unit_id,
                    title = excluded.title,
                    position = excluded.position
                "#,
                params![lesson.id, unit.id, lesson.title, lesson_pos as i64],
            )?;
        }
    }

    tx.commit()?;
    tracing::info!("Seeded course outline: {} units", outline.units.len());
    Ok(())
}

/// Lessons of a unit in course order.
pub fn lessons_for_unit(conn: &Connection, unit_id: i64) -> Result<Vec<LessonRef>> {
    let mut stmt = conn.prepare(
        "SELECT id, title FROM lessons WHERE unit_id = ?1 ORDER BY position, id",
    )?;
    let lessons = stmt
        .query_map(params![unit_id], |row| {
            Ok(LessonRef {
                lesson_id: row.get(0)?,
                title: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>>>()?;
    Ok(lessons)
}

/// Course collaborator over a locked connection.
pub struct SqliteCourse<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteCourse<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl LessonDirectory for SqliteCourse<'_> {
    fn lessons_for_unit(&self, unit_id: i64) -> Vec<LessonRef> {
        lessons_for_unit(self.conn, unit_id).log_warn_default("Failed to list unit lessons")
    }
}

impl EventLog for SqliteCourse<'_> {
    fn record_event(&self, kind: &str, learner: &Learner, payload: &str) -> std::result::Result<(), StoreError> {
        super::events::record_event(self.conn, kind, learner.user_id, payload)?;
        Ok(())
    }
}

impl ProgressTracker for SqliteCourse<'_> {
    fn mark_activity_accessed(
        &self,
        learner: &Learner,
        unit_id: i64,
        lesson_id: i64,
    ) -> std::result::Result<(), StoreError> {
        if unit_id == 0 {
            tracing::debug!(
                "Skipping progress for user {}: submission context unknown",
                learner.user_id
            );
            return Ok(());
        }
        super::progress::mark_activity_accessed(self.conn, learner.user_id, unit_id, lesson_id)?;
        Ok(())
    }
}
