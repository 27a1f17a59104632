//! Per-learner activity progress.
//!
//! One row per (learner, unit, lesson). Lesson 0 stands for the unit itself.

use chrono::Utc;
use rusqlite::{params, Connection, Result};

#[derive(Debug, Clone)]
pub struct ActivityProgress {
    pub unit_id: i64,
    pub lesson_id: i64,
    pub first_accessed_at: String,
    pub last_accessed_at: String,
    pub access_count: i64,
}

/// Record that a learner reached an activity.
pub fn mark_activity_accessed(
    conn: &Connection,
    user_id: i64,
    unit_id: i64,
    lesson_id: i64,
) -> Result<()> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        r#"
        INSERT INTO activity_progress
            (user_id, unit_id, lesson_id, first_accessed_at, last_accessed_at, access_count)
        VALUES (?1, ?2, ?3, ?4, ?4, 1)
        ON CONFLICT(user_id, unit_id, lesson_id) DO UPDATE SET
            last_accessed_at = excluded.last_accessed_at,
            access_count = access_count + 1
        "#,
        params![user_id, unit_id, lesson_id, now],
    )?;
    Ok(())
}

/// All activities a learner reached, ordered by unit then lesson.
pub fn get_activity(conn: &Connection, user_id: i64) -> Result<Vec<ActivityProgress>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT unit_id, lesson_id, first_accessed_at, last_accessed_at, access_count
        FROM activity_progress
        WHERE user_id = ?1
        ORDER BY unit_id, lesson_id
        "#,
    )?;
    let rows = stmt
        .query_map(params![user_id], |row| {
            Ok(ActivityProgress {
                unit_id: row.get(0)?,
                lesson_id: row.get(1)?,
                first_accessed_at: row.get(2)?,
                last_accessed_at: row.get(3)?,
                access_count: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestEnv;

    #[test]
    fn test_repeat_access_increments_count() {
        let env = TestEnv::new().unwrap();

        mark_activity_accessed(&env.conn, 1, 5, 7).unwrap();
        mark_activity_accessed(&env.conn, 1, 5, 7).unwrap();
        mark_activity_accessed(&env.conn, 1, 5, 8).unwrap();

        let rows = get_activity(&env.conn, 1).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!((rows[0].lesson_id, rows[0].access_count), (7, 2));
        assert_eq!((rows[1].lesson_id, rows[1].access_count), (8, 1));
    }

    #[test]
    fn test_progress_is_per_user() {
        let env = TestEnv::new().unwrap();

        mark_activity_accessed(&env.conn, 1, 5, 7).unwrap();
        assert!(get_activity(&env.conn, 2).unwrap().is_empty());
    }
}
