use rusqlite::{Connection, Result};

/// Course, event log, and progress tables.
///
/// Auth tables (users, sessions, app_settings, students) are created by
/// `auth::db::init_auth_schema`.
pub fn run_migrations(conn: &Connection) -> Result<()> {
  conn.execute_batch(
    r#"
    CREATE TABLE IF NOT EXISTS units (
      id INTEGER PRIMARY KEY,
      title TEXT NOT NULL,
      position INTEGER NOT NULL DEFAULT 0
    );

    CREATE TABLE IF NOT EXISTS lessons (
      id INTEGER PRIMARY KEY,
      unit_id INTEGER NOT NULL,
      title TEXT NOT NULL,
      position INTEGER NOT NULL DEFAULT 0,
      FOREIGN KEY (unit_id) REFERENCES units(id) ON DELETE CASCADE
    );

    -- Append-only; never updated or deduplicated
    CREATE TABLE IF NOT EXISTS events (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      source TEXT NOT NULL,
      user_id INTEGER NOT NULL,
      recorded_on TEXT NOT NULL,
      data TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS activity_progress (
      user_id INTEGER NOT NULL,
      unit_id INTEGER NOT NULL,
      lesson_id INTEGER NOT NULL,
      first_accessed_at TEXT NOT NULL,
      last_accessed_at TEXT NOT NULL,
      access_count INTEGER NOT NULL DEFAULT 1,
      PRIMARY KEY (user_id, unit_id, lesson_id)
    );

    CREATE INDEX IF NOT EXISTS idx_lessons_unit ON lessons(unit_id, position);
    CREATE INDEX IF NOT EXISTS idx_events_source ON events(source, recorded_on);
    CREATE INDEX IF NOT EXISTS idx_events_user ON events(user_id);
    "#,
  )?;

  Ok(())
}
