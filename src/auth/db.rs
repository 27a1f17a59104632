//! Auth database operations (users, sessions, app_settings, students tables).
//!
//! ## Migration System
//!
//! This module uses a version-gated migration system. Each migration:
//! 1. Checks if the current schema version is less than the target version
//! 2. Runs the migration SQL
//! 3. Records the new version in `db_version` table
//!
//! Migrations only run once - the version check ensures idempotency.

use chrono::{Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result};

use crate::db::LogOnError;

/// Current schema version for the auth tables
/// Increment this when adding a new migration
pub const AUTH_DB_VERSION: i32 = 2;

/// Initialize the auth schema with version-gated migrations
pub fn init_auth_schema(conn: &Connection) -> Result<()> {
    // Bootstrap: ensure db_version table exists (needed to check version)
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS db_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL,
            description TEXT
        );
        "#,
    )?;

    let current_version = get_schema_version(conn)?;
    tracing::debug!("auth schema version: {}", current_version);

    if current_version < 1 {
        migrate_v0_to_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v1_to_v2(conn)?;
    }

    Ok(())
}

// ============================================================
// VERSION-GATED MIGRATIONS
// ============================================================

/// v0→v1: Create base tables (users, sessions, app_settings)
fn migrate_v0_to_v1(conn: &Connection) -> Result<()> {
    tracing::info!("Running migration v0→v1: Create base tables");

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE COLLATE NOCASE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'user',
            created_at TEXT NOT NULL,
            last_login_at TEXT
        );

        CREATE TABLE IF NOT EXISTS sessions (
            id TEXT PRIMARY KEY,
            user_id INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            expires_at TEXT NOT NULL,
            last_access_at TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS app_settings (
            key TEXT PRIMARY KEY,
            value TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON sessions(user_id);
        CREATE INDEX IF NOT EXISTS idx_sessions_expires_at ON sessions(expires_at);
        "#,
    )?;

    record_version(conn, 1, "Create base tables (users, sessions, app_settings)")?;
    Ok(())
}

/// v1→v2: Course enrollment
fn migrate_v1_to_v2(conn: &Connection) -> Result<()> {
    tracing::info!("Running migration v1→v2: Add course enrollment");

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS students (
            user_id INTEGER PRIMARY KEY,
            enrolled_on TEXT NOT NULL,
            is_enrolled INTEGER NOT NULL DEFAULT 1,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        );
        "#,
    )?;

    record_version(conn, 2, "Add course enrollment (students)")?;
    Ok(())
}

// ============================================================
// MIGRATION HELPERS
// ============================================================

/// Record a schema version after successful migration
fn record_version(conn: &Connection, version: i32, description: &str) -> Result<()> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO db_version (version, applied_at, description) VALUES (?1, ?2, ?3)",
        params![version, now, description],
    )?;
    tracing::info!("Recorded schema version {} - {}", version, description);
    Ok(())
}

/// Get current schema version (0 if no versions recorded)
pub fn get_schema_version(conn: &Connection) -> Result<i32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM db_version",
        [],
        |row| row.get(0),
    )
}

// ==================== Users ====================

/// Create a new user, returns the user ID
pub fn create_user(conn: &Connection, username: &str, password_hash: &str) -> Result<i64> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO users (username, password_hash, created_at) VALUES (?1, ?2, ?3)",
        params![username, password_hash, now],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Get user by username, returns (user_id, password_hash)
pub fn get_user_by_username(conn: &Connection, username: &str) -> Result<Option<(i64, String)>> {
    conn.query_row(
        "SELECT id, password_hash FROM users WHERE username = ?1",
        params![username],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .optional()
}

/// Check if a username already exists
pub fn username_exists(conn: &Connection, username: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE username = ?1",
        params![username],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Check if a user is an admin (by role or legacy username='admin')
pub fn is_user_admin(conn: &Connection, user_id: i64) -> Result<bool> {
    let is_admin: Option<i64> = conn
        .query_row(
            r#"SELECT CASE
                WHEN role = 'admin' THEN 1
                WHEN LOWER(username) = 'admin' THEN 1
                ELSE 0
            END FROM users WHERE id = ?1"#,
            params![user_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(is_admin == Some(1))
}

/// Set user role ('user' or 'admin')
pub fn set_user_role(conn: &Connection, user_id: i64, role: &str) -> Result<()> {
    conn.execute(
        "UPDATE users SET role = ?1 WHERE id = ?2",
        params![role, user_id],
    )?;
    Ok(())
}

/// Update user's last login timestamp
pub fn update_last_login(conn: &Connection, user_id: i64) -> Result<()> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "UPDATE users SET last_login_at = ?1 WHERE id = ?2",
        params![now, user_id],
    )?;
    Ok(())
}

// ==================== Sessions ====================

/// Create a new session
pub fn create_session(
    conn: &Connection,
    user_id: i64,
    session_id: &str,
    duration_hours: i64,
) -> Result<()> {
    let now = Utc::now();
    let expires = now + Duration::hours(duration_hours);
    conn.execute(
        "INSERT INTO sessions (id, user_id, created_at, expires_at, last_access_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            session_id,
            user_id,
            now.to_rfc3339(),
            expires.to_rfc3339(),
            now.to_rfc3339()
        ],
    )?;
    Ok(())
}

/// Validate session and get user info, returns (user_id, username)
pub fn get_session_user(conn: &Connection, session_id: &str) -> Result<Option<(i64, String)>> {
    let now = Utc::now().to_rfc3339();
    let user: Option<(i64, String)> = conn
        .query_row(
            r#"
            SELECT u.id, u.username
            FROM sessions s
            JOIN users u ON s.user_id = u.id
            WHERE s.id = ?1 AND s.expires_at > ?2
            "#,
            params![session_id, now],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    if user.is_some() {
        // Update last access time
        conn.execute(
            "UPDATE sessions SET last_access_at = ?1 WHERE id = ?2",
            params![now, session_id],
        )
        .log_warn("Failed to update session last access");
    }
    Ok(user)
}

/// Delete a session (logout)
pub fn delete_session(conn: &Connection, session_id: &str) -> Result<()> {
    conn.execute("DELETE FROM sessions WHERE id = ?1", params![session_id])?;
    Ok(())
}

/// Cleanup expired sessions, returns count of deleted sessions
pub fn cleanup_expired_sessions(conn: &Connection) -> Result<usize> {
    let now = Utc::now().to_rfc3339();
    let count = conn.execute("DELETE FROM sessions WHERE expires_at < ?1", params![now])?;
    Ok(count)
}

// ==================== Enrollment ====================

/// Enroll a user in the course (re-enrolls a withdrawn student)
pub fn enroll_student(conn: &Connection, user_id: i64) -> Result<()> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        r#"
        INSERT INTO students (user_id, enrolled_on, is_enrolled) VALUES (?1, ?2, 1)
        ON CONFLICT(user_id) DO UPDATE SET is_enrolled = 1
        "#,
        params![user_id, now],
    )?;
    Ok(())
}

/// Withdraw a student; their history is kept
pub fn withdraw_student(conn: &Connection, user_id: i64) -> Result<()> {
    conn.execute(
        "UPDATE students SET is_enrolled = 0 WHERE user_id = ?1",
        params![user_id],
    )?;
    Ok(())
}

/// Whether the user currently has an active enrollment
pub fn is_enrolled(conn: &Connection, user_id: i64) -> Result<bool> {
    let enrolled: Option<i64> = conn
        .query_row(
            "SELECT is_enrolled FROM students WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(enrolled == Some(1))
}

// ==================== App Settings ====================

/// Get an app setting value
pub fn get_app_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let value: Option<Option<String>> = conn
        .query_row(
            "SELECT value FROM app_settings WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value.flatten())
}

/// Set an app setting value
pub fn set_app_setting(conn: &Connection, key: &str, value: Option<&str>) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO app_settings (key, value) VALUES (?1, ?2)",
        params![key, value],
    )?;
    Ok(())
}
