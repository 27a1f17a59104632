//! Test utilities for database setup and archive fixtures.
//!
//! Provides helpers that reuse authoritative schema initialization,
//! eliminating schema duplication in test code.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use rusqlite::Connection;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::auth::Learner;
use crate::config::EXERCISE_BASE;
use crate::content::ArchiveSource;

/// Test environment with app.db initialized through `db::init_schema`.
pub struct TestEnv {
    /// Temporary directory (kept alive for database file persistence)
    pub temp: TempDir,
    pub conn: Connection,
}

impl TestEnv {
    pub fn new() -> rusqlite::Result<Self> {
        let temp =
            TempDir::new().map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        let conn = Connection::open(temp.path().join("app.db"))?;
        crate::db::init_schema(&conn)?;

        Ok(Self { temp, conn })
    }

    /// Get the temporary directory path for creating test files.
    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Create a user and enroll them.
    pub fn learner(&self, username: &str) -> Learner {
        let user_id = crate::auth::db::create_user(&self.conn, username, "test-hash").unwrap();
        crate::auth::db::enroll_student(&self.conn, user_id).unwrap();
        Learner {
            user_id,
            username: username.to_string(),
        }
    }
}

/// Archive path of an exercise page.
pub fn exercise_path(name: &str) -> String {
    format!("{}{}.html", EXERCISE_BASE, name)
}

/// Write `exercises.zip` into `dir`, replacing any previous one.
///
/// Names ending in `/` become directory entries.
pub fn write_archive(dir: &Path, entries: &[(&str, &str)]) -> ArchiveSource {
    let path = dir.join("exercises.zip");
    let mut zip = ZipWriter::new(File::create(&path).unwrap());
    let options = SimpleFileOptions::default();

    for (name, contents) in entries {
        if name.ends_with('/') {
            zip.add_directory(*name, options).unwrap();
        } else {
            zip.start_file(*name, options).unwrap();
            zip.write_all(contents.as_bytes()).unwrap();
        }
    }
    zip.finish().unwrap();

    ArchiveSource::new(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_learner_is_enrolled() {
        let env = TestEnv::new().unwrap();
        let learner = env.learner("ana");
        assert!(crate::auth::db::is_enrolled(&env.conn, learner.user_id).unwrap());
    }
}
