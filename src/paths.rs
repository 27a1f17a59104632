//! Project path functions - single source of truth for default file paths.
//!
//! ## Environment Variables
//!
//! - `DATA_DIR`: Override the base data directory (default: "data")
//! - `PORT`: Override the server port (see config.rs)
//!
//! This allows running multiple isolated server instances side by side:
//! ```bash
//! DATA_DIR=data/test/a PORT=3001 cargo run
//! DATA_DIR=data/test/b PORT=3002 cargo run
//! ```

use std::env;
use std::sync::OnceLock;

/// Lazily initialized data directory from DATA_DIR env var
static DATA_DIR_VALUE: OnceLock<String> = OnceLock::new();

/// Get the base data directory (from DATA_DIR env var or default "data")
pub fn data_dir() -> &'static str {
    DATA_DIR_VALUE.get_or_init(|| env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()))
}

/// Application database (users, sessions, settings, course, events, progress)
pub fn app_db_path() -> String {
    format!("{}/app.db", data_dir())
}

/// Bundled exercise archive
pub fn archive_path() -> String {
    format!("{}/khan-exercises.zip", data_dir())
}

/// Course outline seeded at startup
pub fn outline_path() -> String {
    format!("{}/course.toml", data_dir())
}

/// Directory for profiling output (only written with the `profiling` feature)
pub fn profile_dir() -> String {
    data_dir().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    // DATA_DIR is read once through OnceLock, so only the default layout is tested.

    #[test]
    fn test_data_dir_default() {
        let dir = data_dir();
        assert!(!dir.is_empty());
    }

    #[test]
    fn test_app_db_path_format() {
        assert!(app_db_path().ends_with("/app.db"));
    }

    #[test]
    fn test_archive_and_outline_paths() {
        assert!(archive_path().ends_with("/khan-exercises.zip"));
        assert!(outline_path().ends_with("/course.toml"));
    }
}
