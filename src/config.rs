//! Application configuration constants.
//!
//! Paths come from `config.toml` first, then the environment (a `.env` file
//! is loaded if present), then built-in defaults under the data directory.

use serde::Deserialize;
use std::path::PathBuf;

use crate::paths;

// ==================== File Configuration ====================

/// Configuration file structure for config.toml
#[derive(Debug, Default, Deserialize)]
struct AppConfig {
    database: Option<DatabaseConfig>,
    exercises: Option<ExercisesConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabaseConfig {
    path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ExercisesConfig {
    /// Zip file holding the bundled widget and its exercise pages
    archive: Option<String>,
    /// TOML course outline seeded into the units/lessons tables
    outline: Option<String>,
}

fn read_config_file() -> AppConfig {
    let _ = dotenvy::dotenv();

    match std::fs::read_to_string("config.toml") {
        Ok(contents) => match toml::from_str::<AppConfig>(&contents) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring malformed config.toml: {}", e);
                AppConfig::default()
            }
        },
        Err(_) => AppConfig::default(),
    }
}

/// Resolve a path setting with priority: config.toml > env var > default
fn resolve_path(
    label: &str,
    from_file: Option<String>,
    env_var: &str,
    default: String,
) -> PathBuf {
    if let Some(path) = from_file {
        tracing::info!("Using {} from config.toml: {}", label, path);
        return PathBuf::from(path);
    }

    if let Ok(path) = std::env::var(env_var) {
        tracing::info!("Using {} from {} env: {}", label, env_var, path);
        return PathBuf::from(path);
    }

    tracing::info!("Using default {} path: {}", label, default);
    PathBuf::from(default)
}

/// Load database path with priority: config.toml > .env > default
pub fn load_database_path() -> PathBuf {
    let config = read_config_file();
    resolve_path(
        "database",
        config.database.and_then(|d| d.path),
        "DATABASE_PATH",
        paths::app_db_path(),
    )
}

/// Load the exercise archive path with priority: config.toml > .env > default
pub fn load_archive_path() -> PathBuf {
    let config = read_config_file();
    resolve_path(
        "exercise archive",
        config.exercises.and_then(|e| e.archive),
        "EXERCISE_ARCHIVE",
        paths::archive_path(),
    )
}

/// Load the course outline path with priority: config.toml > .env > default
pub fn load_outline_path() -> PathBuf {
    let config = read_config_file();
    resolve_path(
        "course outline",
        config.exercises.and_then(|e| e.outline),
        "COURSE_OUTLINE",
        paths::outline_path(),
    )
}

// ==================== Server Configuration ====================

/// Server address to bind to
pub const SERVER_ADDR: &str = "0.0.0.0";

/// Default server port
pub const SERVER_PORT: u16 = 3000;

/// Port from the PORT env var, falling back to [`SERVER_PORT`]
pub fn server_port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(SERVER_PORT)
}

/// Get the full server bind address
pub fn server_bind_addr() -> String {
    format!("{}:{}", SERVER_ADDR, server_port())
}

// ==================== Session Configuration ====================

/// Session duration in hours (1 week)
pub const SESSION_DURATION_HOURS: i64 = 24 * 7;

// ==================== Exercise Configuration ====================

/// URL prefix the archive is served under
pub const URL_BASE: &str = "/extensions/tags/khanex/resources";

/// Alias prefix used by the widget runtime when it resolves its own assets
pub const NAMESPACED_URL_BASE: &str = "/khan-exercises";

/// Path of the render/submit endpoint (trailing slash is part of the contract)
pub const INDIRECT_PATH: &str =
    "/extensions/tags/khanex/resources/khan-exercises/khan-exercises/indirect/";

/// Archive directory holding one `<name>.html` page per exercise
pub const EXERCISE_BASE: &str = "khan-exercises/khan-exercises/exercises/";

/// Event kind recorded for every "Check Answer" submission
pub const SUBMIT_EVENT_KIND: &str = "module-khanex.exercise-submit";

/// app_settings key holding the raw whitelist text
pub const WHITELIST_SETTING_KEY: &str = "exercise_whitelist";
