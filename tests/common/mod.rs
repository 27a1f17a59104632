//! Shared fixtures for HTTP tests.

#![allow(dead_code)]

use axum_extra::extract::cookie::Cookie;
use axum_test::TestServer;
use tempfile::TempDir;

use exercise_embed::auth::db as auth_db;
use exercise_embed::config::SESSION_DURATION_HOURS;
use exercise_embed::content::whitelist::save_whitelist;
use exercise_embed::content::CourseOutline;
use exercise_embed::db::{self, try_lock};
use exercise_embed::auth::SESSION_COOKIE_NAME;
use exercise_embed::testing::write_archive;
use exercise_embed::{build_app, AppState};

pub use exercise_embed::testing::exercise_path;

pub const OUTLINE: &str = r#"
[[units]]
id = 5
title = "Fractions"

[[units.lessons]]
id = 9
title = "Intro"

[[units.lessons]]
id = 7
title = "Adding"
"#;

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    _temp: TempDir,
}

impl TestApp {
    /// App over an archive with the given entries and the sample outline seeded.
    pub fn new(entries: &[(&str, &str)]) -> Self {
        let temp = TempDir::new().unwrap();

        let archive = write_archive(temp.path(), entries);

        let pool = db::init_db(&temp.path().join("app.db")).unwrap();
        {
            let conn = try_lock(&pool).unwrap();
            db::seed_outline(&conn, &CourseOutline::parse(OUTLINE).unwrap()).unwrap();
        }

        let state = AppState::new(pool, archive);
        let server = TestServer::new(build_app(state.clone())).unwrap();

        Self {
            server,
            state,
            _temp: temp,
        }
    }

    /// Create a user with a live session and return its cookie.
    pub fn session(&self, username: &str, enrolled: bool) -> Cookie<'static> {
        let conn = try_lock(&self.state.auth_db).unwrap();
        let user_id = auth_db::create_user(&conn, username, "unused").unwrap();
        if enrolled {
            auth_db::enroll_student(&conn, user_id).unwrap();
        }
        let session_id = format!("session-{}", username);
        auth_db::create_session(&conn, user_id, &session_id, SESSION_DURATION_HOURS).unwrap();
        Cookie::new(SESSION_COOKIE_NAME, session_id)
    }

    /// Make the settings table unreadable.
    pub fn break_settings(&self) {
        let conn = try_lock(&self.state.auth_db).unwrap();
        conn.execute("ALTER TABLE app_settings RENAME TO app_settings_moved", [])
            .unwrap();
    }

    pub fn set_whitelist(&self, raw: &str) {
        let conn = try_lock(&self.state.auth_db).unwrap();
        save_whitelist(&conn, raw).unwrap();
    }

    pub fn whitelist(&self) -> Option<String> {
        let conn = try_lock(&self.state.auth_db).unwrap();
        auth_db::get_app_setting(&conn, "exercise_whitelist").unwrap()
    }

    pub fn submission_count(&self) -> i64 {
        let conn = try_lock(&self.state.auth_db).unwrap();
        db::count_events(&conn, "module-khanex.exercise-submit").unwrap()
    }

    /// (unit, lesson) pairs reached by a user.
    pub fn activity(&self, username: &str) -> Vec<(i64, i64)> {
        let conn = try_lock(&self.state.auth_db).unwrap();
        let (user_id, _) = auth_db::get_user_by_username(&conn, username).unwrap().unwrap();
        db::get_activity(&conn, user_id)
            .unwrap()
            .into_iter()
            .map(|a| (a.unit_id, a.lesson_id))
            .collect()
    }
}

/// Audit payload as the widget sends it, embedded on a host page with `origin_query`.
pub fn audit_payload(origin_query: &str) -> String {
    let origin = format!("http://course.example/unit?{}", origin_query);
    let location = format!(
        "http://course.example/extensions/tags/khanex/resources/khan-exercises/khan-exercises/indirect/?ity_ef_slug=static:adding_fractions&ity_ef_origin={}",
        urlencoding::encode(&origin)
    );
    serde_json::json!({
        "location": urlencoding::encode(&location),
        "correct": true,
    })
    .to_string()
}
