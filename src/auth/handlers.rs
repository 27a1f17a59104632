//! Authentication handlers for login, register, logout and enrollment.
//!
//! Failures redirect back to `/login?error=1` without saying which check
//! failed.

use askama::Template;
use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;

use super::db as auth_db;
use super::middleware::{AuthContext, SESSION_COOKIE_NAME};
use super::password;
use crate::config::SESSION_DURATION_HOURS;
use crate::db::try_lock;
use crate::session::generate_session_id;
use crate::state::AppState;
#[cfg(feature = "profiling")]
use crate::profiling::EventType;

/// Length of the client-side SHA-256 hex digest.
const CLIENT_HASH_LEN: usize = 64;

#[derive(Template)]
#[template(
    ext = "html",
    source = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Sign in</title></head>
<body>
  <h1>Sign in</h1>
  {% if failed %}<p class="error">Sign-in failed. Check your username and password.</p>{% endif %}
  <form method="post" action="/login" data-hash-password>
    <input name="username" placeholder="Username" required>
    <input type="password" data-password placeholder="Password" required>
    <input type="hidden" name="password_hash">
    <button>Log in</button>
    <button formaction="/register">Register</button>
  </form>
  <script>
    document.querySelector("[data-hash-password]").addEventListener("submit", async (e) => {
      e.preventDefault();
      const form = e.target;
      const data = new TextEncoder().encode(form.querySelector("[data-password]").value + form.username.value);
      const digest = await crypto.subtle.digest("SHA-256", data);
      form.password_hash.value = [...new Uint8Array(digest)].map(b => b.toString(16).padStart(2, "0")).join("");
      form.action = e.submitter && e.submitter.formAction ? e.submitter.formAction : form.action;
      form.submit();
    });
  </script>
  <p><small>v{{ version }}</small></p>
</body>
</html>"#
)]
pub struct LoginTemplate {
    pub failed: bool,
    pub version: &'static str,
}

#[derive(Deserialize, Default)]
pub struct LoginPageQuery {
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Deserialize)]
pub struct CredentialsForm {
    pub username: String,
    /// Client-side SHA-256 hash of password+username (server never sees plaintext)
    pub password_hash: String,
}

fn failed() -> Response {
    Redirect::to("/login?error=1").into_response()
}

fn session_cookie(session_id: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, session_id))
        .path("/")
        .http_only(true)
        .secure(false) // Set to true in production with HTTPS
        .max_age(time::Duration::hours(SESSION_DURATION_HOURS))
        .build()
}

/// Validate username format (3-32 alphanumeric characters or underscores)
pub fn is_valid_username(username: &str) -> bool {
    (3..=32).contains(&username.len())
        && username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// GET /login - Show login page
pub async fn login_page(Query(query): Query<LoginPageQuery>) -> Html<String> {
    let template = LoginTemplate {
        failed: query.error.is_some(),
        version: env!("CARGO_PKG_VERSION"),
    };
    Html(template.render().unwrap_or_default())
}

/// POST /login - Process login
pub async fn login_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<CredentialsForm>,
) -> Response {
    if form.username.is_empty() || form.password_hash.is_empty() {
        return failed();
    }

    let Ok(conn) = try_lock(&state.auth_db) else {
        return failed();
    };

    let (user_id, stored_hash) = match auth_db::get_user_by_username(&conn, &form.username) {
        Ok(Some(user)) => user,
        Ok(None) => return failed(),
        Err(e) => {
            tracing::error!("User lookup failed: {}", e);
            return failed();
        }
    };

    // Client sent SHA-256 hash, stored is Argon2 of that hash
    if !password::verify_password(&form.password_hash, &stored_hash) {
        #[cfg(feature = "profiling")]
        crate::profile_log!(EventType::AuthLogin {
            username: form.username.clone(),
            success: false,
        });
        tracing::info!("Failed login for {}", form.username);
        return failed();
    }

    if let Err(e) = auth_db::update_last_login(&conn, user_id) {
        tracing::warn!("Failed to update last login for user {}: {}", user_id, e);
    }

    let session_id = generate_session_id();
    if let Err(e) = auth_db::create_session(&conn, user_id, &session_id, SESSION_DURATION_HOURS) {
        tracing::error!("Failed to create session: {}", e);
        return failed();
    }
    drop(conn);

    #[cfg(feature = "profiling")]
    crate::profile_log!(EventType::AuthLogin {
        username: form.username.clone(),
        success: true,
    });

    (jar.add(session_cookie(session_id)), Redirect::to("/")).into_response()
}

/// POST /register - Create the account and log in
pub async fn register_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<CredentialsForm>,
) -> Response {
    if !is_valid_username(&form.username) || form.password_hash.len() != CLIENT_HASH_LEN {
        return failed();
    }

    // Hash the client's hash with Argon2 for storage
    let stored_hash = match password::hash_password(&form.password_hash) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!("Failed to hash password: {}", e);
            return failed();
        }
    };

    let Ok(conn) = try_lock(&state.auth_db) else {
        return failed();
    };

    match auth_db::username_exists(&conn, &form.username) {
        Ok(false) => {}
        Ok(true) => return failed(),
        Err(e) => {
            tracing::error!("Username lookup failed: {}", e);
            return failed();
        }
    }

    let user_id = match auth_db::create_user(&conn, &form.username, &stored_hash) {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("Failed to create user: {}", e);
            return failed();
        }
    };

    if form.username.eq_ignore_ascii_case("admin") {
        if let Err(e) = auth_db::set_user_role(&conn, user_id, "admin") {
            tracing::warn!("Failed to grant admin role: {}", e);
        }
    }

    let session_id = generate_session_id();
    if let Err(e) = auth_db::create_session(&conn, user_id, &session_id, SESSION_DURATION_HOURS) {
        // Account exists; the user can still log in manually
        tracing::error!("Failed to create session after registration: {}", e);
        return Redirect::to("/login").into_response();
    }

    tracing::info!("Registered user {}", form.username);
    (jar.add(session_cookie(session_id)), Redirect::to("/")).into_response()
}

/// POST /logout - Log out and clear session
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    if let Some(session_cookie) = jar.get(SESSION_COOKIE_NAME) {
        if let Ok(conn) = try_lock(&state.auth_db) {
            if let Err(e) = auth_db::delete_session(&conn, session_cookie.value()) {
                tracing::warn!("Failed to delete session during logout: {}", e);
            }
        }
    }

    let cleared = Cookie::build((SESSION_COOKIE_NAME, ""))
        .path("/")
        .max_age(time::Duration::seconds(0))
        .build();

    (jar.remove(cleared), Redirect::to("/login"))
}

/// POST /enroll - Enroll the caller in the course
pub async fn enroll(State(state): State<AppState>, auth: AuthContext) -> Response {
    set_enrollment(&state, &auth, true)
}

/// POST /withdraw - Withdraw the caller from the course
pub async fn withdraw(State(state): State<AppState>, auth: AuthContext) -> Response {
    set_enrollment(&state, &auth, false)
}

fn set_enrollment(state: &AppState, auth: &AuthContext, enrolled: bool) -> Response {
    let Ok(conn) = try_lock(&state.auth_db) else {
        return Redirect::to("/").into_response();
    };
    let result = if enrolled {
        auth_db::enroll_student(&conn, auth.user_id)
    } else {
        auth_db::withdraw_student(&conn, auth.user_id)
    };
    match result {
        Ok(()) => tracing::info!("User {} enrolled={}", auth.username, enrolled),
        Err(e) => tracing::error!("Failed to update enrollment for {}: {}", auth.username, e),
    }
    Redirect::to("/").into_response()
}
