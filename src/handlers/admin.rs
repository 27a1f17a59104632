//! Admin-only exercise management: whitelist editing and submission overview.

use askama::Template;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;

use crate::auth::AdminContext;
use crate::config::SUBMIT_EVENT_KIND;
use crate::content::catalog::caption;
use crate::content::whitelist::save_whitelist;
use crate::content::{SettingsWhitelist, Whitelist, WhitelistSource};
use crate::db::{self, try_lock, EventRecord, LogOnError};
use crate::state::AppState;
#[cfg(feature = "profiling")]
use crate::profiling::EventType;

const RECENT_SUBMISSIONS: i64 = 20;

pub struct ExerciseRow {
  pub name: String,
  pub caption: String,
  pub allowed: bool,
}

#[derive(Template)]
#[template(
  ext = "html",
  source = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Exercises</title></head>
<body>
  <p>Signed in as {{ username }}</p>
  <h1>Exercises</h1>
  <p>{{ attempts }} submissions since start, {{ recorded }} recorded in total.</p>

  <h2>Whitelist</h2>
  <form method="post" action="/admin/exercises/whitelist">
    <textarea name="whitelist" rows="10" cols="60">{{ whitelist }}</textarea>
    <p><small>One name per line or comma separated. Leave empty to allow every exercise.</small></p>
    <button>Save</button>
  </form>

  <h2>Catalog</h2>
  {% if let Some(error) = archive_error %}
  <p class="error">Archive unavailable: {{ error }}</p>
  {% else %}
  <table>
    <tr><th>Name</th><th>Caption</th><th>Allowed</th></tr>
    {% for row in rows %}
    <tr><td>{{ row.name }}</td><td>{{ row.caption }}</td><td>{% if row.allowed %}yes{% else %}no{% endif %}</td></tr>
    {% endfor %}
  </table>
  {% endif %}

  <h2>Recent submissions</h2>
  <ul>
    {% for event in recent %}
    <li>{{ event.recorded_on }}: user {{ event.user_id }}</li>
    {% endfor %}
  </ul>
</body>
</html>"#
)]
pub struct AdminExercisesTemplate {
  pub username: String,
  pub whitelist: String,
  pub rows: Vec<ExerciseRow>,
  pub archive_error: Option<String>,
  pub attempts: u64,
  pub recorded: i64,
  pub recent: Vec<EventRecord>,
}

#[derive(Deserialize)]
pub struct WhitelistForm {
  #[serde(default)]
  pub whitelist: String,
}

/// GET /admin/exercises
pub async fn exercises_page(State(state): State<AppState>, AdminContext(auth): AdminContext) -> Response {
  let (rows, archive_error) = match state.catalog.get(&state.archive) {
    Ok(catalog) => (catalog.names().map(|name| name.to_string()).collect::<Vec<_>>(), None),
    Err(e) => {
      tracing::warn!("Catalog unavailable for admin page: {}", e);
      (Vec::new(), Some(e.to_string()))
    }
  };

  let Ok(conn) = try_lock(&state.auth_db) else {
    return StatusCode::INTERNAL_SERVER_ERROR.into_response();
  };

  let whitelist = match SettingsWhitelist::new(&conn).whitelist_raw() {
    Ok(raw) => raw,
    Err(e) => {
      tracing::error!("Failed to read exercise whitelist: {}", e);
      return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
  };
  let parsed = Whitelist::parse(&whitelist);
  let rows = rows
    .into_iter()
    .map(|name| ExerciseRow {
      caption: caption(&name),
      allowed: parsed.allows(&name),
      name,
    })
    .collect();

  let template = AdminExercisesTemplate {
    username: auth.username,
    whitelist,
    rows,
    archive_error,
    attempts: state.attempts.get(),
    recorded: db::count_events(&conn, SUBMIT_EVENT_KIND).log_warn_default("Failed to count submissions"),
    recent: db::list_events(&conn, SUBMIT_EVENT_KIND, RECENT_SUBMISSIONS)
      .log_warn_default("Failed to list submissions"),
  };

  Html(template.render().unwrap_or_default()).into_response()
}

/// POST /admin/exercises/whitelist
pub async fn update_whitelist(
  State(state): State<AppState>,
  AdminContext(auth): AdminContext,
  Form(form): Form<WhitelistForm>,
) -> Response {
  let Ok(conn) = try_lock(&state.auth_db) else {
    return StatusCode::INTERNAL_SERVER_ERROR.into_response();
  };

  if let Err(e) = save_whitelist(&conn, &form.whitelist) {
    tracing::error!("Failed to save exercise whitelist: {}", e);
    return StatusCode::INTERNAL_SERVER_ERROR.into_response();
  }

  let entries = Whitelist::parse(&form.whitelist).names().len();
  tracing::info!("{} set the exercise whitelist ({} entries)", auth.username, entries);

  #[cfg(feature = "profiling")]
  crate::profile_log!(
    EventType::WhitelistUpdate { entries },
    serde_json::json!({ "admin": auth.username })
  );

  Redirect::to("/admin/exercises").into_response()
}
