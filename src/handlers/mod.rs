pub mod admin;
pub mod bundle;
pub mod picker;
pub mod render;
pub mod submit;

use askama::Template;
use axum::{extract::State, response::Html};

use crate::auth::db as auth_db;
use crate::auth::OptionalAuth;
use crate::db::{try_lock, LogOnError};
use crate::state::AppState;

#[derive(Template)]
#[template(
  ext = "html",
  source = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Exercises</title></head>
<body>
  {% if let Some(name) = username %}
  <p>Signed in as {{ name }}.</p>
  {% if enrolled %}
  <p>You are enrolled; exercise submissions are recorded.</p>
  <form method="post" action="/withdraw"><button>Withdraw</button></form>
  {% else %}
  <p>You are not enrolled; exercise submissions are ignored.</p>
  <form method="post" action="/enroll"><button>Enroll</button></form>
  {% endif %}
  {% if is_admin %}<p><a href="/admin/exercises">Manage exercises</a></p>{% endif %}
  <form method="post" action="/logout"><button>Log out</button></form>
  {% else %}
  <p><a href="/login">Sign in</a></p>
  {% endif %}
</body>
</html>"#
)]
pub struct IndexTemplate {
  pub username: Option<String>,
  pub enrolled: bool,
  pub is_admin: bool,
}

pub async fn index(State(state): State<AppState>, OptionalAuth(auth): OptionalAuth) -> Html<String> {
  let template = match auth {
    Some(auth) => {
      let enrolled = try_lock(&state.auth_db)
        .ok()
        .and_then(|conn| auth_db::is_enrolled(&conn, auth.user_id).log_warn("Failed to read enrollment"))
        .unwrap_or(false);
      IndexTemplate {
        username: Some(auth.username),
        enrolled,
        is_admin: auth.is_admin,
      }
    }
    None => IndexTemplate {
      username: None,
      enrolled: false,
      is_admin: false,
    },
  };

  Html(template.render().unwrap_or_default())
}

pub use admin::{exercises_page, update_whitelist};
pub use bundle::serve_bundle;
pub use picker::{catalog, embed_tag};
pub use render::render;
pub use submit::submit;
