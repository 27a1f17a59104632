//! Static bundle server: archive entries served verbatim.
//!
//! Exercise pages are whitelist-guarded here too, so the raw bundle URL is
//! not a way around the render endpoint's access check.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::config::EXERCISE_BASE;
use crate::content::catalog::exercise_name_from_path;
use crate::content::{SettingsWhitelist, WhitelistSource};
use crate::db::try_lock;
use crate::state::AppState;

/// GET {URL_BASE}/{*path} and GET /khan-exercises/{*path}
pub async fn serve_bundle(State(state): State<AppState>, Path(path): Path<String>) -> Response {
  if let Some(name) = guarded_exercise(&path) {
    let allowed = match try_lock(&state.auth_db) {
      Ok(conn) => SettingsWhitelist::new(&conn).allows(&name),
      Err(_) => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    };
    let allowed = match allowed {
      Ok(allowed) => allowed,
      Err(e) => {
        tracing::error!("Failed to read exercise whitelist: {}", e);
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
      }
    };
    if !allowed {
      tracing::info!("Bundle request for non-whitelisted exercise {}", name);
      return StatusCode::NOT_FOUND.into_response();
    }
  }

  match state.archive.read_entry(&path) {
    Ok(Some(bytes)) => ([(header::CONTENT_TYPE, guess_content_type(&path))], bytes).into_response(),
    Ok(None) => StatusCode::NOT_FOUND.into_response(),
    Err(e) => {
      tracing::error!("{}", e);
      StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
  }
}

/// Exercise name when `path` is an exercise page under the base prefix.
fn guarded_exercise(path: &str) -> Option<String> {
  if !path.ends_with(".html") || !path.starts_with(EXERCISE_BASE) {
    return None;
  }
  exercise_name_from_path(path)
}

/// Guess MIME type from file extension
fn guess_content_type(path: &str) -> &'static str {
  let file_name = path.rsplit('/').next().unwrap_or(path);
  let extension = file_name.rsplit_once('.').map(|(_, ext)| ext);
  match extension {
    Some("html") | Some("htm") => "text/html; charset=utf-8",
    Some("css") => "text/css; charset=utf-8",
    Some("js") => "application/javascript; charset=utf-8",
    Some("json") => "application/json",
    Some("png") => "image/png",
    Some("jpg") | Some("jpeg") => "image/jpeg",
    Some("gif") => "image/gif",
    Some("svg") => "image/svg+xml",
    Some("ico") => "image/x-icon",
    Some("woff") => "font/woff",
    Some("ttf") => "font/ttf",
    Some("txt") => "text/plain; charset=utf-8",
    _ => "application/octet-stream",
  }
}
