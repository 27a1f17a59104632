//! Author-facing exercise picker.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;

use crate::auth::AdminContext;
use crate::content::{render_embed_tag, SelectionItem, SettingsWhitelist, WhitelistSource};
use crate::db::try_lock;
use crate::state::AppState;

/// GET /exercises/catalog - numbered, whitelist-filtered selection list
pub async fn catalog(State(state): State<AppState>, _admin: AdminContext) -> Response {
  let catalog = match state.catalog.get(&state.archive) {
    Ok(catalog) => catalog,
    Err(e) => {
      tracing::error!("{}", e);
      return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
  };

  let Ok(conn) = try_lock(&state.auth_db) else {
    return StatusCode::INTERNAL_SERVER_ERROR.into_response();
  };
  match catalog.selection_items(&SettingsWhitelist::new(&conn)) {
    Ok(items) => Json::<Vec<SelectionItem>>(items).into_response(),
    Err(e) => {
      tracing::error!("Failed to read exercise whitelist: {}", e);
      StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
  }
}

/// GET /exercises/embed/{name} - embed snippet for one exercise
pub async fn embed_tag(
  State(state): State<AppState>,
  _admin: AdminContext,
  Path(name): Path<String>,
) -> Response {
  let catalog = match state.catalog.get(&state.archive) {
    Ok(catalog) => catalog,
    Err(e) => {
      tracing::error!("{}", e);
      return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
  };

  let Ok(conn) = try_lock(&state.auth_db) else {
    return StatusCode::INTERNAL_SERVER_ERROR.into_response();
  };
  let allowed = match SettingsWhitelist::new(&conn).allows(&name) {
    Ok(allowed) => allowed,
    Err(e) => {
      tracing::error!("Failed to read exercise whitelist: {}", e);
      return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
  };
  drop(conn);

  if !catalog.contains(&name) || !allowed {
    return StatusCode::NOT_FOUND.into_response();
  }
  Html(render_embed_tag(&name)).into_response()
}
