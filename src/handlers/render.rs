//! Render side of the indirect endpoint.
//!
//! `GET <indirect>?ity_ef_rule=raw` returns the fixed host document.
//! `GET <indirect>?ity_ef_slug=static:<name>` returns the exercise page.
//! Anything else is a 404.

use axum::extract::{RawQuery, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::content::{resolve, QueryParams, ResolveError, SettingsWhitelist, WhitelistSource, RAW_HOST_PAGE};
use crate::db::try_lock;
use crate::state::AppState;
#[cfg(feature = "profiling")]
use crate::profiling::EventType;

pub const RULE_PARAM: &str = "ity_ef_rule";
pub const SLUG_PARAM: &str = "ity_ef_slug";

const HTML: &str = "text/html; charset=utf-8";

/// GET on the indirect path
pub async fn render(State(state): State<AppState>, RawQuery(query): RawQuery) -> Response {
  let params = QueryParams::parse(query.as_deref().unwrap_or_default());

  if params.first(RULE_PARAM) == Some("raw") {
    return ([(header::CONTENT_TYPE, HTML)], RAW_HOST_PAGE).into_response();
  }

  match params.first(SLUG_PARAM) {
    Some(slug) => match serve_slug(&state, slug) {
      Ok(page) => page,
      Err(e) => e.into_response(),
    },
    None => StatusCode::NOT_FOUND.into_response(),
  }
}

fn serve_slug(state: &AppState, slug: &str) -> Result<Response, ResolveError> {
  // Read the setting, then release the lock before touching the archive.
  let whitelist = match try_lock(&state.auth_db) {
    Ok(conn) => SettingsWhitelist::new(&conn)
      .whitelist_raw()
      .map_err(ResolveError::Whitelist)?,
    Err(_) => return Ok(StatusCode::INTERNAL_SERVER_ERROR.into_response()),
  };

  let page = resolve(slug, &state.archive, &whitelist)?;
  tracing::debug!("Serving exercise for slug {} ({} bytes)", slug, page.len());

  #[cfg(feature = "profiling")]
  crate::profile_log!(EventType::ExerciseResolved {
    name: slug.to_string(),
    bytes: page.len(),
  });

  Ok(([(header::CONTENT_TYPE, HTML)], page).into_response())
}
