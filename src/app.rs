//! Router assembly.

use axum::{routing::get, routing::post, Router};
use tower_http::trace::TraceLayer;

use crate::config::{INDIRECT_PATH, NAMESPACED_URL_BASE, URL_BASE};
use crate::state::AppState;
use crate::{auth, handlers};

pub fn build_app(state: AppState) -> Router {
  Router::new()
    .route("/", get(handlers::index))
    // Auth and enrollment
    .route("/login", get(auth::login_page).post(auth::login_submit))
    .route("/register", post(auth::register_submit))
    .route("/logout", post(auth::logout))
    .route("/enroll", post(auth::enroll))
    .route("/withdraw", post(auth::withdraw))
    // Widget endpoints
    .route(INDIRECT_PATH, get(handlers::render).post(handlers::submit))
    .route(&format!("{}/{{*path}}", URL_BASE), get(handlers::serve_bundle))
    .route(&format!("{}/{{*path}}", NAMESPACED_URL_BASE), get(handlers::serve_bundle))
    // Authoring and admin
    .route("/exercises/catalog", get(handlers::catalog))
    .route("/exercises/embed/{name}", get(handlers::embed_tag))
    .route("/admin/exercises", get(handlers::exercises_page))
    .route("/admin/exercises/whitelist", post(handlers::update_whitelist))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
