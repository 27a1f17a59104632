//! Authentication extractors.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;

use super::db as auth_db;
use crate::db::{try_lock, LogOnError};
use crate::state::AppState;

pub const SESSION_COOKIE_NAME: &str = "ex_session";

/// Authenticated request context.
/// Add this as a handler parameter to require authentication.
/// Redirects to /login if not authenticated.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: i64,
    pub username: String,
    pub is_admin: bool,
}

impl AuthContext {
    pub fn learner(&self) -> Learner {
        Learner {
            user_id: self.user_id,
            username: self.username.clone(),
        }
    }
}

fn session_id(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE_NAME).map(|c| c.value().to_string())
}

impl FromRequestParts<AppState> for AuthContext {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_request_parts(parts, state)
            .await
            .map_err(|_| Redirect::to("/login").into_response())?;

        let session_id = session_id(&jar).ok_or_else(|| Redirect::to("/login").into_response())?;

        let conn = try_lock(&state.auth_db)
            .map_err(|_| (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response())?;

        let (user_id, username) = auth_db::get_session_user(&conn, &session_id)
            .map_err(|e| {
                tracing::error!("Session lookup failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response()
            })?
            .ok_or_else(|| Redirect::to("/login").into_response())?;

        let is_admin = auth_db::is_user_admin(&conn, user_id)
            .unwrap_or_else(|_| username.eq_ignore_ascii_case("admin"));

        Ok(AuthContext {
            user_id,
            username,
            is_admin,
        })
    }
}

/// Requires an admin session. Other authenticated users go back to `/`.
#[derive(Debug, Clone)]
pub struct AdminContext(pub AuthContext);

impl FromRequestParts<AppState> for AdminContext {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = AuthContext::from_request_parts(parts, state).await?;
        if !auth.is_admin {
            tracing::debug!("Non-admin {} denied admin route", auth.username);
            return Err(Redirect::to("/").into_response());
        }
        Ok(AdminContext(auth))
    }
}

/// An authenticated user with an active enrollment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Learner {
    pub user_id: i64,
    pub username: String,
}

/// The current enrolled learner, if any.
///
/// Never rejects: missing cookies, expired sessions, withdrawn students and
/// database failures all resolve to `None`.
pub struct OptionalLearner(pub Option<Learner>);

impl FromRequestParts<AppState> for OptionalLearner {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(session_id) = session_id(&jar) else {
            return Ok(OptionalLearner(None));
        };

        let Ok(conn) = try_lock(&state.auth_db) else {
            return Ok(OptionalLearner(None));
        };

        let learner = auth_db::get_session_user(&conn, &session_id)
            .log_warn("Session lookup failed")
            .flatten()
            .filter(|(user_id, _)| {
                auth_db::is_enrolled(&conn, *user_id)
                    .log_warn("Enrollment lookup failed")
                    .unwrap_or(false)
            })
            .map(|(user_id, username)| Learner { user_id, username });

        Ok(OptionalLearner(learner))
    }
}

/// Optional authentication extractor.
/// Returns Some(AuthContext) if authenticated, None otherwise.
/// Use for pages that work both with and without authentication.
pub struct OptionalAuth(pub Option<AuthContext>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match AuthContext::from_request_parts(parts, state).await {
            Ok(auth) => Ok(OptionalAuth(Some(auth))),
            Err(_) => Ok(OptionalAuth(None)),
        }
    }
}
