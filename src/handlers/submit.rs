//! Submission side of the indirect endpoint.

use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Form;
use serde::Deserialize;

use crate::auth::OptionalLearner;
use crate::db::{try_lock, SqliteCourse};
use crate::services::{record_submission, SubmissionError};
use crate::state::AppState;
#[cfg(feature = "profiling")]
use crate::profiling::EventType;

#[derive(Deserialize)]
pub struct AuditForm {
  /// Serialized widget state, including the frame `location`
  #[serde(default)]
  pub ity_ef_audit: String,
}

/// POST on the indirect path ("Check Answer")
///
/// The caller is checked before the body is looked at, so an anonymous
/// request gets the same 404 whatever it sends.
pub async fn submit(
  State(state): State<AppState>,
  OptionalLearner(learner): OptionalLearner,
  form: Result<Form<AuditForm>, FormRejection>,
) -> Response {
  let Some(learner) = learner else {
    return SubmissionError::Rejected.into_response();
  };
  let form = match form {
    Ok(Form(form)) => form,
    Err(rejection) => return rejection.into_response(),
  };

  let Ok(conn) = try_lock(&state.auth_db) else {
    return StatusCode::INTERNAL_SERVER_ERROR.into_response();
  };
  let course = SqliteCourse::new(&conn);

  match record_submission(&course, &state.attempts, Some(&learner), &form.ity_ef_audit) {
    Ok(ack) => {
      #[cfg(feature = "profiling")]
      crate::profile_log!(EventType::SubmissionRecorded {
        user_id: learner.user_id,
        unit_id: ack.context.unit_id,
        lesson_id: ack.context.lesson_id,
      });
      ack.into_response()
    }
    Err(e) => e.into_response(),
  }
}
