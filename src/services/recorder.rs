//! Submission recording.
//!
//! One "check answer" action from the widget arrives as an audit payload and
//! walks a fixed sequence of stages:
//!
//! ```text
//! Received -> Authorizing -> Recording -> ContextRecovery -> ProgressUpdate -> Acknowledged
//!                  |
//!                  +-> Rejected (no enrolled learner)
//! ```
//!
//! Exactly one event is appended per accepted submission. The attempt counter
//! only moves once every stage has succeeded.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::auth::Learner;
use crate::config::SUBMIT_EVENT_KIND;
use crate::content::{recover_context, LessonDirectory, RecoveredContext};

/// Failure reported by a storage collaborator.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Append-only event sink.
pub trait EventLog {
    fn record_event(&self, kind: &str, learner: &Learner, payload: &str) -> Result<(), StoreError>;
}

/// Records that a learner reached an activity. Lesson 0 means the unit itself.
pub trait ProgressTracker {
    fn mark_activity_accessed(
        &self,
        learner: &Learner,
        unit_id: i64,
        lesson_id: i64,
    ) -> Result<(), StoreError>;
}

/// Process-wide count of acknowledged submissions.
#[derive(Debug, Default)]
pub struct AttemptCounter {
    count: AtomicU64,
}

impl AttemptCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self) -> u64 {
        self.count.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn get(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}

/// Stages a submission can fail in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStage {
    Recording,
    ProgressUpdate,
}

impl fmt::Display for SubmissionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recording => write!(f, "recording"),
            Self::ProgressUpdate => write!(f, "progress update"),
        }
    }
}

#[derive(Debug)]
pub enum SubmissionError {
    /// No enrolled learner; answered exactly like a missing page
    Rejected,
    Store {
        stage: SubmissionStage,
        source: StoreError,
    },
}

impl fmt::Display for SubmissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected => write!(f, "submission rejected: no enrolled learner"),
            Self::Store { stage, source } => write!(f, "submission failed during {}: {}", stage, source),
        }
    }
}

impl std::error::Error for SubmissionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Rejected => None,
            Self::Store { source, .. } => Some(source.as_ref()),
        }
    }
}

impl IntoResponse for SubmissionError {
    fn into_response(self) -> Response {
        match self {
            Self::Rejected => {
                tracing::debug!("{}", self);
                StatusCode::NOT_FOUND.into_response()
            }
            Self::Store { .. } => {
                tracing::error!("{}", self);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

/// Successful submission response: an empty JSON object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acknowledgement {
    pub context: RecoveredContext,
}

impl Acknowledgement {
    pub const BODY: &'static str = "{}";
}

impl IntoResponse for Acknowledgement {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            Self::BODY,
        )
            .into_response()
    }
}

/// Run one submission through every stage.
pub fn record_submission<C>(
    course: &C,
    attempts: &AttemptCounter,
    learner: Option<&Learner>,
    payload: &str,
) -> Result<Acknowledgement, SubmissionError>
where
    C: EventLog + ProgressTracker + LessonDirectory + ?Sized,
{
    let learner = learner.ok_or(SubmissionError::Rejected)?;

    course
        .record_event(SUBMIT_EVENT_KIND, learner, payload)
        .map_err(|source| SubmissionError::Store {
            stage: SubmissionStage::Recording,
            source,
        })?;

    let context = recover_context(payload, course);
    if context.is_unknown() {
        tracing::debug!("No lesson context in submission from {}", learner.username);
    }

    course
        .mark_activity_accessed(learner, context.unit_id, context.lesson_id)
        .map_err(|source| SubmissionError::Store {
            stage: SubmissionStage::ProgressUpdate,
            source,
        })?;

    let total = attempts.increment();
    tracing::info!(
        "Recorded submission from {} (unit {}, lesson {}), {} this run",
        learner.username,
        context.unit_id,
        context.lesson_id,
        total
    );

    Ok(Acknowledgement { context })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::LessonRef;
    use std::cell::RefCell;

    #[derive(Default)]
    struct FakeCourse {
        events: RefCell<Vec<(String, i64, String)>>,
        progress: RefCell<Vec<(i64, i64, i64)>>,
        fail_log: bool,
        fail_progress: bool,
    }

    impl EventLog for FakeCourse {
        fn record_event(&self, kind: &str, learner: &Learner, payload: &str) -> Result<(), StoreError> {
            if self.fail_log {
                return Err("log unavailable".into());
            }
            self.events
                .borrow_mut()
                .push((kind.to_string(), learner.user_id, payload.to_string()));
            Ok(())
        }
    }

    impl ProgressTracker for FakeCourse {
        fn mark_activity_accessed(&self, learner: &Learner, unit_id: i64, lesson_id: i64) -> Result<(), StoreError> {
            if self.fail_progress {
                return Err("tracker unavailable".into());
            }
            self.progress.borrow_mut().push((learner.user_id, unit_id, lesson_id));
            Ok(())
        }
    }

    impl LessonDirectory for FakeCourse {
        fn lessons_for_unit(&self, unit_id: i64) -> Vec<LessonRef> {
            if unit_id == 5 {
                vec![LessonRef { lesson_id: 9, title: "Intro".into() }]
            } else {
                Vec::new()
            }
        }
    }

    fn learner() -> Learner {
        Learner { user_id: 3, username: "ana".into() }
    }

    fn payload(origin_query: &str) -> String {
        let origin = format!("http://host/unit?{}", origin_query);
        let location = format!(
            "http://host/frame?ity_ef_slug=static:addition_1&ity_ef_origin={}",
            urlencoding::encode(&origin)
        );
        serde_json::json!({ "location": urlencoding::encode(&location) }).to_string()
    }

    #[test]
    fn test_accepted_submission_runs_every_stage() {
        let course = FakeCourse::default();
        let attempts = AttemptCounter::new();
        let body = payload("unit=5&lesson=7");

        let ack = record_submission(&course, &attempts, Some(&learner()), &body).unwrap();

        assert_eq!(ack.context, RecoveredContext { unit_id: 5, lesson_id: 7 });
        assert_eq!(
            *course.events.borrow(),
            vec![(SUBMIT_EVENT_KIND.to_string(), 3, body.clone())]
        );
        assert_eq!(*course.progress.borrow(), vec![(3, 5, 7)]);
        assert_eq!(attempts.get(), 1);
    }

    #[test]
    fn test_missing_lesson_falls_back_to_first() {
        let course = FakeCourse::default();
        let attempts = AttemptCounter::new();

        record_submission(&course, &attempts, Some(&learner()), &payload("unit=5")).unwrap();
        assert_eq!(*course.progress.borrow(), vec![(3, 5, 9)]);
    }

    #[test]
    fn test_garbage_payload_still_recorded() {
        let course = FakeCourse::default();
        let attempts = AttemptCounter::new();

        let ack = record_submission(&course, &attempts, Some(&learner()), "not json").unwrap();

        assert!(ack.context.is_unknown());
        assert_eq!(course.events.borrow().len(), 1);
        assert_eq!(*course.progress.borrow(), vec![(3, 0, 0)]);
        assert_eq!(attempts.get(), 1);
    }

    #[test]
    fn test_no_learner_is_rejected_without_side_effects() {
        let course = FakeCourse::default();
        let attempts = AttemptCounter::new();

        let err = record_submission(&course, &attempts, None, &payload("unit=5&lesson=7")).unwrap_err();

        assert!(matches!(err, SubmissionError::Rejected));
        assert!(course.events.borrow().is_empty());
        assert!(course.progress.borrow().is_empty());
        assert_eq!(attempts.get(), 0);
    }

    #[test]
    fn test_failing_log_leaves_counter_unchanged() {
        let course = FakeCourse { fail_log: true, ..Default::default() };
        let attempts = AttemptCounter::new();

        let err = record_submission(&course, &attempts, Some(&learner()), "{}").unwrap_err();

        assert!(matches!(err, SubmissionError::Store { stage: SubmissionStage::Recording, .. }));
        assert!(course.progress.borrow().is_empty());
        assert_eq!(attempts.get(), 0);
    }

    #[test]
    fn test_failing_tracker_keeps_event_but_not_count() {
        let course = FakeCourse { fail_progress: true, ..Default::default() };
        let attempts = AttemptCounter::new();

        let err = record_submission(&course, &attempts, Some(&learner()), "{}").unwrap_err();

        assert!(matches!(err, SubmissionError::Store { stage: SubmissionStage::ProgressUpdate, .. }));
        assert_eq!(course.events.borrow().len(), 1);
        assert_eq!(attempts.get(), 0);
    }

    #[test]
    fn test_each_call_records_again() {
        let course = FakeCourse::default();
        let attempts = AttemptCounter::new();
        let body = payload("unit=5&lesson=7");

        record_submission(&course, &attempts, Some(&learner()), &body).unwrap();
        record_submission(&course, &attempts, Some(&learner()), &body).unwrap();

        assert_eq!(course.events.borrow().len(), 2);
        assert_eq!(attempts.get(), 2);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(SubmissionError::Rejected.into_response().status(), StatusCode::NOT_FOUND);
        let store = SubmissionError::Store {
            stage: SubmissionStage::Recording,
            source: "boom".into(),
        };
        assert_eq!(store.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            Acknowledgement { context: RecoveredContext::default() }.into_response().status(),
            StatusCode::OK
        );
    }
}
