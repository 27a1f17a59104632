//! Recover the unit/lesson a submission came from.
//!
//! The widget does not send its host context. What it does send is the
//! `location` of its own frame, and the frame URL carries the host page URL
//! in `ity_ef_origin`. The host page URL in turn carries `unit` and
//! `lesson`. Recovery peels those layers one by one:
//!
//! ```text
//! payload JSON ─ location (percent-encoded)
//!                  └─ query: ity_ef_origin (URL)
//!                                └─ query: unit, lesson
//! ```
//!
//! Every layer may be missing. A missing layer yields zero ids rather than an
//! error: context is best-effort telemetry.

use serde_json::Value;

use super::query::{percent_decode, url_query, QueryParams};

/// Frame URL parameter carrying the host page URL.
pub const ORIGIN_PARAM: &str = "ity_ef_origin";

/// Unit and lesson ids; 0 means unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecoveredContext {
    pub unit_id: i64,
    pub lesson_id: i64,
}

impl RecoveredContext {
    pub fn is_unknown(&self) -> bool {
        self.unit_id == 0
    }
}

/// A lesson as listed by the course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonRef {
    pub lesson_id: i64,
    pub title: String,
}

/// Course collaborator used for the first-lesson fallback.
pub trait LessonDirectory {
    /// Lessons of `unit_id` in course order. Empty if unknown.
    fn lessons_for_unit(&self, unit_id: i64) -> Vec<LessonRef>;
}

/// Recover the context of a serialized submission payload.
pub fn recover_context<D: LessonDirectory + ?Sized>(payload: &str, lessons: &D) -> RecoveredContext {
    let Some((unit_id, lesson_id)) = origin_ids(payload) else {
        return RecoveredContext::default();
    };

    // The first lesson of a unit is linked without a lesson id.
    let lesson_id = if lesson_id == 0 && unit_id != 0 {
        lessons
            .lessons_for_unit(unit_id)
            .first()
            .map_or(0, |lesson| lesson.lesson_id)
    } else {
        lesson_id
    };

    RecoveredContext { unit_id, lesson_id }
}

/// Raw `(unit, lesson)` from the payload, before any fallback.
fn origin_ids(payload: &str) -> Option<(i64, i64)> {
    let origin = origin_url(payload)?;
    let params = QueryParams::parse(url_query(&origin)?);
    Some((int_param(&params, "unit"), int_param(&params, "lesson")))
}

/// The host page URL embedded in the payload's `location`.
pub fn origin_url(payload: &str) -> Option<String> {
    let json: Value = serde_json::from_str(payload).ok()?;
    let location = json.as_object()?.get("location")?.as_str()?;
    if location.is_empty() {
        return None;
    }

    let location = percent_decode(location);
    QueryParams::parse(&location)
        .first(ORIGIN_PARAM)
        .map(str::to_string)
}

fn int_param(params: &QueryParams, name: &str) -> i64 {
    params
        .first(name)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct FakeCourse {
        units: HashMap<i64, Vec<i64>>,
    }

    impl FakeCourse {
        fn with_unit(mut self, unit: i64, lessons: &[i64]) -> Self {
            self.units.insert(unit, lessons.to_vec());
            self
        }
    }

    impl LessonDirectory for FakeCourse {
        fn lessons_for_unit(&self, unit_id: i64) -> Vec<LessonRef> {
            self.units
                .get(&unit_id)
                .map(|ids| {
                    ids.iter()
                        .map(|&lesson_id| LessonRef { lesson_id, title: String::new() })
                        .collect()
                })
                .unwrap_or_default()
        }
    }

    fn payload_for_origin_query(origin_query: &str) -> String {
        let origin = format!("http://x/unit?{}", origin_query);
        let location = format!("ity_ef_origin={}", urlencoding::encode(&origin));
        serde_json::json!({ "location": urlencoding::encode(&location) }).to_string()
    }

    #[test]
    fn test_unit_and_lesson_recovered() {
        let payload = serde_json::json!({
            "location": urlencoding::encode(
                "ity_ef_origin=http%3A%2F%2Fx%2Funit%3Funit%3D5%26lesson%3D12"
            ),
        })
        .to_string();

        let ctx = recover_context(&payload, &FakeCourse::default());
        assert_eq!(ctx, RecoveredContext { unit_id: 5, lesson_id: 12 });
    }

    #[test]
    fn test_first_lesson_fallback() {
        let course = FakeCourse::default().with_unit(5, &[7, 8, 9]);
        let ctx = recover_context(&payload_for_origin_query("unit=5"), &course);
        assert_eq!(ctx, RecoveredContext { unit_id: 5, lesson_id: 7 });
    }

    #[test]
    fn test_fallback_with_empty_unit_keeps_zero() {
        let course = FakeCourse::default().with_unit(5, &[]);
        let ctx = recover_context(&payload_for_origin_query("unit=5"), &course);
        assert_eq!(ctx, RecoveredContext { unit_id: 5, lesson_id: 0 });
    }

    #[test]
    fn test_non_numeric_lesson_uses_fallback() {
        let course = FakeCourse::default().with_unit(3, &[11]);
        let ctx = recover_context(&payload_for_origin_query("unit=3&lesson=abc"), &course);
        assert_eq!(ctx, RecoveredContext { unit_id: 3, lesson_id: 11 });
    }

    #[test]
    fn test_no_unit_means_no_fallback() {
        let course = FakeCourse::default().with_unit(0, &[1]);
        let ctx = recover_context(&payload_for_origin_query("lesson=4"), &course);
        assert_eq!(ctx, RecoveredContext { unit_id: 0, lesson_id: 4 });
    }

    #[test]
    fn test_first_value_of_repeated_params() {
        let ctx = recover_context(
            &payload_for_origin_query("unit=2&unit=9&lesson=6&lesson=1"),
            &FakeCourse::default(),
        );
        assert_eq!(ctx, RecoveredContext { unit_id: 2, lesson_id: 6 });
    }

    #[test]
    fn test_location_with_frame_url_prefix() {
        // real frames report their full URL, the origin is one of several params
        let origin = urlencoding::encode("http://host/course/unit?unit=4&lesson=2");
        let location = format!(
            "http://host/extensions/indirect/?ity_ef_slug=static:foo&ity_ef_origin={}",
            origin
        );
        let payload = serde_json::json!({ "location": urlencoding::encode(&location) }).to_string();

        let ctx = recover_context(&payload, &FakeCourse::default());
        assert_eq!(ctx, RecoveredContext { unit_id: 4, lesson_id: 2 });
    }

    #[test]
    fn test_missing_layers_yield_zero() {
        let course = FakeCourse::default().with_unit(5, &[7]);
        let zero = RecoveredContext::default();

        for payload in [
            "",
            "not json",
            "[1,2,3]",
            "null",
            "{}",
            r#"{"location": ""}"#,
            r#"{"location": 42}"#,
            r#"{"location": "a%3Db"}"#,
            r#"{"location": "ity_ef_origin%3Dhttp%253A%252F%252Fx%252Funit"}"#,
        ] {
            assert_eq!(recover_context(payload, &course), zero, "payload: {}", payload);
        }
    }

    #[test]
    fn test_origin_without_ids() {
        let ctx = recover_context(&payload_for_origin_query("foo=bar"), &FakeCourse::default());
        assert_eq!(ctx, RecoveredContext::default());
        assert!(ctx.is_unknown());
    }

    #[test]
    fn test_origin_url_extraction() {
        let payload = payload_for_origin_query("unit=1");
        assert_eq!(origin_url(&payload).as_deref(), Some("http://x/unit?unit=1"));
        assert_eq!(origin_url("{}"), None);
    }
}
