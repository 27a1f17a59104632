//! JSONL file logger for profiling events.

use std::fs::{create_dir_all, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;

use super::event::{EventType, ProfileEvent};

/// Global logger instance - must be initialized via init().
static LOGGER: Mutex<Option<ProfileLogger>> = Mutex::new(None);

/// Event counter for session statistics.
static EVENT_COUNT: AtomicU64 = AtomicU64::new(0);

/// The profile logger that writes events to a JSONL file.
pub struct ProfileLogger {
    writer: BufWriter<File>,
    session_id: String,
}

impl ProfileLogger {
    /// Create a new logger with a timestamped filename.
    fn new() -> std::io::Result<Self> {
        let now = Utc::now();
        let session_id = now.format("%Y%m%d_%H%M%S").to_string();
        let dir = crate::paths::profile_dir();
        create_dir_all(&dir)?;
        let filename = format!("{}/profile_{}.jsonl", dir, session_id);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&filename)?;

        tracing::info!("Profiling enabled: writing to {}", filename);

        Ok(Self {
            writer: BufWriter::new(file),
            session_id,
        })
    }

    /// Write an event to the log file and console.
    fn log(&mut self, event: ProfileEvent) {
        if let Ok(json) = serde_json::to_string(&event) {
            // Write to file
            let _ = writeln!(self.writer, "{}", json);
            // Flush periodically for durability (every 100 events)
            if EVENT_COUNT.load(Ordering::Relaxed) % 100 == 0 {
                let _ = self.writer.flush();
            }
            // Also write to console
            println!("[PROFILE] {}", json);
        }
        EVENT_COUNT.fetch_add(1, Ordering::Relaxed);
    }

    /// Flush all buffered data.
    fn flush(&mut self) {
        let _ = self.writer.flush();
    }

    /// Get the session ID.
    fn session_id(&self) -> &str {
        &self.session_id
    }
}

/// Initialize the profiler. Call this from main() before any logging.
///
/// Creates a new log file with a timestamped name in the data directory.
pub fn init() {
    let Ok(mut guard) = LOGGER.lock() else {
        tracing::error!("Profiler lock poisoned");
        return;
    };
    if guard.is_some() {
        tracing::warn!("Profiler already initialized");
        return;
    }

    match ProfileLogger::new() {
        Ok(logger) => {
            let session_id = logger.session_id().to_string();
            *guard = Some(logger);

            // Log session start
            drop(guard); // Release lock before logging
            log_event(EventType::SessionStart { session_id });
        }
        Err(e) => {
            tracing::error!("Failed to initialize profiler: {}", e);
        }
    }
}

/// Shutdown the profiler and flush remaining events.
///
/// Call this before application exit to ensure all events are written.
pub fn shutdown() {
    let total_events = EVENT_COUNT.load(Ordering::Relaxed);

    // Log session end before shutting down
    log_event(EventType::SessionEnd { total_events });

    let Ok(mut guard) = LOGGER.lock() else {
        return;
    };
    if let Some(ref mut logger) = *guard {
        logger.flush();
        tracing::info!(
            "Profiling session ended: {} events logged",
            total_events
        );
    }
    *guard = None;
}

/// Log a profiling event.
pub fn log_event(event_type: EventType) {
    let event = ProfileEvent::new(event_type);
    if let Ok(mut guard) = LOGGER.lock() {
        if let Some(ref mut logger) = *guard {
            logger.log(event);
        }
    }
}

/// Log a profiling event with additional metadata.
pub fn log_event_with_meta(event_type: EventType, metadata: serde_json::Value) {
    let event = ProfileEvent::with_metadata(event_type, metadata);
    if let Ok(mut guard) = LOGGER.lock() {
        if let Some(ref mut logger) = *guard {
            logger.log(event);
        }
    }
}

/// Log a timed scope completion.
pub fn log_timed(name: &str, duration: Duration) {
    let event = ProfileEvent::with_duration(
        EventType::TimedScope {
            name: name.to_string(),
        },
        duration,
    );
    if let Ok(mut guard) = LOGGER.lock() {
        if let Some(ref mut logger) = *guard {
            logger.log(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = ProfileEvent::new(EventType::SubmissionRecorded {
            user_id: 1,
            unit_id: 5,
            lesson_id: 7,
        });
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"submission_recorded\""));
        assert!(!json.contains("duration_us"));
    }

    #[test]
    fn test_timed_event_carries_duration() {
        let event = ProfileEvent::with_duration(
            EventType::TimedScope { name: "catalog_scan".into() },
            Duration::from_micros(1500),
        );
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"duration_us\":1500"));
    }

    #[test]
    fn test_metadata_is_attached() {
        let event = ProfileEvent::with_metadata(
            EventType::WhitelistUpdate { entries: 2 },
            serde_json::json!({ "admin": "root" }),
        );
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"whitelist_update\""));
        assert!(json.contains("\"metadata\":{\"admin\":\"root\"}"));
    }
}
