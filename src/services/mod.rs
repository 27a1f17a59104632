//! Application services.

pub mod recorder;

pub use recorder::{
    record_submission, Acknowledgement, AttemptCounter, EventLog, ProgressTracker, StoreError,
    SubmissionError, SubmissionStage,
};
