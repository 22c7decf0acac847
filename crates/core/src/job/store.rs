//! Job log and status storage trait.

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use super::{JobFailure, JobId, JobState};

/// Errors from a job store backend.
#[derive(Debug, Error)]
pub enum JobStoreError {
    /// Could not create the job's work directory.
    #[error("can not create dir {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not open or append to the log.
    #[error("can not write log {path}: {source}")]
    Log {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not write a terminal marker.
    #[error("can not write status file {path}: {source}")]
    Marker {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The job already reached a terminal state.
    #[error("job {0} is already finished")]
    AlreadyFinished(String),

    /// A stored marker could not be decoded.
    #[error("corrupt status for job {job_id}: {reason}")]
    Corrupt { job_id: String, reason: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Durable progress log and terminal status for download jobs.
///
/// Terminal markers are write-once: after `mark_done` or `mark_failed`
/// succeeds, both calls return [`JobStoreError::AlreadyFinished`].
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Append one timestamped line to the job's log, creating it if needed.
    async fn append_log(&self, id: &JobId, message: &str) -> Result<(), JobStoreError>;

    /// Full log text, or `None` when no log exists.
    async fn read_log(&self, id: &JobId) -> Result<Option<String>, JobStoreError>;

    /// Record success with the public path of the stored object.
    async fn mark_done(&self, id: &JobId, location: &str) -> Result<(), JobStoreError>;

    /// Record a terminal failure.
    async fn mark_failed(&self, id: &JobId, failure: &JobFailure) -> Result<(), JobStoreError>;

    /// Current state derived from what has been recorded.
    async fn state(&self, id: &JobId) -> Result<JobState, JobStoreError>;
}
