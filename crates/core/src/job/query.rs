//! Read-only job status lookup.

use std::sync::Arc;
use thiserror::Error;

use super::{JobFailure, JobId, JobState, JobStore, JobStoreError};

/// What a client sees when asking about a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobReport {
    /// Finished; redirect to `location`.
    Done { location: String },
    /// Still running, or died without recording anything further.
    InProgress { log: String },
    /// Stopped with an error.
    Failed { failure: JobFailure, log: String },
}

#[derive(Debug, Error)]
pub enum QueryError {
    /// No job directory and no log under this id.
    #[error("can not open logfile for job {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] JobStoreError),
}

/// Looks up jobs through a [`JobStore`].
#[derive(Clone)]
pub struct StatusQuery {
    store: Arc<dyn JobStore>,
}

impl StatusQuery {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self { store }
    }

    /// Report the state of the job named by `raw_id`.
    ///
    /// Ids that are not well-formed are reported as unknown.
    pub async fn lookup(&self, raw_id: &str) -> Result<JobReport, QueryError> {
        let id = JobId::parse(raw_id).ok_or_else(|| QueryError::NotFound(raw_id.to_string()))?;

        match self.store.state(&id).await? {
            JobState::Unknown => Err(QueryError::NotFound(id.to_string())),
            JobState::Done { location } => Ok(JobReport::Done { location }),
            JobState::Failed(failure) => Ok(JobReport::Failed {
                failure,
                log: self.log_text(&id).await?,
            }),
            JobState::Running => Ok(JobReport::InProgress {
                log: self.log_text(&id).await?,
            }),
        }
    }

    async fn log_text(&self, id: &JobId) -> Result<String, QueryError> {
        Ok(self.store.read_log(id).await?.unwrap_or_default())
    }
}
