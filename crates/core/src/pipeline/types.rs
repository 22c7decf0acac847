//! Types for the download pipeline.

use thiserror::Error;
use tokio::task::JoinHandle;

use crate::fetch::FetchError;
use crate::job::{JobId, JobStoreError, Stage};
use crate::store::{StoreError, StoredObject};

/// Errors returned synchronously by `submit`.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Not an absolute http(s) URL.
    #[error("invalid url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Errors that stop a job. Each belongs to exactly one stage.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The work directory could not be created.
    #[error("can not create dir {path}: {source}")]
    WorkDir {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("can not get from url: {0}")]
    Fetch(#[from] FetchError),

    #[error("can not hash file: {0}")]
    Hash(#[source] std::io::Error),

    #[error("can not move file to destination: {0}")]
    Relocate(#[from] StoreError),

    #[error("can not write status file: {0}")]
    Status(#[from] JobStoreError),

    /// The stage task panicked or was cancelled.
    #[error("{stage} stage aborted: {reason}")]
    Aborted { stage: Stage, reason: String },
}

impl PipelineError {
    /// The stage this error belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::WorkDir { .. } | PipelineError::Fetch(_) => Stage::Fetch,
            PipelineError::Hash(_) => Stage::Hash,
            PipelineError::Relocate(_) | PipelineError::Status(_) => Stage::Relocate,
            PipelineError::Aborted { stage, .. } => *stage,
        }
    }
}

/// Handle to a submitted job.
///
/// Dropping it detaches the job; it keeps running to completion.
#[derive(Debug)]
pub struct JobHandle {
    id: JobId,
    task: JoinHandle<Result<StoredObject, PipelineError>>,
}

impl JobHandle {
    pub(crate) fn new(id: JobId, task: JoinHandle<Result<StoredObject, PipelineError>>) -> Self {
        Self { id, task }
    }

    pub fn id(&self) -> &JobId {
        &self.id
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the job to reach done or failed.
    pub async fn wait(self) -> Result<StoredObject, PipelineError> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(PipelineError::Aborted {
                stage: Stage::Relocate,
                reason: e.to_string(),
            }),
        }
    }
}
