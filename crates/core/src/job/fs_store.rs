//! Filesystem job store.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::store::{create_dir_all, write_file_atomic};

use super::{JobFailure, JobId, JobPaths, JobState, JobStore, JobStoreError};

/// Keeps each job's log and markers in `<tmp_dir>/<job id>/`.
#[derive(Debug, Clone)]
pub struct FsJobStore {
    tmp_dir: PathBuf,
}

impl FsJobStore {
    pub fn new(tmp_dir: impl Into<PathBuf>) -> Self {
        Self {
            tmp_dir: tmp_dir.into(),
        }
    }

    pub fn paths(&self, id: &JobId) -> JobPaths {
        JobPaths::new(&self.tmp_dir, id)
    }

    async fn ensure_work_dir(&self, paths: &JobPaths) -> Result<(), JobStoreError> {
        create_dir_all(paths.work_dir())
            .await
            .map_err(|e| JobStoreError::CreateDir {
                path: paths.work_dir().to_path_buf(),
                source: e,
            })
    }

    async fn ensure_unfinished(&self, id: &JobId, paths: &JobPaths) -> Result<(), JobStoreError> {
        if exists(&paths.done()).await? || exists(&paths.failed()).await? {
            return Err(JobStoreError::AlreadyFinished(id.to_string()));
        }
        Ok(())
    }
}

fn format_line(message: &str) -> String {
    format!(
        "{} -- {}\n",
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        message
    )
}

async fn exists(path: &Path) -> std::io::Result<bool> {
    fs::try_exists(path).await
}

async fn read_optional(path: &Path) -> std::io::Result<Option<Vec<u8>>> {
    match fs::read(path).await {
        Ok(data) => Ok(Some(data)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

#[async_trait]
impl JobStore for FsJobStore {
    async fn append_log(&self, id: &JobId, message: &str) -> Result<(), JobStoreError> {
        let paths = self.paths(id);
        self.ensure_work_dir(&paths).await?;

        let log_path = paths.log();
        let log_err = |e| JobStoreError::Log {
            path: log_path.clone(),
            source: e,
        };

        let mut options = OpenOptions::new();
        options.append(true).create(true);
        #[cfg(unix)]
        options.mode(0o640);

        // One write per line so concurrent appends interleave by whole lines
        let mut file = options.open(&log_path).await.map_err(log_err)?;
        file.write_all(format_line(message).as_bytes())
            .await
            .map_err(log_err)?;
        file.flush().await.map_err(log_err)?;
        Ok(())
    }

    async fn read_log(&self, id: &JobId) -> Result<Option<String>, JobStoreError> {
        let data = read_optional(&self.paths(id).log()).await?;
        Ok(data.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }

    async fn mark_done(&self, id: &JobId, location: &str) -> Result<(), JobStoreError> {
        let paths = self.paths(id);
        self.ensure_unfinished(id, &paths).await?;
        self.ensure_work_dir(&paths).await?;

        let done = paths.done();
        write_file_atomic(&done, location.as_bytes())
            .await
            .map_err(|e| JobStoreError::Marker {
                path: done,
                source: e,
            })
    }

    async fn mark_failed(&self, id: &JobId, failure: &JobFailure) -> Result<(), JobStoreError> {
        let paths = self.paths(id);
        self.ensure_unfinished(id, &paths).await?;
        self.ensure_work_dir(&paths).await?;

        let json = serde_json::to_vec_pretty(failure).map_err(|e| JobStoreError::Corrupt {
            job_id: id.to_string(),
            reason: e.to_string(),
        })?;

        let failed = paths.failed();
        write_file_atomic(&failed, &json)
            .await
            .map_err(|e| JobStoreError::Marker {
                path: failed,
                source: e,
            })
    }

    async fn state(&self, id: &JobId) -> Result<JobState, JobStoreError> {
        let paths = self.paths(id);

        if let Some(location) = read_optional(&paths.done()).await? {
            return Ok(JobState::Done {
                location: String::from_utf8_lossy(&location).into_owned(),
            });
        }

        if let Some(json) = read_optional(&paths.failed()).await? {
            let failure: JobFailure =
                serde_json::from_slice(&json).map_err(|e| JobStoreError::Corrupt {
                    job_id: id.to_string(),
                    reason: e.to_string(),
                })?;
            return Ok(JobState::Failed(failure));
        }

        if exists(paths.work_dir()).await? || exists(&paths.log()).await? {
            return Ok(JobState::Running);
        }

        Ok(JobState::Unknown)
    }
}
