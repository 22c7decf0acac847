use std::path::{Path, PathBuf};

use super::JobId;

/// File locations inside one job's work directory.
#[derive(Debug, Clone)]
pub struct JobPaths {
    work_dir: PathBuf,
}

impl JobPaths {
    pub fn new(tmp_dir: &Path, id: &JobId) -> Self {
        Self {
            work_dir: tmp_dir.join(id.as_str()),
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Payload being fetched and hashed.
    pub fn payload(&self) -> PathBuf {
        self.work_dir.join("file")
    }

    pub fn log(&self) -> PathBuf {
        self.work_dir.join("log")
    }

    pub fn done(&self) -> PathBuf {
        self.work_dir.join("done")
    }

    pub fn failed(&self) -> PathBuf {
        self.work_dir.join("failed")
    }
}
