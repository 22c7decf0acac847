use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline stage of a download job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Fetch,
    Hash,
    Relocate,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Fetch => "fetch",
            Stage::Hash => "hash",
            Stage::Relocate => "relocate",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal failure record, persisted next to the job log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFailure {
    pub stage: Stage,
    pub error: String,
    pub failed_at: DateTime<Utc>,
}

impl JobFailure {
    pub fn new(stage: Stage, error: impl Into<String>) -> Self {
        Self {
            stage,
            error: error.into(),
            failed_at: Utc::now(),
        }
    }
}

/// What the backing store knows about a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    /// Nothing recorded under this id.
    Unknown,
    /// Recorded but not finished; may also be a job whose task died.
    Running,
    /// Relocated; holds the public path of the stored object.
    Done { location: String },
    Failed(JobFailure),
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Done { .. } | JobState::Failed(_))
    }
}
