//! Download pipeline implementation.
//!
//! `submit` records the job and returns immediately. A supervisor task then
//! spawns each stage as its own task and awaits it before starting the next,
//! so stages of one job never overlap while jobs run fully in parallel.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use reqwest::Url;
use tracing::{debug, error, info, warn};

use crate::fetch::Fetcher;
use crate::job::{JobFailure, JobId, JobPaths, JobStore, Stage};
use crate::metrics;
use crate::store::{create_dir_all, digest_file, escape_url, ContentStore, StoredObject};

use super::types::{JobHandle, PipelineError, SubmitError};

/// Accepts URLs and drives them through fetch, hash and relocate.
#[derive(Clone)]
pub struct DownloadPipeline {
    store: ContentStore,
    jobs: Arc<dyn JobStore>,
    fetcher: Arc<dyn Fetcher>,
}

/// Everything a stage needs, shared by the tasks of one job.
struct JobContext {
    id: JobId,
    url: String,
    paths: JobPaths,
    store: ContentStore,
    jobs: Arc<dyn JobStore>,
    fetcher: Arc<dyn Fetcher>,
}

impl JobContext {
    fn payload(&self) -> PathBuf {
        self.paths.payload()
    }

    /// Append to the job log. Failures are reported but never stop the job.
    async fn log(&self, message: &str) {
        if let Err(e) = self.jobs.append_log(&self.id, message).await {
            warn!(job_id = %self.id, error = %e, "Failed to append to job log");
        }
    }

    async fn record_failure(&self, err: &PipelineError) {
        let stage = err.stage();
        let message = err.to_string();

        error!(job_id = %self.id, url = %self.url, stage = %stage, error = %message, "Download failed");
        self.log(&message).await;

        if let Err(e) = self
            .jobs
            .mark_failed(&self.id, &JobFailure::new(stage, message))
            .await
        {
            warn!(job_id = %self.id, error = %e, "Failed to write failed marker");
        }

        metrics::DOWNLOADS_FAILED
            .with_label_values(&[stage.as_str()])
            .inc();
        metrics::DOWNLOADS_ACTIVE.dec();
    }
}

impl DownloadPipeline {
    pub fn new(store: ContentStore, jobs: Arc<dyn JobStore>, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            store,
            jobs,
            fetcher,
        }
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    pub fn jobs(&self) -> &Arc<dyn JobStore> {
        &self.jobs
    }

    /// Register a download job for `url` and start it in the background.
    ///
    /// The returned handle carries the job id, which is usable for status
    /// lookups as soon as this returns. The job log already holds the
    /// `Downloading: <url>` line by then.
    pub async fn submit(&self, url: &str) -> Result<JobHandle, SubmitError> {
        let url = validate_url(url)?;
        let id = JobId::generate();

        let ctx = Arc::new(JobContext {
            paths: JobPaths::new(&self.store.tmp_dir(), &id),
            id: id.clone(),
            url,
            store: self.store.clone(),
            jobs: Arc::clone(&self.jobs),
            fetcher: Arc::clone(&self.fetcher),
        });

        info!(job_id = %id, url = %ctx.url, fetcher = ctx.fetcher.name(), "Download submitted");
        ctx.log(&format!("Downloading: {}", ctx.url)).await;

        metrics::DOWNLOADS_SUBMITTED.inc();
        metrics::DOWNLOADS_ACTIVE.inc();

        let task = tokio::spawn(supervise(ctx));
        Ok(JobHandle::new(id, task))
    }
}

fn validate_url(raw: &str) -> Result<String, SubmitError> {
    let trimmed = raw.trim();
    let invalid = |reason: String| SubmitError::InvalidUrl {
        url: trimmed.to_string(),
        reason,
    };

    let parsed = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme {:?}", other))),
    }
    if !parsed.host_str().is_some_and(|host| !host.is_empty()) {
        return Err(invalid("missing host".to_string()));
    }

    // Escaping works on the URL as submitted, not the normalized form
    Ok(trimmed.to_string())
}

/// Run the stages in order and record the outcome.
async fn supervise(ctx: Arc<JobContext>) -> Result<StoredObject, PipelineError> {
    let result = run_stages(&ctx).await;
    if let Err(e) = &result {
        ctx.record_failure(e).await;
    }
    result
}

async fn run_stages(ctx: &Arc<JobContext>) -> Result<StoredObject, PipelineError> {
    run_stage(Stage::Fetch, fetch_stage(Arc::clone(ctx))).await?;
    let digest = run_stage(Stage::Hash, hash_stage(Arc::clone(ctx))).await?;
    run_stage(Stage::Relocate, relocate_stage(Arc::clone(ctx), digest)).await
}

/// Run one stage as its own task and time it.
async fn run_stage<T, F>(stage: Stage, work: F) -> Result<T, PipelineError>
where
    T: Send + 'static,
    F: Future<Output = Result<T, PipelineError>> + Send + 'static,
{
    let timer = metrics::STAGE_DURATION
        .with_label_values(&[stage.as_str()])
        .start_timer();

    let result = match tokio::spawn(work).await {
        Ok(result) => result,
        Err(e) => Err(PipelineError::Aborted {
            stage,
            reason: e.to_string(),
        }),
    };

    timer.observe_duration();
    result
}

async fn fetch_stage(ctx: Arc<JobContext>) -> Result<u64, PipelineError> {
    let work_dir = ctx.paths.work_dir();
    create_dir_all(work_dir)
        .await
        .map_err(|e| PipelineError::WorkDir {
            path: work_dir.to_path_buf(),
            source: e,
        })?;

    let bytes = ctx.fetcher.fetch(&ctx.url, &ctx.payload()).await?;
    metrics::FETCHED_BYTES.inc_by(bytes);

    info!(job_id = %ctx.id, url = %ctx.url, bytes, "Finished loading");
    ctx.log(&format!("Finished loading {} ({} bytes)", ctx.url, bytes)).await;
    Ok(bytes)
}

async fn hash_stage(ctx: Arc<JobContext>) -> Result<String, PipelineError> {
    debug!(job_id = %ctx.id, "Hashing payload");
    ctx.log(&format!("Hashing {}", ctx.url)).await;

    let digest = digest_file(&ctx.payload())
        .await
        .map_err(PipelineError::Hash)?;

    info!(job_id = %ctx.id, digest = %digest, "Finished hashing");
    ctx.log(&format!("Finished hashing, hash is {}", digest)).await;
    Ok(digest)
}

async fn relocate_stage(ctx: Arc<JobContext>, digest: String) -> Result<StoredObject, PipelineError> {
    let filename = escape_url(&ctx.url);
    let public_path = ContentStore::public_path(&digest, &filename);

    ctx.log(&format!("Moving to {}", public_path)).await;

    let stored = ctx
        .store
        .relocate(&ctx.payload(), &digest, &filename)
        .await?;
    ctx.jobs.mark_done(&ctx.id, &stored.public_path).await?;

    metrics::DOWNLOADS_ACTIVE.dec();
    metrics::DOWNLOADS_COMPLETED.inc();

    info!(job_id = %ctx.id, location = %stored.public_path, "Download finished");
    ctx.log("Finished").await;
    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchError;
    use crate::job::{FsJobStore, JobState};
    use crate::testing::MockFetcher;
    use tempfile::TempDir;

    struct Harness {
        _dir: TempDir,
        jobs: Arc<FsJobStore>,
        fetcher: Arc<MockFetcher>,
        pipeline: DownloadPipeline,
    }

    fn harness() -> Harness {
        let dir = TempDir::new().unwrap();
        let store = ContentStore::new(dir.path().join("files"));
        let jobs = Arc::new(FsJobStore::new(store.tmp_dir()));
        let fetcher = Arc::new(MockFetcher::new());
        let pipeline = DownloadPipeline::new(store, jobs.clone(), fetcher.clone());
        Harness {
            _dir: dir,
            jobs,
            fetcher,
            pipeline,
        }
    }

    fn log_messages(log: &str) -> Vec<String> {
        log.lines()
            .map(|l| l.split_once(" -- ").unwrap().1.to_string())
            .collect()
    }

    #[test]
    fn test_validate_url() {
        assert_eq!(
            validate_url("  http://example.com/a.bin \n").unwrap(),
            "http://example.com/a.bin"
        );
        assert!(validate_url("https://example.com").is_ok());

        for bad in ["", "example.com/a", "ftp://example.com/a", "file:///etc/passwd", "http://"] {
            assert!(
                matches!(validate_url(bad), Err(SubmitError::InvalidUrl { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_successful_job() {
        let h = harness();
        h.fetcher.set_body("http://example.com/a.bin", b"ABC".to_vec()).await;

        let handle = h.pipeline.submit("http://example.com/a.bin").await.unwrap();
        let id = handle.id().clone();
        let stored = handle.wait().await.unwrap();

        assert_eq!(stored.digest, "3c01bdbb26f358bab27f267924aa2c9a03fcfdb8");
        assert_eq!(stored.filename, "http-__example.com_a.bin");
        assert_eq!(std::fs::read(&stored.path).unwrap(), b"ABC");
        assert!(!h.jobs.paths(&id).payload().exists());

        assert_eq!(
            h.jobs.state(&id).await.unwrap(),
            JobState::Done {
                location: "files/3c01bdbb26f358bab27f267924aa2c9a03fcfdb8/http-__example.com_a.bin"
                    .to_string()
            }
        );

        let log = h.jobs.read_log(&id).await.unwrap().unwrap();
        assert_eq!(
            log_messages(&log),
            [
                "Downloading: http://example.com/a.bin",
                "Finished loading http://example.com/a.bin (3 bytes)",
                "Hashing http://example.com/a.bin",
                "Finished hashing, hash is 3c01bdbb26f358bab27f267924aa2c9a03fcfdb8",
                "Moving to files/3c01bdbb26f358bab27f267924aa2c9a03fcfdb8/http-__example.com_a.bin",
                "Finished",
            ]
        );
    }

    #[tokio::test]
    async fn test_status_visible_before_fetch_completes() {
        let h = harness();
        h.fetcher.set_body("http://example.com/slow", b"slow".to_vec()).await;
        h.fetcher.hold();

        let handle = h.pipeline.submit("http://example.com/slow").await.unwrap();

        assert_eq!(h.jobs.state(handle.id()).await.unwrap(), JobState::Running);
        let log = h.jobs.read_log(handle.id()).await.unwrap().unwrap();
        assert_eq!(log_messages(&log), ["Downloading: http://example.com/slow"]);

        h.fetcher.release();
        assert!(handle.wait().await.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_failure_writes_failed_marker() {
        let h = harness();
        h.fetcher.set_error("http://example.com/missing", 404).await;

        let handle = h.pipeline.submit("http://example.com/missing").await.unwrap();
        let id = handle.id().clone();
        let err = handle.wait().await.unwrap_err();

        assert_eq!(err.stage(), Stage::Fetch);
        assert!(matches!(err, PipelineError::Fetch(FetchError::Status { status: 404, .. })));
        assert!(!h.jobs.paths(&id).done().exists());

        match h.jobs.state(&id).await.unwrap() {
            JobState::Failed(failure) => {
                assert_eq!(failure.stage, Stage::Fetch);
                assert!(failure.error.contains("404"));
            }
            other => panic!("unexpected state: {:?}", other),
        }

        let log = h.jobs.read_log(&id).await.unwrap().unwrap();
        let messages = log_messages(&log);
        assert_eq!(messages.len(), 2);
        assert!(messages[1].starts_with("can not get from url:"));
    }

    #[tokio::test]
    async fn test_relocate_failure_when_name_too_long() {
        let h = harness();
        let url = format!("http://example.com/{}", "a".repeat(400));
        h.fetcher.set_body(&url, b"long".to_vec()).await;

        let handle = h.pipeline.submit(&url).await.unwrap();
        let id = handle.id().clone();
        let err = handle.wait().await.unwrap_err();

        assert_eq!(err.stage(), Stage::Relocate);
        match h.jobs.state(&id).await.unwrap() {
            JobState::Failed(failure) => assert_eq!(failure.stage, Stage::Relocate),
            other => panic!("unexpected state: {:?}", other),
        }
        let log = h.jobs.read_log(&id).await.unwrap().unwrap();
        assert!(log.contains("Finished hashing"));
        assert!(log.contains("can not move file to destination"));
    }

    #[tokio::test]
    async fn test_same_content_two_urls() {
        let h = harness();
        h.fetcher.set_body("http://a.example/x", b"same".to_vec()).await;
        h.fetcher.set_body("http://b.example/y", b"same".to_vec()).await;

        let first = h.pipeline.submit("http://a.example/x").await.unwrap();
        let second = h.pipeline.submit("http://b.example/y").await.unwrap();
        assert_ne!(first.id(), second.id());

        let a = first.wait().await.unwrap();
        let b = second.wait().await.unwrap();

        assert_eq!(a.digest, b.digest);
        assert_eq!(a.path.parent(), b.path.parent());
        assert_ne!(a.filename, b.filename);
        assert!(a.path.exists() && b.path.exists());
    }

    #[tokio::test]
    async fn test_invalid_url_creates_no_job() {
        let h = harness();

        let result = h.pipeline.submit("not a url").await;

        assert!(matches!(result, Err(SubmitError::InvalidUrl { .. })));
        assert!(h.fetcher.requests().await.is_empty());
        assert!(!h.pipeline.store().tmp_dir().exists());
    }
}
