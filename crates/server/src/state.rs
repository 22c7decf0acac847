use std::sync::Arc;

use depot_core::{
    create_authenticator, AuthError, Authenticator, Config, ContentStore, DownloadPipeline,
    Fetcher, FsJobStore, SanitizedConfig, StatusQuery,
};

/// Shared application state
pub struct AppState {
    config: Config,
    authenticator: Arc<dyn Authenticator>,
    pipeline: DownloadPipeline,
    status: StatusQuery,
}

impl AppState {
    pub fn new(
        config: Config,
        authenticator: Arc<dyn Authenticator>,
        pipeline: DownloadPipeline,
        status: StatusQuery,
    ) -> Self {
        Self {
            config,
            authenticator,
            pipeline,
            status,
        }
    }

    /// Wire the store, job store and pipeline described by `config` around
    /// the given fetcher.
    pub fn with_fetcher(config: Config, fetcher: Arc<dyn Fetcher>) -> Result<Self, AuthError> {
        let authenticator: Arc<dyn Authenticator> =
            Arc::from(create_authenticator(&config.auth)?);

        let store = ContentStore::new(config.storage.root.clone());
        let jobs = Arc::new(FsJobStore::new(store.tmp_dir()));
        let pipeline = DownloadPipeline::new(store, jobs.clone(), fetcher);
        let status = StatusQuery::new(jobs);

        Ok(Self::new(config, authenticator, pipeline, status))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn authenticator(&self) -> &dyn Authenticator {
        self.authenticator.as_ref()
    }

    pub fn pipeline(&self) -> &DownloadPipeline {
        &self.pipeline
    }

    pub fn store(&self) -> &ContentStore {
        self.pipeline.store()
    }

    pub fn status(&self) -> &StatusQuery {
        &self.status
    }
}
