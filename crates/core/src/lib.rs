pub mod auth;
pub mod config;
pub mod fetch;
pub mod job;
pub mod metrics;
pub mod pipeline;
pub mod store;
pub mod testing;

pub use auth::{
    create_authenticator, AuthError, AuthRequest, Authenticator, BasicAuthenticator, Identity,
    NoneAuthenticator,
};
pub use config::{
    load_config, load_config_from_str, validate_config, AuthMethod, Config, ConfigError,
    FetchConfig, SanitizedConfig,
};
pub use fetch::{FetchError, Fetcher, HttpFetcher};
pub use job::{
    FsJobStore, JobFailure, JobId, JobReport, JobState, JobStore, JobStoreError, QueryError,
    Stage, StatusQuery,
};
pub use pipeline::{DownloadPipeline, JobHandle, PipelineError, SubmitError};
pub use store::{escape_url, ContentStore, StoreError, StoredFile, StoredObject};
