//! Download pipeline.
//!
//! A submitted URL becomes a job that runs three stages, each in its own
//! task and strictly one after another:
//! - **Fetch**: stream the body into the job's work directory
//! - **Hash**: SHA-1 the payload
//! - **Relocate**: move the payload to `files/<digest>/<escaped url>` and
//!   write the `done` marker
//!
//! A stage that fails records the error in the job log, writes the `failed`
//! marker and stops the chain.

mod runner;
mod types;

pub use runner::DownloadPipeline;
pub use types::{JobHandle, PipelineError, SubmitError};
