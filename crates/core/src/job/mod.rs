//! Download job bookkeeping.
//!
//! A job is identified by the nanosecond timestamp of its submission and owns
//! one work directory under the store's `tmp/` tree:
//!
//! ```text
//! files/tmp/<job id>/
//! ├── file     # payload while it is fetched and hashed
//! ├── log      # append-only progress lines
//! ├── done     # public path of the relocated object (success)
//! └── failed   # JSON `JobFailure` (terminal error)
//! ```
//!
//! The log and the terminal markers sit behind the [`JobStore`] trait so the
//! pipeline does not depend on where they are kept.

mod fs_store;
mod id;
mod paths;
mod query;
mod store;
mod types;

pub use fs_store::FsJobStore;
pub use id::JobId;
pub use paths::JobPaths;
pub use query::{JobReport, QueryError, StatusQuery};
pub use store::{JobStore, JobStoreError};
pub use types::{JobFailure, JobState, Stage};
