//! Content-addressed file store.
//!
//! Objects live at `<root>/<digest>/<filename>`, where `digest` is the
//! lowercase hex SHA-1 of the object's bytes. A digest directory may hold
//! several names for the same content; nothing here ever deletes an object.
//!
//! ```text
//! files/
//! ├── 3c01bdbb26f358bab27f267924aa2c9a03fcfdb8/
//! │   ├── report.pdf
//! │   └── http-__example.com_a.bin
//! └── tmp/
//!     └── <job id>/        # owned by the download pipeline
//! ```
//!
//! Directory creation is idempotent and there is no locking: concurrent
//! writes of the same name under one digest race and the last writer wins.

mod content_store;
mod digest;
mod error;
mod escape;

pub use content_store::{ContentStore, StoredFile, StoredObject, PUBLIC_PREFIX, TMP_DIR};
pub use digest::{digest_bytes, digest_file, is_valid_digest, DIGEST_HEX_LEN};
pub use error::StoreError;
pub use escape::escape_url;

pub(crate) use content_store::{create_dir_all, write_file_atomic};
