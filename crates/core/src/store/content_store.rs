//! Filesystem-backed content store.

use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::digest::{digest_bytes, is_valid_digest};
use super::error::StoreError;

/// Directory under the store root that holds in-flight download jobs.
pub const TMP_DIR: &str = "tmp";

/// URL prefix under which stored objects are served.
pub const PUBLIC_PREFIX: &str = "files";

#[cfg(unix)]
const DIR_MODE: u32 = 0o750;
#[cfg(unix)]
const FILE_MODE: u32 = 0o640;

/// Where an object ended up after a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub digest: String,
    pub filename: String,
    /// Absolute or root-relative location on disk.
    pub path: PathBuf,
    /// `files/<digest>/<filename>`, independent of the configured root.
    pub public_path: String,
}

/// An opened object ready to be streamed.
#[derive(Debug)]
pub struct StoredFile {
    pub file: File,
    pub len: u64,
}

/// Content-addressed store rooted at a directory.
#[derive(Debug, Clone)]
pub struct ContentStore {
    root: PathBuf,
}

impl ContentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Parent of every job work directory.
    pub fn tmp_dir(&self) -> PathBuf {
        self.root.join(TMP_DIR)
    }

    pub fn digest_dir(&self, digest: &str) -> PathBuf {
        self.root.join(digest)
    }

    pub fn object_path(&self, digest: &str, filename: &str) -> PathBuf {
        self.digest_dir(digest).join(filename)
    }

    pub fn public_path(digest: &str, filename: &str) -> String {
        format!("{}/{}/{}", PUBLIC_PREFIX, digest, filename)
    }

    /// Create the digest directory if it does not exist yet.
    pub async fn ensure_digest_dir(&self, digest: &str) -> Result<PathBuf, StoreError> {
        let dir = self.digest_dir(digest);
        create_dir_all(&dir)
            .await
            .map_err(|e| StoreError::DirectoryCreationFailed {
                path: dir.clone(),
                source: e,
            })?;
        Ok(dir)
    }

    /// Store an in-memory payload under a caller-supplied name.
    pub async fn put(&self, data: &[u8], filename: &str) -> Result<StoredObject, StoreError> {
        validate_filename(filename)?;

        let digest = digest_bytes(data);
        self.ensure_digest_dir(&digest).await?;

        let path = self.object_path(&digest, filename);
        write_file(&path, data)
            .await
            .map_err(|e| StoreError::WriteFailed {
                path: path.clone(),
                source: e,
            })?;

        debug!(digest = %digest, filename = %filename, bytes = data.len(), "Stored object");

        Ok(StoredObject {
            public_path: Self::public_path(&digest, filename),
            digest,
            filename: filename.to_string(),
            path,
        })
    }

    /// Move an already-hashed file into the store.
    ///
    /// `source` must be on the same filesystem as the root; the move is a
    /// single rename and replaces any existing object with the same name.
    pub async fn relocate(
        &self,
        source: &Path,
        digest: &str,
        filename: &str,
    ) -> Result<StoredObject, StoreError> {
        validate_filename(filename)?;
        self.ensure_digest_dir(digest).await?;

        let destination = self.object_path(digest, filename);
        fs::rename(source, &destination)
            .await
            .map_err(|e| StoreError::MoveFailed {
                from: source.to_path_buf(),
                destination: destination.clone(),
                error: e,
            })?;

        Ok(StoredObject {
            digest: digest.to_string(),
            filename: filename.to_string(),
            path: destination,
            public_path: Self::public_path(digest, filename),
        })
    }

    /// Open a stored object for reading.
    pub async fn get(&self, digest: &str, filename: &str) -> Result<StoredFile, StoreError> {
        if !is_valid_digest(digest) || validate_filename(filename).is_err() {
            return Err(StoreError::not_found(digest, filename));
        }

        let path = self.object_path(digest, filename);
        let file = match File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::not_found(digest, filename));
            }
            Err(e) => return Err(StoreError::Io(e)),
        };

        let meta = file.metadata().await?;
        if !meta.is_file() {
            return Err(StoreError::not_found(digest, filename));
        }

        Ok(StoredFile {
            file,
            len: meta.len(),
        })
    }
}

/// Reject names that would not stay a single path segment.
fn validate_filename(filename: &str) -> Result<(), StoreError> {
    if filename.is_empty()
        || filename == "."
        || filename == ".."
        || filename.contains(['/', '\\', '\0'])
    {
        return Err(StoreError::InvalidName(filename.to_string()));
    }
    Ok(())
}

/// `mkdir -p` with the store's directory permissions.
pub(crate) async fn create_dir_all(path: &Path) -> std::io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(DIR_MODE);
    builder.create(path).await
}

fn file_options() -> OpenOptions {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(FILE_MODE);
    options
}

async fn write_file(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = file_options().open(path).await?;
    file.write_all(data).await?;
    file.flush().await
}

/// Write `data` next to `path` and rename it into place, so readers see
/// either no file or the complete contents.
pub(crate) async fn write_file_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".partial");
    let tmp_path = path.with_file_name(tmp_name);

    let mut file = file_options().open(&tmp_path).await?;
    file.write_all(data).await?;
    file.sync_all().await?;
    drop(file);

    fs::rename(&tmp_path, path).await
}
