//! SHA-1 content digests.

use sha1::{Digest, Sha1};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, BufReader};

/// Length of a hex-encoded SHA-1 digest.
pub const DIGEST_HEX_LEN: usize = 40;

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Digest of an in-memory payload.
pub fn digest_bytes(data: &[u8]) -> String {
    format!("{:x}", Sha1::digest(data))
}

/// Stream a file through SHA-1 without loading it into memory.
pub async fn digest_file(path: &Path) -> std::io::Result<String> {
    let file = File::open(path).await?;
    let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);
    let mut buffer = vec![0u8; READ_BUFFER_SIZE];
    let mut hasher = Sha1::new();

    loop {
        let bytes_read = reader.read(&mut buffer).await?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Whether `s` looks like a digest this store produced.
pub fn is_valid_digest(s: &str) -> bool {
    s.len() == DIGEST_HEX_LEN && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
