//! core::hash
//!
//! Streaming SHA-256 content digests.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use sha2::{Digest as _, Sha256};

use crate::core::types::Digest;

/// Digest the contents of the file at `path`.
///
/// Files larger than `progress_threshold` bytes emit an `info` event before
/// hashing starts so long waits are visible.
pub fn digest_file(path: &Path, progress_threshold: u64) -> io::Result<Digest> {
    let mut file = File::open(path)?;

    let size = file.metadata()?.len();
    if size > progress_threshold {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        tracing::info!("hashing {} ({} MB)", name, size / (1024 * 1024));
    }

    digest_reader(&mut file)
}

/// Digest everything readable from `reader`.
pub fn digest_reader<R: Read>(reader: &mut R) -> io::Result<Digest> {
    let mut hasher = Sha256::new();
    io::copy(reader, &mut hasher)?;
    Ok(Digest::from_sha256(&hasher.finalize()))
}
