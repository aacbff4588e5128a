use chrono::{DateTime, SecondsFormat, Utc};
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;
use tracing::warn;

/// Characters of the hex digest shown in duplicate groups.
pub const DISPLAY_HASH_LENGTH: usize = 16;

/// What the content identifier knows about one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentId {
    /// Lowercase hex BLAKE3 digest, or empty if the content could not be read.
    pub digest: String,
    pub size_bytes: u64,
    /// RFC 3339 UTC, or empty if metadata could not be read.
    pub modified_at: String,
}

/// Digest plus metadata for one file. Never fails: read errors leave the
/// digest empty and metadata errors leave size and timestamp at their zero
/// values, so the file still shows up in the tree.
pub fn identify(file: &Path, buffer_size: usize) -> ContentId {
    let (size_bytes, modified_at) = match fs::metadata(file) {
        Ok(metadata) => {
            let modified_at = metadata
                .modified()
                .map(|t| DateTime::<Utc>::from(t).to_rfc3339_opts(SecondsFormat::Secs, true))
                .unwrap_or_default();
            (metadata.len(), modified_at)
        }
        Err(e) => {
            warn!("Error reading metadata for '{}': {}", file.display(), e);
            (0, String::new())
        }
    };

    let digest = match hash_file(file, buffer_size) {
        Ok(digest) => digest,
        Err(e) => {
            warn!("Error hashing file '{}': {}", file.display(), e);
            String::new()
        }
    };

    ContentId {
        digest,
        size_bytes,
        modified_at,
    }
}

/// Stream the file through BLAKE3 in `buffer_size` chunks.
pub fn hash_file(file: &Path, buffer_size: usize) -> io::Result<String> {
    let mut f = File::open(file)?;
    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0u8; buffer_size.max(1)];
    loop {
        let bytes_read = match f.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..bytes_read]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}
