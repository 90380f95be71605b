//! SHA-256 content digesting.
//!
//! Small files are read whole; files at or above the caller's threshold are
//! digested through a memory mapping.

use memmap2::MmapOptions;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::path::Path;

/// Computes the hex-encoded SHA-256 digest of raw bytes.
#[must_use]
pub fn hash_bytes(data: &[u8]) -> String {
    to_hex(&Sha256::digest(data))
}

/// Computes the hex-encoded SHA-256 digest of a file's content.
///
/// Empty files digest to the hash of empty input. Files smaller than
/// `mmap_threshold` are read directly; larger files are memory-mapped.
///
/// # Errors
/// Returns an error if the file cannot be opened or fully read. No partial
/// digest is ever produced.
pub fn hash_file(path: &Path, mmap_threshold: u64) -> std::io::Result<String> {
    let file = File::open(path)?;
    let metadata = file.metadata()?;

    if metadata.len() == 0 {
        return Ok(hash_bytes(b""));
    }

    if metadata.len() < mmap_threshold {
        let content = std::fs::read(path)?;
        Ok(hash_bytes(&content))
    } else {
        let mmap = unsafe { MmapOptions::new().map(&file)? };
        Ok(hash_bytes(&mmap))
    }
}

/// Lowercase hex encoding of a digest.
fn to_hex(bytes: &[u8]) -> String {
    use std::fmt::Write;
    bytes.iter().fold(
        String::with_capacity(bytes.len() * 2),
        |mut out, byte| {
            let _ = write!(out, "{byte:02x}");
            out
        },
    )
}
