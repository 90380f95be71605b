//! Persistent manifest store.
//!
//! A keyed record store mapping file paths to their last accepted
//! observation (size, modification time, content digest). Persisted as
//! zstd-compressed bincode behind an exclusive advisory lock, with every
//! accepted mutation written through to disk atomically (temp file +
//! rename), so an external abort never leaves a half-written store.

use chrono::{DateTime, Utc};
use fs4::fs_std::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// On-disk format version.
const STORE_VERSION: u32 = 1;

/// A manifest record: the last accepted observation of one file.
///
/// The digest is a snapshot valid only for the exact `(size, modified)`
/// pair it was stored with, never a live property of the path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Unique key: the observed path, as supplied by the caller.
    pub path: PathBuf,
    /// File size in bytes at the time of the last accepted observation.
    pub size: u64,
    /// Modification time (UTC, full precision) at the last accepted
    /// observation.
    pub modified: DateTime<Utc>,
    /// Hex-encoded SHA-256 of the content at the last accepted observation.
    pub digest: String,
}

/// Errors from manifest store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Insert found an existing record for the key.
    #[error("a record already exists for {}", .0.display())]
    DuplicateKey(PathBuf),

    /// Update found no record for the key.
    #[error("no record to update for {}", .0.display())]
    RecordMissing(PathBuf),

    /// The store file could not be read or written.
    #[error("manifest store I/O: {0}")]
    Io(#[from] std::io::Error),

    /// The store file exists but does not decode.
    #[error("manifest store is corrupt: {0}")]
    Corrupt(String),
}

/// Serialized form of the store file.
#[derive(Debug, Serialize, Deserialize)]
struct Manifest {
    /// Format version, checked on load.
    version: u32,
    /// All records, keyed by path.
    records: HashMap<PathBuf, FileRecord>,
}

impl Manifest {
    /// An empty manifest at the current format version.
    fn new() -> Self {
        Self {
            version: STORE_VERSION,
            records: HashMap::new(),
        }
    }
}

/// A long-lived handle to the manifest store.
///
/// Opened once at process start and reused for every entry; the exclusive
/// advisory lock is held until the handle is dropped.
pub struct ManifestStore {
    /// Location of the store file.
    path: PathBuf,
    /// In-memory view of the store, kept in sync with disk by the
    /// write-through in the mutating operations.
    manifest: Manifest,
    /// Zstandard level used when persisting.
    compression_level: i32,
    /// Lock file handle; the exclusive lock lives as long as this does.
    lock: File,
}

impl ManifestStore {
    /// Opens the store at `path`, creating it (and parent directories) if
    /// absent. Creation is idempotent: opening an existing store loads it
    /// unchanged.
    ///
    /// # Errors
    /// Returns `StoreError::Io` if the file or lock cannot be accessed and
    /// `StoreError::Corrupt` if an existing file does not decode. Both are
    /// fatal to the run: nothing has been processed yet.
    pub fn open(path: &Path, compression_level: i32) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let lock = File::create(lock_path(path))?;
        lock.lock_exclusive()?;

        let manifest = if path.exists() && std::fs::metadata(path)?.len() > 0 {
            let data = std::fs::read(path)?;
            decode(&data)?
        } else {
            Manifest::new()
        };

        let store = Self {
            path: path.to_path_buf(),
            manifest,
            compression_level,
            lock,
        };
        if !path.exists() {
            store.persist()?;
        }
        Ok(store)
    }

    /// Point lookup by path.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&FileRecord> {
        self.manifest.records.get(path)
    }

    /// Inserts a new record, rejecting duplicates rather than silently
    /// overwriting. The store is written through before returning.
    ///
    /// # Errors
    /// `DuplicateKey` if a record for the path already exists; `Io` if the
    /// write-through fails.
    pub fn insert_unique(&mut self, record: FileRecord) -> Result<(), StoreError> {
        if self.manifest.records.contains_key(&record.path) {
            return Err(StoreError::DuplicateKey(record.path));
        }
        self.manifest.records.insert(record.path.clone(), record);
        self.persist()
    }

    /// Overwrites the stored fields of an existing record. The store is
    /// written through before returning.
    ///
    /// # Errors
    /// `RecordMissing` if the record vanished between lookup and write;
    /// `Io` if the write-through fails.
    pub fn update_existing(
        &mut self,
        path: &Path,
        size: u64,
        modified: DateTime<Utc>,
        digest: &str,
    ) -> Result<(), StoreError> {
        let record = self
            .manifest
            .records
            .get_mut(path)
            .ok_or_else(|| StoreError::RecordMissing(path.to_path_buf()))?;
        record.size = size;
        record.modified = modified;
        record.digest = digest.to_string();
        self.persist()
    }

    /// Number of records in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.manifest.records.len()
    }

    /// Whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.manifest.records.is_empty()
    }

    /// Writes the full store to disk atomically: serialize, compress, write
    /// to a temp file in the same directory, rename over the store file.
    fn persist(&self) -> Result<(), StoreError> {
        let data = encode(&self.manifest, self.compression_level)?;

        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&data)?;
        tmp.flush()?;
        tmp.persist(&self.path)
            .map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }
}

impl Drop for ManifestStore {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.lock);
    }
}

/// Sidecar lock file path for a store file.
fn lock_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".lock");
    PathBuf::from(name)
}

/// Bincode configuration for the store file. The decode allocation limit
/// bounds memory on corrupt input.
fn codec_config() -> impl bincode::config::Config {
    bincode::config::legacy().with_limit::<{ 100 * 1024 * 1024 }>()
}

/// Serializes and compresses a manifest.
fn encode(manifest: &Manifest, level: i32) -> Result<Vec<u8>, StoreError> {
    let raw = bincode::serde::encode_to_vec(manifest, codec_config())
        .map_err(|e| StoreError::Corrupt(e.to_string()))?;
    zstd::encode_all(raw.as_slice(), level).map_err(StoreError::Io)
}

/// Decompresses and deserializes a manifest, checking the format version.
fn decode(data: &[u8]) -> Result<Manifest, StoreError> {
    let raw = zstd::decode_all(data).map_err(|e| StoreError::Corrupt(e.to_string()))?;
    let (manifest, _): (Manifest, usize) = bincode::serde::decode_from_slice(&raw, codec_config())
        .map_err(|e| StoreError::Corrupt(e.to_string()))?;
    if manifest.version != STORE_VERSION {
        return Err(StoreError::Corrupt(format!(
            "unsupported store version {}",
            manifest.version
        )));
    }
    Ok(manifest)
}
