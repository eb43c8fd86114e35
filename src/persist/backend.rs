//! Durable backend seam - the asynchronous key/value service behind the cache.
//!
//! The store treats the backend as opaque: `read(None)` returns the full
//! persisted snapshot, `write` replaces it with one batched map. Two
//! implementations ship with the crate: an in-memory backend (tests, hosts
//! that bring their own persistence) and a single-file JSON backend.

use crate::error::BackendError;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Wire-form snapshot: one JSON value per persisted key.
pub type Snapshot = HashMap<String, Value>;

/// Asynchronous durable key/value service.
///
/// `keys: None` means "all keys". Neither call carries a timeout or retry;
/// callers decide what a failure means (hydration fails closed, flush logs
/// and drops).
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Read the requested keys, or the full snapshot when `keys` is None.
    async fn read(&self, keys: Option<&[String]>) -> Result<Snapshot, BackendError>;

    /// Replace the persisted entries named in `snapshot` in one batch.
    async fn write(&self, snapshot: Snapshot) -> Result<(), BackendError>;
}

// ================================================================================================
// IN-MEMORY BACKEND
// ================================================================================================

/// In-memory durable store stand-in.
///
/// Holds the snapshot in a lock-protected map and supports fault injection
/// so hydration and flush failure paths can be exercised.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    snapshot: RwLock<Snapshot>,
    fail_reads: RwLock<bool>,
    fail_writes: RwLock<bool>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with an existing snapshot.
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            snapshot: RwLock::new(snapshot),
            ..Self::default()
        }
    }

    /// Make every subsequent `read` fail with `Unavailable`.
    pub fn fail_reads(&self, fail: bool) {
        *self.fail_reads.write() = fail;
    }

    /// Make every subsequent `write` fail with `Unavailable`.
    pub fn fail_writes(&self, fail: bool) {
        *self.fail_writes.write() = fail;
    }

    /// Current persisted snapshot (test inspection).
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.read().clone()
    }
}

#[async_trait]
impl DurableStore for MemoryBackend {
    async fn read(&self, keys: Option<&[String]>) -> Result<Snapshot, BackendError> {
        if *self.fail_reads.read() {
            return Err(BackendError::Unavailable("injected read failure".into()));
        }
        let snapshot = self.snapshot.read();
        match keys {
            None => Ok(snapshot.clone()),
            Some(wanted) => Ok(wanted
                .iter()
                .filter_map(|k| snapshot.get(k).map(|v| (k.clone(), v.clone())))
                .collect()),
        }
    }

    async fn write(&self, snapshot: Snapshot) -> Result<(), BackendError> {
        if *self.fail_writes.read() {
            return Err(BackendError::Unavailable("injected write failure".into()));
        }
        self.snapshot.write().extend(snapshot);
        Ok(())
    }
}

// ================================================================================================
// JSON FILE BACKEND
// ================================================================================================

const MAGIC: &str = "STNG";
const VERSION: u32 = 1;

/// Versioned on-disk envelope around the snapshot.
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotFile {
    magic: String,
    version: u32,
    entries: Snapshot,
}

/// Single-file JSON durable store.
///
/// Writes go to a temp file first, are fsynced, then atomically renamed over
/// the live file, so a crash mid-write never leaves a torn snapshot behind.
#[derive(Debug)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    /// Open or create a file backend at the given path. The parent directory
    /// is created if needed; the file itself appears on the first write.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, BackendError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(Self { path })
    }

    fn load(&self) -> Result<Snapshot, BackendError> {
        if !self.path.exists() {
            // Nothing persisted yet: hydration proceeds on defaults alone.
            return Ok(Snapshot::new());
        }

        let raw = fs::read_to_string(&self.path)?;
        let file: SnapshotFile = serde_json::from_str(&raw)
            .map_err(|e| BackendError::Corrupt(format!("envelope parse failed: {}", e)))?;

        if file.magic != MAGIC {
            return Err(BackendError::Corrupt(format!(
                "bad magic '{}'",
                file.magic
            )));
        }
        if file.version != VERSION {
            return Err(BackendError::Corrupt(format!(
                "unsupported version {}",
                file.version
            )));
        }

        Ok(file.entries)
    }

    fn persist(&self, mut snapshot: Snapshot) -> Result<(), BackendError> {
        // Batched writes merge over whatever is already on disk, matching
        // the extend semantics of the in-memory backend.
        let mut entries = self.load().unwrap_or_default();
        entries.extend(snapshot.drain());

        let file = SnapshotFile {
            magic: MAGIC.to_string(),
            version: VERSION,
            entries,
        };
        let body = serde_json::to_string(&file)
            .map_err(|e| BackendError::Corrupt(format!("serialize failed: {}", e)))?;

        let tmp_path = self.path.with_extension("tmp");
        let mut tmp = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp_path)?;
        tmp.write_all(body.as_bytes())?;
        tmp.sync_all()?;
        drop(tmp);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

#[async_trait]
impl DurableStore for JsonFileBackend {
    async fn read(&self, keys: Option<&[String]>) -> Result<Snapshot, BackendError> {
        let snapshot = self.load()?;
        match keys {
            None => Ok(snapshot),
            Some(wanted) => Ok(wanted
                .iter()
                .filter_map(|k| snapshot.get(k).map(|v| (k.clone(), v.clone())))
                .collect()),
        }
    }

    async fn write(&self, snapshot: Snapshot) -> Result<(), BackendError> {
        self.persist(snapshot)
    }
}
