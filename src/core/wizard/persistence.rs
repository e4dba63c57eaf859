//! Wizard snapshot persistence.
//!
//! A [`SnapshotStore`] is a keyed string store. The wizard serializes a
//! [`PersistedSnapshot`] into it after every state change and reads it back
//! once when it opens. Two backends are provided:
//!
//! - [`MemorySnapshotStore`]: process-local, used by tests and by hosts that
//!   only need resumption within one session
//! - [`FileSnapshotStore`]: one JSON file per key, survives restarts
//!
//! Two wizards opened with the same key race on writes; the last write wins.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, instrument, warn};

use super::types::WizardData;

/// Result type for snapshot store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by snapshot stores
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid snapshot key: {0:?}")]
    InvalidKey(String),

    #[error("Snapshot store lock poisoned")]
    Poisoned,
}

/// Keyed string storage for wizard snapshots.
pub trait SnapshotStore: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Delete the value under `key`. Missing keys are not an error.
    fn remove(&self, key: &str) -> StoreResult<()>;

    /// All keys currently holding a value, sorted.
    fn keys(&self) -> StoreResult<Vec<String>>;

    /// Backend name for logging
    fn name(&self) -> &str;
}

// ============================================================================
// Snapshot
// ============================================================================

/// Serialized wizard state, enough to resume an abandoned flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSnapshot<D> {
    pub data: D,
    pub current_step_index: usize,
    pub completed_step_ids: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

impl<D: WizardData> PersistedSnapshot<D> {
    pub fn new(data: D, current_step_index: usize, completed_step_ids: BTreeSet<String>) -> Self {
        Self {
            data,
            current_step_index,
            completed_step_ids,
            saved_at: Some(Utc::now()),
        }
    }

    pub fn to_json(&self) -> StoreResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(raw: &str) -> StoreResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Binds a store to the key of one wizard.
#[derive(Clone)]
pub struct SnapshotSlot {
    key: String,
    store: Arc<dyn SnapshotStore>,
}

impl SnapshotSlot {
    pub fn new(key: impl Into<String>, store: Arc<dyn SnapshotStore>) -> Self {
        Self {
            key: key.into(),
            store,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the stored snapshot. Unreadable or corrupt snapshots count as
    /// absent.
    #[instrument(skip(self), fields(key = %self.key, store = self.store.name()))]
    pub fn load<D: WizardData>(&self) -> Option<PersistedSnapshot<D>> {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Failed to read wizard snapshot, starting fresh");
                return None;
            }
        };

        match PersistedSnapshot::from_json(&raw) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!(error = %e, "Failed to parse wizard snapshot, starting fresh");
                None
            }
        }
    }

    /// Overwrite the stored snapshot. Failures are logged, never raised.
    pub fn save<D: WizardData>(&self, snapshot: &PersistedSnapshot<D>) {
        let result = snapshot
            .to_json()
            .and_then(|json| self.store.set(&self.key, &json));
        match result {
            Ok(()) => debug!(
                key = %self.key,
                step = snapshot.current_step_index,
                "Saved wizard snapshot"
            ),
            Err(e) => warn!(key = %self.key, error = %e, "Failed to save wizard snapshot"),
        }
    }

    pub fn clear(&self) {
        if let Err(e) = self.store.remove(&self.key) {
            warn!(key = %self.key, error = %e, "Failed to remove wizard snapshot");
        }
    }
}

// ============================================================================
// Memory Store
// ============================================================================

/// In-memory snapshot store. Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    fn name(&self) -> &str {
        "memory"
    }
}

// ============================================================================
// File Store
// ============================================================================

const SNAPSHOT_EXTENSION: &str = "json";

/// File-backed snapshot store, one `<key>.json` per key.
///
/// Keys are restricted to ASCII alphanumerics, `-`, `_` and `.` (not leading)
/// so they map onto file names directly.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> StoreResult<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.{SNAPSHOT_EXTENSION}")))
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;

        // Write beside the target so the rename stays on one filesystem
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut keys = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(SNAPSHOT_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                if !stem.starts_with('.') {
                    keys.push(stem.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn name(&self) -> &str {
        "file"
    }
}
