use std::{
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::domain::PendingItem;

use super::{pending::PendingStore, seen::SeenSet, StoreError};

/// On-disk layout of the state file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredState {
    #[serde(default)]
    seen_messages: Vec<String>,
    #[serde(default)]
    pending_responses: Vec<PendingItem>,
}

/// JSON state file, loaded whole at start and replaced whole on save.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
    seen_capacity: usize,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>, seen_capacity: usize) -> Self {
        Self {
            path: path.into(),
            seen_capacity,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is a first run. Anything unreadable is an error, never discarded.
    pub fn load(&self) -> Result<PendingStore, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::info!(
                    target: "store",
                    path = %self.path.display(),
                    "no state file yet, starting empty"
                );
                return Ok(PendingStore::empty(self.seen_capacity));
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let stored: StoredState =
            serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            })?;

        let seen = SeenSet::from_ids(self.seen_capacity, stored.seen_messages);
        let store = PendingStore::new(seen, stored.pending_responses);
        tracing::debug!(
            target: "store",
            seen = store.seen().len(),
            pending = store.pending().len(),
            "state loaded"
        );
        Ok(store)
    }

    /// Writes to a sibling temp file, syncs, then renames over the old state.
    pub fn save(&self, store: &PendingStore) -> Result<(), StoreError> {
        let stored = StoredState {
            seen_messages: store.seen().iter().cloned().collect(),
            pending_responses: store.pending().to_vec(),
        };
        let payload = serde_json::to_vec_pretty(&stored).map_err(StoreError::Serialize)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };
        fs::create_dir_all(&dir).map_err(write_err)?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(write_err)?;
        tmp.write_all(&payload).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&self.path).map_err(|err| write_err(err.error))?;

        tracing::debug!(
            target: "store",
            path = %self.path.display(),
            seen = store.seen().len(),
            pending = store.pending().len(),
            "state saved"
        );
        Ok(())
    }
}
