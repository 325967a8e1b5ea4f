use std::{io, path::PathBuf};

use thiserror::Error;

mod file;
pub mod pending;
pub mod seen;

pub use file::StateFile;
pub use pending::{IngestOutcome, PendingStore};
pub use seen::SeenSet;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read state file {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("state file {} is corrupt, fix or move it before running again: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to write state file {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to serialize state: {0}")]
    Serialize(#[source] serde_json::Error),
}
