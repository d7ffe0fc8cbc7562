//! Error types shared by the store, the entry model and both shells.

use std::{io, path::PathBuf};
use thiserror::Error;

/// Failures while reading or writing the news file.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to move unreadable {} aside: {source}", path.display())]
    Backup { path: PathBuf, source: io::Error },

    #[error("failed to serialize news entries: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A draft that cannot become a news entry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EntryError {
    #[error("missing required field(s): {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
}

/// Errors from mutating the collection.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Invalid(#[from] EntryError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("there is no entry number {}", .0 + 1)]
    NoSuchEntry(usize),
}
