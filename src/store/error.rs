use std::path::PathBuf;

use thiserror::Error;

/// Result alias used by every store operation.
pub type StoreResult<T> = Result<T, StoreError>;

/// Failures surfaced by [`LibraryStore`](super::LibraryStore). None of them are
/// fatal to the session: the UI shows the message and keeps going.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read library file at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write library file at {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to create library directory at {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to back up library file to {path}: {source}")]
    Backup {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{0}")]
    InvalidBook(String),

    #[error("no book at position {index} (library holds {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Reasons a single stored line cannot be turned into a book.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    #[error("expected at least 5 fields, found {found}")]
    TooFewFields { found: usize },

    #[error("year {value:?} is not an integer")]
    InvalidYear { value: String },
}
