//! Flat-file persistence split across logical submodules.

mod error;
mod format;
mod library;

pub use error::{LineError, StoreError, StoreResult};
pub use format::{decode_line, encode_line, DELIMITER};
pub use library::{LibraryStore, LoadReport, SkippedLine};
