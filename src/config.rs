//! Where the manager keeps its files and which catalog endpoints it talks to.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Result};
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".library-manager";
/// Flat library file stored inside the application data directory.
const LIBRARY_FILE_NAME: &str = "library.txt";
/// Log file stored next to the library. The TUI owns the terminal, so log
/// records cannot go to stderr.
const LOG_FILE_NAME: &str = "library-manager.log";

const CATALOG_SEARCH_URL: &str = "https://openlibrary.org/search.json";
const CATALOG_BASE_URL: &str = "https://openlibrary.org";
const COVER_BASE_URL: &str = "https://covers.openlibrary.org";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Resolved settings for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub library_path: PathBuf,
    pub log_path: PathBuf,
    pub catalog_search_url: String,
    pub catalog_base_url: String,
    pub cover_base_url: String,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl AppConfig {
    /// Default layout under `~/.library-manager/`.
    pub fn resolve() -> Result<Self> {
        let base_dirs =
            BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
        Ok(Self::with_data_dir(base_dirs.home_dir().join(DATA_DIR_NAME)))
    }

    /// Same layout rooted at an explicit directory.
    pub fn with_data_dir(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref().to_path_buf();
        Self {
            library_path: data_dir.join(LIBRARY_FILE_NAME),
            log_path: data_dir.join(LOG_FILE_NAME),
            data_dir,
            catalog_search_url: CATALOG_SEARCH_URL.to_string(),
            catalog_base_url: CATALOG_BASE_URL.to_string(),
            cover_base_url: COVER_BASE_URL.to_string(),
            connect_timeout: CONNECT_TIMEOUT,
            read_timeout: READ_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_live_inside_data_dir() {
        let config = AppConfig::with_data_dir("/tmp/books");
        assert_eq!(config.library_path, PathBuf::from("/tmp/books/library.txt"));
        assert_eq!(config.log_path, PathBuf::from("/tmp/books/library-manager.log"));
        assert_eq!(config.catalog_search_url, "https://openlibrary.org/search.json");
    }
}
