//! The owned library store. One `LibraryStore` value holds the whole session:
//! the ordered list of books plus the path of the flat file mirroring it. Every
//! mutation rewrites the full file before returning, so nothing dirty outlives
//! a single interaction.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use tempfile::NamedTempFile;

use crate::models::{Book, Statistics};

use super::error::{LineError, StoreError, StoreResult};
use super::format::{decode_line, encode_line, offending_field};

/// A stored line that could not be decoded and was left out of the library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number in the file.
    pub line_number: usize,
    pub error: LineError,
}

/// Outcome of reading the library file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub books: Vec<Book>,
    pub skipped: Vec<SkippedLine>,
}

impl LoadReport {
    /// Decode file contents, skipping blank lines and setting malformed ones
    /// aside.
    pub fn parse(contents: &str) -> Self {
        let mut report = Self::default();
        for (idx, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match decode_line(line) {
                Ok(book) => report.books.push(book),
                Err(error) => report.skipped.push(SkippedLine {
                    line_number: idx + 1,
                    error,
                }),
            }
        }
        report
    }
}

/// In-memory library bound to its backing file.
#[derive(Debug)]
pub struct LibraryStore {
    path: PathBuf,
    books: Vec<Book>,
    skipped: Vec<SkippedLine>,
    /// Set while the file on disk still holds lines we skipped and has not
    /// been copied aside yet.
    needs_backup: bool,
}

impl LibraryStore {
    /// Load the library at `path`. A missing file is an empty library; any
    /// other read failure is returned.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let report = Self::load(&path)?;
        let needs_backup = !report.skipped.is_empty();
        Ok(Self {
            path,
            books: report.books,
            skipped: report.skipped,
            needs_backup,
        })
    }

    /// Read and decode the file without binding a store to it.
    pub fn load(path: &Path) -> StoreResult<LoadReport> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!("library file {} not found, starting empty", path.display());
                return Ok(LoadReport::default());
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let report = LoadReport::parse(&contents);
        for skipped in &report.skipped {
            warn!(
                "skipping malformed line {} in {}: {}",
                skipped.line_number,
                path.display(),
                skipped.error
            );
        }
        info!(
            "loaded {} book(s) from {}",
            report.books.len(),
            path.display()
        );
        Ok(report)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn get(&self, index: usize) -> Option<&Book> {
        self.books.get(index)
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Lines dropped during the initial load.
    pub fn skipped_lines(&self) -> &[SkippedLine] {
        &self.skipped
    }

    /// Where the untouched original goes before the first rewrite when the
    /// load skipped lines.
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".bak");
        self.path.with_file_name(name)
    }

    /// Rewrite the whole file from the in-memory list. The new contents land
    /// in a temporary sibling first and replace the file by rename.
    pub fn save(&mut self) -> StoreResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|source| StoreError::CreateDir {
            path: dir.clone(),
            source,
        })?;

        if self.needs_backup {
            self.backup_original()?;
        }

        let mut contents = String::new();
        for book in &self.books {
            contents.push_str(&encode_line(book));
            contents.push('\n');
        }

        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };
        let mut temp = NamedTempFile::new_in(&dir).map_err(write_err)?;
        temp.write_all(contents.as_bytes()).map_err(write_err)?;
        temp.flush().map_err(write_err)?;
        temp.persist(&self.path)
            .map_err(|err| write_err(err.error))?;

        debug!(
            "saved {} book(s) to {}",
            self.books.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Append a book and persist. The record stays in memory even when the
    /// save fails; the error is handed back for the caller to report.
    pub fn add(&mut self, book: Book) -> StoreResult<()> {
        validate(&book)?;
        info!("adding {:?}", book.title);
        self.books.push(book);
        self.save_logged()
    }

    /// Remove the first book whose title equals `title` ignoring case. Returns
    /// `Ok(None)` without touching the file when nothing matches.
    pub fn remove(&mut self, title: &str) -> StoreResult<Option<Book>> {
        let needle = title.to_lowercase();
        match self
            .books
            .iter()
            .position(|book| book.title.to_lowercase() == needle)
        {
            Some(index) => self.remove_at(index),
            None => {
                debug!("no book titled {title:?} to remove");
                Ok(None)
            }
        }
    }

    /// Remove the book at a list position and persist.
    pub fn remove_at(&mut self, index: usize) -> StoreResult<Option<Book>> {
        if index >= self.books.len() {
            return Ok(None);
        }
        let removed = self.books.remove(index);
        info!("removed {:?}", removed.title);
        self.save_logged()?;
        Ok(Some(removed))
    }

    /// Set the read flag of the book at `index`, saving only on change.
    pub fn set_read(&mut self, index: usize, read: bool) -> StoreResult<()> {
        let len = self.books.len();
        let book = self
            .books
            .get_mut(index)
            .ok_or(StoreError::IndexOutOfRange { index, len })?;
        if book.read == read {
            return Ok(());
        }
        book.read = read;
        self.save_logged()
    }

    /// Flip the read flag of the book at `index` and return the new value.
    pub fn toggle_read(&mut self, index: usize) -> StoreResult<bool> {
        let len = self.books.len();
        let current = self
            .books
            .get(index)
            .map(|book| book.read)
            .ok_or(StoreError::IndexOutOfRange { index, len })?;
        self.set_read(index, !current)?;
        Ok(!current)
    }

    /// Books whose title or author contains `keyword`, ignoring case, in
    /// library order. An empty keyword matches everything.
    pub fn search(&self, keyword: &str) -> Vec<Book> {
        self.search_positions(keyword)
            .into_iter()
            .map(|index| self.books[index].clone())
            .collect()
    }

    /// Positions of the books [`search`](Self::search) would return.
    pub fn search_positions(&self, keyword: &str) -> Vec<usize> {
        let needle = keyword.to_lowercase();
        self.books
            .iter()
            .enumerate()
            .filter(|(_, book)| book.matches_lowercase(&needle))
            .map(|(index, _)| index)
            .collect()
    }

    pub fn statistics(&self) -> Statistics {
        Statistics::from_books(&self.books)
    }

    fn save_logged(&mut self) -> StoreResult<()> {
        self.save().inspect_err(|err| warn!("{err}"))
    }

    fn backup_original(&mut self) -> StoreResult<()> {
        let backup = self.backup_path();
        match fs::copy(&self.path, &backup) {
            Ok(_) => {
                info!(
                    "kept original library with skipped lines at {}",
                    backup.display()
                );
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(StoreError::Backup {
                    path: backup,
                    source,
                })
            }
        }
        self.needs_backup = false;
        Ok(())
    }
}

fn validate(book: &Book) -> StoreResult<()> {
    if book.title.trim().is_empty() {
        return Err(StoreError::InvalidBook("Book title is required.".to_string()));
    }
    if let Some(field) = offending_field(book) {
        return Err(StoreError::InvalidBook(format!(
            "The {field} may not contain \" | \" or line breaks, nor end with \" |\"."
        )));
    }
    Ok(())
}
