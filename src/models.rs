//! Domain models that flow between the library store, the catalog client, and
//! the TUI. They stay plain data holders so the other layers can focus on
//! persistence and presentation.

use std::fmt;

/// One entry of the personal library. Field order mirrors the column order of
/// the persisted file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Book {
    /// Primary lookup key. Comparisons against it are case-insensitive.
    pub title: String,
    pub author: String,
    /// Publication year. Any integer is accepted, catalog misses store `0`.
    pub year: i64,
    pub genre: String,
    pub read: bool,
    /// Optional URL to a detail page. Empty when absent.
    pub link: String,
}

impl Book {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        year: i64,
        genre: impl Into<String>,
        read: bool,
        link: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            year,
            genre: genre.into(),
            read,
            link: link.into(),
        }
    }

    /// Compose a `Title by Author (Year)` string, omitting the author when it
    /// is blank. List rows and confirmation dialogs share this formatting.
    pub fn display_title(&self) -> String {
        if self.author.trim().is_empty() {
            format!("{} ({})", self.title, self.year)
        } else {
            format!("{} by {} ({})", self.title, self.author, self.year)
        }
    }

    pub fn has_link(&self) -> bool {
        !self.link.trim().is_empty()
    }

    /// Case-insensitive substring match against title or author. The needle
    /// must already be lowercased.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.author.to_lowercase().contains(needle)
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Aggregate counts over the whole library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Statistics {
    pub total: usize,
    pub read: usize,
}

impl Statistics {
    pub fn from_books(books: &[Book]) -> Self {
        Self {
            total: books.len(),
            read: books.iter().filter(|book| book.read).count(),
        }
    }

    /// Share of read books in percent, or `None` for an empty library.
    pub fn percent_read(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.read as f64 / self.total as f64 * 100.0)
        }
    }

    pub fn unread(&self) -> usize {
        self.total - self.read
    }
}
