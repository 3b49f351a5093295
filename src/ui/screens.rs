use crate::catalog::CatalogBook;
use crate::store::LibraryStore;

/// Menu sections in sidebar order.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum Section {
    ViewLibrary,
    AddBook,
    RemoveBook,
    Search,
    Statistics,
    Fetch,
}

impl Section {
    pub(crate) const ALL: [Section; 6] = [
        Section::ViewLibrary,
        Section::AddBook,
        Section::RemoveBook,
        Section::Search,
        Section::Statistics,
        Section::Fetch,
    ];

    pub(crate) fn title(self) -> &'static str {
        match self {
            Section::ViewLibrary => "View Library",
            Section::AddBook => "Add Book",
            Section::RemoveBook => "Remove Book",
            Section::Search => "Search",
            Section::Statistics => "Statistics",
            Section::Fetch => "Fetch from Open Library",
        }
    }

    pub(crate) fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|section| *section == self)
            .unwrap_or(0)
    }
}

/// Selection inside a list whose length lives elsewhere (usually the store).
#[derive(Default, Clone, Debug)]
pub(crate) struct ListCursor {
    pub(crate) selected: usize,
}

impl ListCursor {
    pub(crate) fn move_selection(&mut self, offset: isize, len: usize) {
        if len == 0 {
            self.selected = 0;
            return;
        }
        let max = len as isize - 1;
        self.selected = (self.selected as isize + offset).clamp(0, max) as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
    }

    /// Pull the selection back inside `0..len` after the list shrank.
    pub(crate) fn clamp(&mut self, len: usize) {
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }
}

/// How the "Remove Book" section picks its victim.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum RemoveMode {
    ByTitle,
    FromList,
}

pub(crate) struct RemoveScreen {
    pub(crate) mode: RemoveMode,
    pub(crate) title: String,
    pub(crate) cursor: ListCursor,
}

impl RemoveScreen {
    pub(crate) fn new() -> Self {
        Self {
            mode: RemoveMode::ByTitle,
            title: String::new(),
            cursor: ListCursor::default(),
        }
    }

    pub(crate) fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            RemoveMode::ByTitle => RemoveMode::FromList,
            RemoveMode::FromList => RemoveMode::ByTitle,
        };
    }
}

/// Live keyword search over the library. Results are store positions so a
/// result row can be toggled in place.
#[derive(Default)]
pub(crate) struct SearchScreen {
    pub(crate) query: String,
    pub(crate) results: Vec<usize>,
    pub(crate) cursor: ListCursor,
}

impl SearchScreen {
    /// Recompute the results. An empty keyword runs no search at all.
    pub(crate) fn refresh(&mut self, store: &LibraryStore) {
        if self.query.trim().is_empty() {
            self.results.clear();
        } else {
            self.results = store.search_positions(&self.query);
        }
        self.cursor.clamp(self.results.len());
    }

    pub(crate) fn has_keyword(&self) -> bool {
        !self.query.trim().is_empty()
    }

    pub(crate) fn current_position(&self) -> Option<usize> {
        self.results.get(self.cursor.selected).copied()
    }
}

/// Title lookup against the public catalog and its last answer.
#[derive(Default)]
pub(crate) struct FetchScreen {
    pub(crate) title: String,
    pub(crate) outcome: FetchOutcome,
}

#[derive(Default)]
pub(crate) enum FetchOutcome {
    #[default]
    Idle,
    Found(CatalogBook),
    NotFound,
    Failed(String),
}

impl FetchScreen {
    pub(crate) fn fetched(&self) -> Option<&CatalogBook> {
        match &self.outcome {
            FetchOutcome::Found(hit) => Some(hit),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Book;
    use tempfile::TempDir;

    #[test]
    fn cursor_stays_in_bounds() {
        let mut cursor = ListCursor::default();
        cursor.move_selection(-3, 4);
        assert_eq!(cursor.selected, 0);
        cursor.move_selection(10, 4);
        assert_eq!(cursor.selected, 3);
        cursor.clamp(2);
        assert_eq!(cursor.selected, 1);
        cursor.move_selection(1, 0);
        assert_eq!(cursor.selected, 0);
        cursor.select_last(5);
        assert_eq!(cursor.selected, 4);
        cursor.select_first();
        assert_eq!(cursor.selected, 0);
    }

    #[test]
    fn section_indices_follow_menu_order() {
        for (idx, section) in Section::ALL.iter().enumerate() {
            assert_eq!(section.index(), idx);
        }
    }

    #[test]
    fn search_screen_skips_blank_keywords() {
        let dir = TempDir::new().unwrap();
        let mut store = LibraryStore::open(dir.path().join("library.txt")).unwrap();
        store
            .add(Book::new("Dune", "Frank Herbert", 1965, "Sci-Fi", false, ""))
            .unwrap();
        store
            .add(Book::new("Emma", "Jane Austen", 1815, "Classic", false, ""))
            .unwrap();

        let mut screen = SearchScreen {
            query: "   ".to_string(),
            ..SearchScreen::default()
        };
        screen.refresh(&store);
        assert!(screen.results.is_empty());
        assert!(!screen.has_keyword());

        screen.query = "AUS".to_string();
        screen.refresh(&store);
        assert_eq!(screen.results, vec![1]);
        assert_eq!(screen.current_position(), Some(1));
    }
}
