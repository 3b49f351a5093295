use std::mem;

use anyhow::Result;
use crossterm::event::KeyCode;
use log::debug;
use open::that as open_link;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use crate::catalog::CatalogLookup;
use crate::models::Book;
use crate::store::{LibraryStore, StoreError};

use super::forms::{BookField, BookForm, ConfirmBookDelete};
use super::helpers::{book_lines, centered_rect, scroll_offset, surface_error};
use super::screens::{
    FetchOutcome, FetchScreen, ListCursor, RemoveMode, RemoveScreen, SearchScreen, Section,
};

/// Width of the menu column on the left.
const SIDEBAR_WIDTH: u16 = 30;
/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Rows used by one book in list views.
const BOOK_ENTRY_HEIGHT: u16 = 2;
/// Rows skipped by PageUp/PageDown.
const PAGE: isize = 5;

/// Content shown next to the menu, one variant per menu section.
enum Screen {
    Library(ListCursor),
    AddBook(BookForm),
    Remove(RemoveScreen),
    Search(SearchScreen),
    Statistics,
    Fetch(FetchScreen),
}

impl Screen {
    fn for_section(section: Section) -> Self {
        match section {
            Section::ViewLibrary => Screen::Library(ListCursor::default()),
            Section::AddBook => Screen::AddBook(BookForm::default()),
            Section::RemoveBook => Screen::Remove(RemoveScreen::new()),
            Section::Search => Screen::Search(SearchScreen::default()),
            Section::Statistics => Screen::Statistics,
            Section::Fetch => Screen::Fetch(FetchScreen::default()),
        }
    }

    fn section(&self) -> Section {
        match self {
            Screen::Library(_) => Section::ViewLibrary,
            Screen::AddBook(_) => Section::AddBook,
            Screen::Remove(_) => Section::RemoveBook,
            Screen::Search(_) => Section::Search,
            Screen::Statistics => Section::Statistics,
            Screen::Fetch(_) => Section::Fetch,
        }
    }
}

/// Which column receives keystrokes.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Focus {
    Menu,
    Content,
}

/// Modal overlays.
enum Mode {
    Normal,
    ConfirmDelete(ConfirmBookDelete),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum StatusKind {
    Info,
    Warning,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Warning => Style::default().fg(Color::Yellow),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state. The app owns the store and is its only writer.
pub struct App {
    store: LibraryStore,
    catalog: Box<dyn CatalogLookup>,
    screen: Screen,
    focus: Focus,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(store: LibraryStore, catalog: Box<dyn CatalogLookup>) -> Self {
        let mut app = Self {
            store,
            catalog,
            screen: Screen::for_section(Section::ViewLibrary),
            focus: Focus::Menu,
            mode: Mode::Normal,
            status: None,
        };
        let skipped = app.store.skipped_lines().len();
        if skipped > 0 {
            let message = format!(
                "Skipped {skipped} malformed line(s). The original file is kept as {} on the next save.",
                app.store.backup_path().display()
            );
            app.set_status(message, StatusKind::Warning);
        }
        app
    }

    pub fn store(&self) -> &LibraryStore {
        &self.store
    }

    /// Process one key press. Returns `true` when the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => match self.focus {
                Focus::Menu => self.handle_menu_key(code, &mut exit)?,
                Focus::Content => self.handle_content_key(code, &mut exit)?,
            },
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm)?,
        };

        Ok(exit)
    }

    fn handle_menu_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        let current = self.screen.section().index();
        match code {
            KeyCode::Char('q') => *exit = true,
            KeyCode::Up => {
                let previous = current.checked_sub(1).unwrap_or(Section::ALL.len() - 1);
                self.open_section(Section::ALL[previous]);
            }
            KeyCode::Down => {
                self.open_section(Section::ALL[(current + 1) % Section::ALL.len()]);
            }
            KeyCode::Enter | KeyCode::Right | KeyCode::Tab => {
                self.focus = Focus::Content;
            }
            KeyCode::Char(ch) => {
                if let Some(section) = ch
                    .to_digit(10)
                    .and_then(|digit| (digit as usize).checked_sub(1))
                    .and_then(|idx| Section::ALL.get(idx))
                {
                    self.open_section(*section);
                    self.focus = Focus::Content;
                }
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_content_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        if code == KeyCode::Esc {
            self.focus = Focus::Menu;
            self.clear_status();
            return Ok(Mode::Normal);
        }

        let mut screen = mem::replace(&mut self.screen, Screen::Statistics);
        let result = match &mut screen {
            Screen::Library(cursor) => self.handle_library_key(code, cursor, exit),
            Screen::AddBook(form) => self.handle_add_book_key(code, form),
            Screen::Remove(remove) => self.handle_remove_key(code, remove, exit),
            Screen::Search(search) => self.handle_search_key(code, search),
            Screen::Statistics => {
                if code == KeyCode::Char('q') {
                    *exit = true;
                }
                Ok(Mode::Normal)
            }
            Screen::Fetch(fetch) => self.handle_fetch_key(code, fetch),
        };
        self.screen = screen;
        result
    }

    fn handle_library_key(
        &mut self,
        code: KeyCode,
        cursor: &mut ListCursor,
        exit: &mut bool,
    ) -> Result<Mode> {
        let len = self.store.len();
        match code {
            KeyCode::Char('q') => *exit = true,
            KeyCode::Up => cursor.move_selection(-1, len),
            KeyCode::Down => cursor.move_selection(1, len),
            KeyCode::PageUp => cursor.move_selection(-PAGE, len),
            KeyCode::PageDown => cursor.move_selection(PAGE, len),
            KeyCode::Home => cursor.select_first(),
            KeyCode::End => cursor.select_last(len),
            KeyCode::Char(' ') => self.toggle_read(cursor.selected),
            KeyCode::Enter => self.open_book_link(cursor.selected),
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_add_book_key(&mut self, code: KeyCode, form: &mut BookForm) -> Result<Mode> {
        match code {
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match form.parse_inputs() {
                Ok(book) => match self.add_book(book) {
                    Ok(()) => *form = BookForm::default(),
                    Err(message) => form.error = Some(message),
                },
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_remove_key(
        &mut self,
        code: KeyCode,
        remove: &mut RemoveScreen,
        exit: &mut bool,
    ) -> Result<Mode> {
        if matches!(code, KeyCode::Tab | KeyCode::BackTab) {
            remove.toggle_mode();
            self.clear_status();
            return Ok(Mode::Normal);
        }

        match remove.mode {
            RemoveMode::ByTitle => match code {
                KeyCode::Backspace => {
                    remove.title.pop();
                }
                KeyCode::Enter => {
                    if self.remove_by_title(&remove.title) {
                        remove.title.clear();
                    }
                }
                KeyCode::Char(ch) if !ch.is_control() => remove.title.push(ch),
                _ => {}
            },
            RemoveMode::FromList => {
                let len = self.store.len();
                match code {
                    KeyCode::Char('q') => *exit = true,
                    KeyCode::Up => remove.cursor.move_selection(-1, len),
                    KeyCode::Down => remove.cursor.move_selection(1, len),
                    KeyCode::PageUp => remove.cursor.move_selection(-PAGE, len),
                    KeyCode::PageDown => remove.cursor.move_selection(PAGE, len),
                    KeyCode::Home => remove.cursor.select_first(),
                    KeyCode::End => remove.cursor.select_last(len),
                    KeyCode::Enter | KeyCode::Delete | KeyCode::Char('-') => {
                        let index = remove.cursor.selected;
                        if let Some(book) = self.store.get(index).cloned() {
                            self.clear_status();
                            return Ok(Mode::ConfirmDelete(ConfirmBookDelete { index, book }));
                        }
                        self.set_status("Your library is empty!", StatusKind::Warning);
                    }
                    _ => {}
                }
            }
        }
        Ok(Mode::Normal)
    }

    fn handle_search_key(&mut self, code: KeyCode, search: &mut SearchScreen) -> Result<Mode> {
        let len = search.results.len();
        match code {
            KeyCode::Up => search.cursor.move_selection(-1, len),
            KeyCode::Down => search.cursor.move_selection(1, len),
            KeyCode::PageUp => search.cursor.move_selection(-PAGE, len),
            KeyCode::PageDown => search.cursor.move_selection(PAGE, len),
            KeyCode::Home => search.cursor.select_first(),
            KeyCode::End => search.cursor.select_last(len),
            KeyCode::Enter => {
                if let Some(index) = search.current_position() {
                    self.open_book_link(index);
                }
            }
            KeyCode::Backspace => {
                search.query.pop();
                search.refresh(&self.store);
            }
            KeyCode::Char(ch) if !ch.is_control() => {
                search.query.push(ch);
                search.refresh(&self.store);
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_fetch_key(&mut self, code: KeyCode, fetch: &mut FetchScreen) -> Result<Mode> {
        match code {
            KeyCode::Backspace => {
                fetch.title.pop();
            }
            KeyCode::Enter => self.fetch_from_catalog(fetch),
            KeyCode::Char(ch) if !ch.is_control() => fetch.title.push(ch),
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmBookDelete) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                if self.store.get(confirm.index) != Some(&confirm.book) {
                    self.set_status("Library changed; deletion cancelled.", StatusKind::Warning);
                    return Ok(Mode::Normal);
                }
                match self.store.remove_at(confirm.index) {
                    Ok(_) => {
                        self.set_status(format!("Removed: {}", confirm.book.title), StatusKind::Info);
                    }
                    Err(err) => self.report_save_error(&err),
                }
                let len = self.store.len();
                if let Screen::Remove(remove) = &mut self.screen {
                    remove.cursor.clamp(len);
                }
                Ok(Mode::Normal)
            }
            _ => Ok(Mode::ConfirmDelete(confirm)),
        }
    }

    /// Ctrl+T: flip the read flag of the highlighted search result.
    pub(crate) fn handle_ctrl_t(&mut self) -> Result<()> {
        if !self.accepts_shortcuts() {
            return Ok(());
        }
        let target = match &self.screen {
            Screen::Search(search) => search.current_position(),
            Screen::Library(cursor) => Some(cursor.selected),
            _ => None,
        };
        match target {
            Some(index) => self.toggle_read(index),
            None => self.set_status("No book selected.", StatusKind::Warning),
        }
        Ok(())
    }

    /// Ctrl+A: add the book fetched from the catalog.
    pub(crate) fn handle_ctrl_a(&mut self) -> Result<()> {
        if !self.accepts_shortcuts() {
            return Ok(());
        }
        let fetched = match &self.screen {
            Screen::Fetch(fetch) => fetch.fetched().map(|hit| hit.book.clone()),
            _ => return Ok(()),
        };
        match fetched {
            Some(book) => {
                if self.add_book(book).is_ok() {
                    if let Screen::Fetch(fetch) = &mut self.screen {
                        fetch.outcome = FetchOutcome::Idle;
                    }
                }
            }
            None => self.set_status("Fetch a book first.", StatusKind::Warning),
        }
        Ok(())
    }

    /// Ctrl+O: open the fetched book's cover image in the browser.
    pub(crate) fn handle_ctrl_o(&mut self) -> Result<()> {
        if !self.accepts_shortcuts() {
            return Ok(());
        }
        let cover = match &self.screen {
            Screen::Fetch(fetch) => fetch.fetched().and_then(|hit| hit.cover_url.clone()),
            _ => return Ok(()),
        };
        match cover {
            Some(url) => self.open_url(&url, "cover image"),
            None => self.set_status("No cover image available.", StatusKind::Warning),
        }
        Ok(())
    }

    fn accepts_shortcuts(&self) -> bool {
        self.focus == Focus::Content && matches!(self.mode, Mode::Normal)
    }

    fn open_section(&mut self, section: Section) {
        if self.screen.section() == section {
            return;
        }
        debug!("opening section {:?}", section);
        self.clear_status();
        self.screen = Screen::for_section(section);
    }

    /// Store a new book and report the outcome. `Err` carries the message for
    /// inline display when the book was rejected; a failed save still counts as
    /// added because the record stays in memory.
    fn add_book(&mut self, book: Book) -> Result<(), String> {
        let title = book.title.clone();
        match self.store.add(book) {
            Ok(()) => {
                self.set_status(
                    format!("Book '{title}' added successfully! Switch to 'View Library' to see it."),
                    StatusKind::Info,
                );
                Ok(())
            }
            Err(StoreError::InvalidBook(message)) => {
                self.set_status(message.clone(), StatusKind::Error);
                Err(message)
            }
            Err(err) => {
                self.report_save_error(&err);
                Ok(())
            }
        }
    }

    /// Returns `true` when a book was removed.
    fn remove_by_title(&mut self, title: &str) -> bool {
        if title.trim().is_empty() {
            self.set_status("Enter a book title to remove.", StatusKind::Warning);
            return false;
        }
        match self.store.remove(title) {
            Ok(Some(book)) => {
                self.set_status(
                    format!("Book '{}' removed successfully.", book.title),
                    StatusKind::Info,
                );
                true
            }
            Ok(None) => {
                self.set_status("Book not found.", StatusKind::Warning);
                false
            }
            Err(err) => {
                self.report_save_error(&err);
                true
            }
        }
    }

    fn toggle_read(&mut self, index: usize) {
        let Some(title) = self.store.get(index).map(|book| book.title.clone()) else {
            self.set_status("No book selected.", StatusKind::Warning);
            return;
        };
        match self.store.toggle_read(index) {
            Ok(true) => self.set_status(format!("Marked '{title}' as read."), StatusKind::Info),
            Ok(false) => self.set_status(format!("Marked '{title}' as unread."), StatusKind::Info),
            Err(err) => self.report_save_error(&err),
        }
    }

    fn fetch_from_catalog(&mut self, fetch: &mut FetchScreen) {
        let title = fetch.title.trim().to_string();
        if title.is_empty() {
            self.set_status("Enter a book title to search.", StatusKind::Warning);
            return;
        }
        match self.catalog.lookup(&title) {
            Ok(Some(hit)) => {
                self.set_status(
                    format!("Found '{}'. Press Ctrl+A to add it.", hit.book.title),
                    StatusKind::Info,
                );
                fetch.outcome = FetchOutcome::Found(hit);
            }
            Ok(None) => {
                fetch.outcome = FetchOutcome::NotFound;
                self.set_status("No results found. Try a different title.", StatusKind::Warning);
            }
            Err(err) => {
                let message = surface_error(&err);
                self.set_status(format!("Catalog lookup failed: {message}"), StatusKind::Error);
                fetch.outcome = FetchOutcome::Failed(message);
            }
        }
    }

    fn open_book_link(&mut self, index: usize) {
        let Some(book) = self.store.get(index).cloned() else {
            return;
        };
        if !book.has_link() {
            self.set_status("This book does not have a link.", StatusKind::Warning);
            return;
        }
        self.open_url(book.link.trim(), &book.title);
    }

    fn open_url(&mut self, url: &str, label: &str) {
        if let Err(err) = open_link(url) {
            self.set_status(format!("Failed to open link: {err}"), StatusKind::Error);
        } else {
            self.set_status(format!("Opened {label}."), StatusKind::Info);
        }
    }

    fn report_save_error(&mut self, err: &StoreError) {
        self.set_status(format!("Error saving library: {err}"), StatusKind::Error);
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (body_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
            .split(body_area);

        self.draw_menu(frame, columns[0]);
        self.draw_content(frame, columns[1]);

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        if let Mode::ConfirmDelete(confirm) = &self.mode {
            self.draw_confirm_delete(frame, area, confirm);
        }
    }

    fn border_style(&self, focus: Focus) -> Style {
        if self.focus == focus {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        }
    }

    fn draw_menu(&self, frame: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = Section::ALL
            .iter()
            .enumerate()
            .map(|(idx, section)| ListItem::new(format!("{}. {}", idx + 1, section.title())))
            .collect();
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Library Manager")
                    .border_style(self.border_style(Focus::Menu)),
            )
            .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED))
            .highlight_symbol("▶ ");
        let mut state = ListState::default();
        state.select(Some(self.screen.section().index()));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_content(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(self.screen.section().title())
            .border_style(self.border_style(Focus::Content));
        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.height == 0 || inner.width == 0 {
            return;
        }

        match &self.screen {
            Screen::Library(cursor) => self.draw_library(frame, inner, cursor),
            Screen::AddBook(form) => self.draw_book_form(frame, inner, form),
            Screen::Remove(remove) => self.draw_remove(frame, inner, remove),
            Screen::Search(search) => self.draw_search(frame, inner, search),
            Screen::Statistics => self.draw_statistics(frame, inner),
            Screen::Fetch(fetch) => self.draw_fetch(frame, inner, fetch),
        }
    }

    fn draw_library(&self, frame: &mut Frame, area: Rect, cursor: &ListCursor) {
        if self.store.is_empty() {
            let message = Paragraph::new("Library is empty.").alignment(Alignment::Center);
            frame.render_widget(message, area);
            return;
        }
        let books: Vec<&Book> = self.store.books().iter().collect();
        self.render_book_list(frame, area, &books, cursor.selected);
    }

    fn render_book_list(&self, frame: &mut Frame, area: Rect, books: &[&Book], selected: usize) {
        let highlight = self.focus == Focus::Content;
        let offset = scroll_offset(selected, BOOK_ENTRY_HEIGHT, area.height);
        let lines: Vec<Line> = books
            .iter()
            .enumerate()
            .skip(offset)
            .flat_map(|(idx, book)| book_lines(book, highlight && idx == selected))
            .collect();
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn draw_book_form(&self, frame: &mut Frame, area: Rect, form: &BookForm) {
        let mut lines: Vec<Line> = BookField::ALL
            .iter()
            .map(|field| form.build_line(*field))
            .collect();
        lines.push(Line::from(""));
        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        }
        if form.active == BookField::Read {
            lines.push(Line::from(Span::styled(
                "Space toggles, y/n answers.",
                Style::default().fg(Color::DarkGray),
            )));
        }
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), area);

        if self.focus == Focus::Content && form.active != BookField::Read {
            let row = BookField::ALL
                .iter()
                .position(|field| *field == form.active)
                .unwrap_or(0) as u16;
            let prefix = form.active.label().chars().count() + 2;
            let cursor_x = area.x + (prefix + form.value_len(form.active)) as u16;
            if row < area.height && cursor_x < area.x + area.width {
                frame.set_cursor_position((cursor_x, area.y + row));
            }
        }
    }

    fn draw_remove(&self, frame: &mut Frame, area: Rect, remove: &RemoveScreen) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(0)])
            .split(area);

        let tab_style = |active: bool| {
            if active {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            }
        };
        let tabs = Line::from(vec![
            Span::styled(
                "Search for book to remove",
                tab_style(remove.mode == RemoveMode::ByTitle),
            ),
            Span::raw("   |   "),
            Span::styled(
                "View all books with delete options",
                tab_style(remove.mode == RemoveMode::FromList),
            ),
        ]);
        frame.render_widget(Paragraph::new(tabs), chunks[0]);

        match remove.mode {
            RemoveMode::ByTitle => {
                let prompt = "Enter book title to remove: ";
                let input = Paragraph::new(format!("{prompt}{}", remove.title));
                frame.render_widget(input, chunks[1]);
                if self.focus == Focus::Content && matches!(self.mode, Mode::Normal) {
                    let cursor_x = chunks[1].x
                        + prompt.chars().count() as u16
                        + remove.title.chars().count() as u16;
                    frame.set_cursor_position((cursor_x, chunks[1].y));
                }
            }
            RemoveMode::FromList => {
                if self.store.is_empty() {
                    let message = Paragraph::new("Your library is empty!")
                        .alignment(Alignment::Center);
                    frame.render_widget(message, chunks[1]);
                    return;
                }
                let offset = scroll_offset(remove.cursor.selected, 1, chunks[1].height);
                let lines: Vec<Line> = self
                    .store
                    .books()
                    .iter()
                    .enumerate()
                    .skip(offset)
                    .map(|(idx, book)| {
                        if idx == remove.cursor.selected {
                            Line::from(Span::styled(
                                format!("▶ {}", book.display_title()),
                                Style::default()
                                    .fg(Color::Yellow)
                                    .add_modifier(Modifier::BOLD),
                            ))
                        } else {
                            Line::from(format!("  {}", book.display_title()))
                        }
                    })
                    .collect();
                frame.render_widget(Paragraph::new(lines), chunks[1]);
            }
        }
    }

    fn draw_search(&self, frame: &mut Frame, area: Rect, search: &SearchScreen) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(0)])
            .split(area);

        let prompt = "Enter title or author: ";
        let summary = if !search.has_keyword() {
            Span::styled(
                "Enter a search term to begin",
                Style::default().fg(Color::DarkGray),
            )
        } else if search.results.is_empty() {
            Span::styled(
                "No matching books found.",
                Style::default().fg(Color::Yellow),
            )
        } else {
            Span::styled(
                format!("Found {} result(s).", search.results.len()),
                Style::default().fg(Color::Green),
            )
        };
        let header = Paragraph::new(vec![
            Line::from(format!("{prompt}{}", search.query)),
            Line::from(summary),
        ]);
        frame.render_widget(header, chunks[0]);
        if self.focus == Focus::Content {
            let cursor_x =
                chunks[0].x + prompt.chars().count() as u16 + search.query.chars().count() as u16;
            frame.set_cursor_position((cursor_x, chunks[0].y));
        }

        let books: Vec<&Book> = search
            .results
            .iter()
            .filter_map(|index| self.store.get(*index))
            .collect();
        if !books.is_empty() {
            self.render_book_list(frame, chunks[1], &books, search.cursor.selected);
        }
    }

    fn draw_statistics(&self, frame: &mut Frame, area: Rect) {
        let stats = self.store.statistics();
        let lines = match stats.percent_read() {
            None => vec![Line::from(Span::styled(
                "No books in the library.",
                Style::default().fg(Color::Yellow),
            ))],
            Some(percent) => vec![
                Line::from(vec![
                    Span::styled("Total books: ", Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw(stats.total.to_string()),
                ]),
                Line::from(vec![
                    Span::styled("Books read: ", Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw(format!("{} ({percent:.2}%)", stats.read)),
                ]),
                Line::from(vec![
                    Span::styled("Still to read: ", Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw(stats.unread().to_string()),
                ]),
            ],
        };
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn draw_fetch(&self, frame: &mut Frame, area: Rect, fetch: &FetchScreen) {
        let prompt = "Enter Book Title: ";
        let label = Style::default().add_modifier(Modifier::BOLD);
        let mut lines = vec![Line::from(format!("{prompt}{}", fetch.title)), Line::from("")];

        match &fetch.outcome {
            FetchOutcome::Idle => {}
            FetchOutcome::NotFound => lines.push(Line::from(Span::styled(
                "No results found. Try a different title.",
                Style::default().fg(Color::Yellow),
            ))),
            FetchOutcome::Failed(message) => lines.push(Line::from(Span::styled(
                format!("Catalog lookup failed: {message}"),
                Style::default().fg(Color::Red),
            ))),
            FetchOutcome::Found(hit) => {
                let book = &hit.book;
                lines.push(Line::from(Span::styled(
                    book.title.clone(),
                    label.fg(Color::Cyan),
                )));
                lines.push(Line::from(vec![
                    Span::styled("Author: ", label),
                    Span::raw(book.author.clone()),
                ]));
                lines.push(Line::from(vec![
                    Span::styled("Year: ", label),
                    Span::raw(book.year.to_string()),
                ]));
                if book.has_link() {
                    lines.push(Line::from(vec![
                        Span::styled("Link: ", label),
                        Span::raw(book.link.clone()),
                    ]));
                }
                if let Some(cover) = &hit.cover_url {
                    lines.push(Line::from(vec![
                        Span::styled("Cover: ", label),
                        Span::raw(cover.clone()),
                    ]));
                }
            }
        }

        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
        if self.focus == Focus::Content {
            let cursor_x =
                area.x + prompt.chars().count() as u16 + fetch.title.chars().count() as u16;
            frame.set_cursor_position((cursor_x, area.y));
        }
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmBookDelete) {
        let popup = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup);
        let block = Block::default()
            .title("Delete Book")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red));
        let lines = vec![
            Line::from(format!("Delete {}?", confirm.book.display_title())),
            Line::from(""),
            Line::from(vec![
                Span::styled("[y]", Style::default().fg(Color::Cyan)),
                Span::raw(" Delete   "),
                Span::styled("[n]", Style::default().fg(Color::Cyan)),
                Span::raw(" Cancel"),
            ]),
        ];
        let paragraph = Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let hints: &[(&str, &str)] = match (&self.mode, self.focus, &self.screen) {
            (Mode::ConfirmDelete(_), _, _) => &[("[y]", "Delete"), ("[n]", "Cancel")],
            (_, Focus::Menu, _) => &[
                ("[↑↓]", "Menu"),
                ("[Enter]", "Open"),
                ("[1-6]", "Jump"),
                ("[q]", "Quit"),
            ],
            (_, Focus::Content, Screen::Library(_)) => &[
                ("[↑↓]", "Select"),
                ("[Space]", "Toggle Read"),
                ("[Enter]", "Open Link"),
                ("[Esc]", "Menu"),
                ("[q]", "Quit"),
            ],
            (_, Focus::Content, Screen::AddBook(_)) => &[
                ("[Tab]", "Next Field"),
                ("[Enter]", "Add Book"),
                ("[Esc]", "Menu"),
            ],
            (_, Focus::Content, Screen::Remove(remove)) => match remove.mode {
                RemoveMode::ByTitle => &[
                    ("[Tab]", "Switch Mode"),
                    ("[Enter]", "Remove"),
                    ("[Esc]", "Menu"),
                ],
                RemoveMode::FromList => &[
                    ("[↑↓]", "Select"),
                    ("[-]", "Delete"),
                    ("[Tab]", "Switch Mode"),
                    ("[Esc]", "Menu"),
                ],
            },
            (_, Focus::Content, Screen::Search(_)) => &[
                ("[↑↓]", "Select"),
                ("[Ctrl+T]", "Toggle Read"),
                ("[Enter]", "Open Link"),
                ("[Esc]", "Menu"),
            ],
            (_, Focus::Content, Screen::Statistics) => &[("[Esc]", "Menu"), ("[q]", "Quit")],
            (_, Focus::Content, Screen::Fetch(_)) => &[
                ("[Enter]", "Search"),
                ("[Ctrl+A]", "Add This Book"),
                ("[Ctrl+O]", "Open Cover"),
                ("[Esc]", "Menu"),
            ],
        };

        let mut spans = Vec::with_capacity(hints.len() * 2);
        for (idx, (key, action)) in hints.iter().enumerate() {
            spans.push(Span::styled(key.to_string(), key_style));
            let gap = if idx + 1 == hints.len() { "" } else { "   " };
            spans.push(Span::raw(format!(" {action}{gap}")));
        }
        Line::from(spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogBook;
    use anyhow::anyhow;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::TempDir;

    /// Canned catalog answering every title with the same result.
    struct CannedCatalog {
        answer: Option<CatalogBook>,
        fail: bool,
        requests: Rc<RefCell<Vec<String>>>,
    }

    impl CatalogLookup for CannedCatalog {
        fn lookup(&self, title: &str) -> Result<Option<CatalogBook>> {
            self.requests.borrow_mut().push(title.to_string());
            if self.fail {
                return Err(anyhow!("connection refused").context("catalog request failed"));
            }
            Ok(self.answer.clone())
        }
    }

    fn dune_hit() -> CatalogBook {
        CatalogBook {
            book: Book::new(
                "Dune",
                "Frank Herbert",
                1965,
                "Unknown",
                false,
                "https://openlibrary.org/works/OL1W",
            ),
            cover_url: Some("https://covers.openlibrary.org/b/id/7-L.jpg".to_string()),
        }
    }

    fn app_with(dir: &TempDir, answer: Option<CatalogBook>, fail: bool) -> (App, Rc<RefCell<Vec<String>>>) {
        let store = LibraryStore::open(dir.path().join("library.txt")).unwrap();
        let requests = Rc::new(RefCell::new(Vec::new()));
        let catalog = CannedCatalog {
            answer,
            fail,
            requests: Rc::clone(&requests),
        };
        (App::new(store, Box::new(catalog)), requests)
    }

    fn press(app: &mut App, codes: &[KeyCode]) {
        for code in codes {
            app.handle_key(*code).unwrap();
        }
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch)).unwrap();
        }
    }

    fn status_text(app: &App) -> &str {
        app.status.as_ref().map(|s| s.text.as_str()).unwrap_or("")
    }

    fn add_via_form(app: &mut App, title: &str, author: &str, year: &str) {
        press(app, &[KeyCode::Esc, KeyCode::Char('2')]);
        type_text(app, title);
        press(app, &[KeyCode::Tab]);
        type_text(app, author);
        press(app, &[KeyCode::Tab]);
        type_text(app, year);
        press(app, &[KeyCode::Enter]);
    }

    #[test]
    fn quits_from_menu() {
        let dir = TempDir::new().unwrap();
        let (mut app, _) = app_with(&dir, None, false);
        assert!(!app.handle_key(KeyCode::Down).unwrap());
        assert!(app.handle_key(KeyCode::Char('q')).unwrap());
    }

    #[test]
    fn escape_never_quits() {
        let dir = TempDir::new().unwrap();
        let (mut app, _) = app_with(&dir, None, false);
        press(&mut app, &[KeyCode::Char('4')]);
        assert!(!app.handle_key(KeyCode::Esc).unwrap());
        assert_eq!(app.focus, Focus::Menu);
        assert!(!app.handle_key(KeyCode::Esc).unwrap());
    }

    #[test]
    fn remove_by_title_matches_untrimmed_input() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("library.txt"),
            " Dune  | Herbert | 1965 | Sci-Fi | False | \nEmma | Austen | 1815 | Classic | False | \n",
        )
        .unwrap();
        let (mut app, _) = app_with(&dir, None, false);

        press(&mut app, &[KeyCode::Char('3')]);
        type_text(&mut app, "   ");
        press(&mut app, &[KeyCode::Enter]);
        assert_eq!(status_text(&app), "Enter a book title to remove.");

        press(&mut app, &[KeyCode::Backspace, KeyCode::Backspace, KeyCode::Backspace]);
        type_text(&mut app, " dune ");
        press(&mut app, &[KeyCode::Enter]);
        assert_eq!(status_text(&app), "Book ' Dune ' removed successfully.");
        assert_eq!(app.store().books()[0].title, "Emma");
    }

    #[test]
    fn menu_wraps_and_digits_jump() {
        let dir = TempDir::new().unwrap();
        let (mut app, _) = app_with(&dir, None, false);
        press(&mut app, &[KeyCode::Up]);
        assert_eq!(app.screen.section(), Section::Fetch);
        press(&mut app, &[KeyCode::Down]);
        assert_eq!(app.screen.section(), Section::ViewLibrary);
        press(&mut app, &[KeyCode::Char('5')]);
        assert_eq!(app.screen.section(), Section::Statistics);
        assert_eq!(app.focus, Focus::Content);
    }

    #[test]
    fn add_form_persists_book() {
        let dir = TempDir::new().unwrap();
        let (mut app, _) = app_with(&dir, None, false);
        add_via_form(&mut app, "Dune", "Frank Herbert", "1965");

        assert_eq!(app.store().len(), 1);
        assert!(status_text(&app).contains("added successfully"));
        let reopened = LibraryStore::open(dir.path().join("library.txt")).unwrap();
        assert_eq!(
            reopened.books(),
            &[Book::new("Dune", "Frank Herbert", 1965, "", false, "")]
        );
        match &app.screen {
            Screen::AddBook(form) => assert!(form.title.is_empty()),
            _ => panic!("expected add form"),
        }
    }

    #[test]
    fn add_form_keeps_input_on_validation_error() {
        let dir = TempDir::new().unwrap();
        let (mut app, _) = app_with(&dir, None, false);
        add_via_form(&mut app, "Dune", "Herbert", "");

        assert!(app.store().is_empty());
        assert_eq!(status_text(&app), "Publication year is required.");
        match &app.screen {
            Screen::AddBook(form) => assert_eq!(form.title, "Dune"),
            _ => panic!("expected add form"),
        }
    }

    #[test]
    fn remove_by_title_reports_missing_books() {
        let dir = TempDir::new().unwrap();
        let (mut app, _) = app_with(&dir, None, false);
        add_via_form(&mut app, "Dune", "Herbert", "1965");

        press(&mut app, &[KeyCode::Esc, KeyCode::Char('3')]);
        type_text(&mut app, "Emma");
        press(&mut app, &[KeyCode::Enter]);
        assert_eq!(status_text(&app), "Book not found.");
        assert_eq!(app.store().len(), 1);

        for _ in 0.."Emma".len() {
            press(&mut app, &[KeyCode::Backspace]);
        }
        type_text(&mut app, "dUNE");
        press(&mut app, &[KeyCode::Enter]);
        assert_eq!(status_text(&app), "Book 'Dune' removed successfully.");
        assert!(app.store().is_empty());
    }

    #[test]
    fn remove_from_list_asks_for_confirmation() {
        let dir = TempDir::new().unwrap();
        let (mut app, _) = app_with(&dir, None, false);
        add_via_form(&mut app, "Dune", "Herbert", "1965");
        add_via_form(&mut app, "Emma", "Austen", "1815");

        press(&mut app, &[KeyCode::Esc, KeyCode::Char('3'), KeyCode::Tab, KeyCode::Down]);
        press(&mut app, &[KeyCode::Char('-')]);
        assert!(matches!(app.mode, Mode::ConfirmDelete(_)));
        press(&mut app, &[KeyCode::Char('n')]);
        assert_eq!(app.store().len(), 2);

        press(&mut app, &[KeyCode::Char('-'), KeyCode::Char('y')]);
        assert_eq!(status_text(&app), "Removed: Emma");
        assert_eq!(app.store().books()[0].title, "Dune");
        match &app.screen {
            Screen::Remove(remove) => assert_eq!(remove.cursor.selected, 0),
            _ => panic!("expected remove screen"),
        }
    }

    #[test]
    fn library_view_toggles_read_flag() {
        let dir = TempDir::new().unwrap();
        let (mut app, _) = app_with(&dir, None, false);
        add_via_form(&mut app, "Dune", "Herbert", "1965");

        press(&mut app, &[KeyCode::Esc, KeyCode::Char('1'), KeyCode::Char(' ')]);
        assert!(app.store().books()[0].read);
        assert_eq!(status_text(&app), "Marked 'Dune' as read.");
    }

    #[test]
    fn search_types_and_toggles_results() {
        let dir = TempDir::new().unwrap();
        let (mut app, _) = app_with(&dir, None, false);
        add_via_form(&mut app, "Dune", "Frank Herbert", "1965");
        add_via_form(&mut app, "Emma", "Jane Austen", "1815");

        press(&mut app, &[KeyCode::Esc, KeyCode::Char('4')]);
        type_text(&mut app, "austen");
        match &app.screen {
            Screen::Search(search) => assert_eq!(search.results, vec![1]),
            _ => panic!("expected search screen"),
        }
        app.handle_ctrl_t().unwrap();
        assert!(app.store().books()[1].read);
        assert!(!app.store().books()[0].read);
    }

    #[test]
    fn fetch_then_add_persists_catalog_record() {
        let dir = TempDir::new().unwrap();
        let (mut app, requests) = app_with(&dir, Some(dune_hit()), false);

        press(&mut app, &[KeyCode::Char('6')]);
        type_text(&mut app, " dune ");
        press(&mut app, &[KeyCode::Enter]);
        assert_eq!(requests.borrow().as_slice(), ["dune".to_string()]);
        assert_eq!(status_text(&app), "Found 'Dune'. Press Ctrl+A to add it.");

        app.handle_ctrl_a().unwrap();
        assert_eq!(app.store().books(), &[dune_hit().book]);
        let reopened = LibraryStore::open(dir.path().join("library.txt")).unwrap();
        assert_eq!(reopened.books(), &[dune_hit().book]);

        app.handle_ctrl_a().unwrap();
        assert_eq!(app.store().len(), 1);
        assert_eq!(status_text(&app), "Fetch a book first.");
    }

    #[test]
    fn fetch_without_result_or_with_error_is_a_notice() {
        let dir = TempDir::new().unwrap();
        let (mut app, _) = app_with(&dir, None, false);
        press(&mut app, &[KeyCode::Char('6')]);
        type_text(&mut app, "nothing");
        press(&mut app, &[KeyCode::Enter]);
        assert_eq!(status_text(&app), "No results found. Try a different title.");

        let dir = TempDir::new().unwrap();
        let (mut app, _) = app_with(&dir, None, true);
        press(&mut app, &[KeyCode::Char('6')]);
        type_text(&mut app, "Dune");
        press(&mut app, &[KeyCode::Enter]);
        assert_eq!(status_text(&app), "Catalog lookup failed: connection refused");
        assert!(app.store().is_empty());
    }

    #[test]
    fn empty_fetch_title_skips_the_catalog() {
        let dir = TempDir::new().unwrap();
        let (mut app, requests) = app_with(&dir, Some(dune_hit()), false);
        press(&mut app, &[KeyCode::Char('6'), KeyCode::Enter]);
        assert!(requests.borrow().is_empty());
        assert_eq!(status_text(&app), "Enter a book title to search.");
    }

    #[test]
    fn shortcuts_ignored_while_menu_focused() {
        let dir = TempDir::new().unwrap();
        let (mut app, _) = app_with(&dir, None, false);
        add_via_form(&mut app, "Dune", "Herbert", "1965");
        press(&mut app, &[KeyCode::Esc, KeyCode::Char('1'), KeyCode::Esc]);
        app.handle_ctrl_t().unwrap();
        assert!(!app.store().books()[0].read);
    }

    #[test]
    fn warns_about_skipped_lines_on_start() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("library.txt"),
            "Dune | Herbert | 1965 | Sci-Fi | True | \nbad line\n",
        )
        .unwrap();
        let (app, _) = app_with(&dir, None, false);
        assert!(status_text(&app).starts_with("Skipped 1 malformed line(s)."));
        assert_eq!(app.store().len(), 1);
    }
}
