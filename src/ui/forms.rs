use anyhow::{anyhow, Context, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::Book;

/// Input state of the "Add Book" form.
#[derive(Default, Clone)]
pub(crate) struct BookForm {
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) year: String,
    pub(crate) genre: String,
    pub(crate) read: bool,
    pub(crate) link: String,
    pub(crate) active: BookField,
    pub(crate) error: Option<String>,
}

/// Fields of the book form in focus order.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub(crate) enum BookField {
    #[default]
    Title,
    Author,
    Year,
    Genre,
    Read,
    Link,
}

impl BookField {
    pub(crate) const ALL: [BookField; 6] = [
        BookField::Title,
        BookField::Author,
        BookField::Year,
        BookField::Genre,
        BookField::Read,
        BookField::Link,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            BookField::Title => "Book Title",
            BookField::Author => "Author",
            BookField::Year => "Publication Year",
            BookField::Genre => "Genre",
            BookField::Read => "Have you read it?",
            BookField::Link => "Book Link",
        }
    }

    fn next(self) -> Self {
        match self {
            BookField::Title => BookField::Author,
            BookField::Author => BookField::Year,
            BookField::Year => BookField::Genre,
            BookField::Genre => BookField::Read,
            BookField::Read => BookField::Link,
            BookField::Link => BookField::Title,
        }
    }

    fn previous(self) -> Self {
        match self {
            BookField::Title => BookField::Link,
            BookField::Author => BookField::Title,
            BookField::Year => BookField::Author,
            BookField::Genre => BookField::Year,
            BookField::Read => BookField::Genre,
            BookField::Link => BookField::Read,
        }
    }
}

impl BookForm {
    /// Move focus to the next field, wrapping around.
    pub(crate) fn next_field(&mut self) {
        self.active = self.active.next();
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = self.active.previous();
    }

    /// Append a character to the active field. The year only takes digits and
    /// a leading minus; the read field flips on space and answers to y/n.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            BookField::Title => self.title.push(ch),
            BookField::Author => self.author.push(ch),
            BookField::Genre => self.genre.push(ch),
            BookField::Link => self.link.push(ch),
            BookField::Year => {
                if ch.is_ascii_digit() || (ch == '-' && self.year.is_empty()) {
                    self.year.push(ch);
                } else {
                    return false;
                }
            }
            BookField::Read => match ch {
                ' ' => self.read = !self.read,
                'y' | 'Y' => self.read = true,
                'n' | 'N' => self.read = false,
                _ => return false,
            },
        }
        true
    }

    /// Remove the last character from the active field.
    pub(crate) fn backspace(&mut self) {
        match self.active {
            BookField::Title => {
                self.title.pop();
            }
            BookField::Author => {
                self.author.pop();
            }
            BookField::Year => {
                self.year.pop();
            }
            BookField::Genre => {
                self.genre.pop();
            }
            BookField::Link => {
                self.link.pop();
            }
            BookField::Read => {}
        }
    }

    /// Validate the inputs and build the book to store.
    pub(crate) fn parse_inputs(&self) -> Result<Book> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(anyhow!("Book title is required."));
        }
        let year_raw = self.year.trim();
        if year_raw.is_empty() {
            return Err(anyhow!("Publication year is required."));
        }
        let year = year_raw
            .parse::<i64>()
            .context("Publication year must be an integer.")?;
        Ok(Book {
            title: title.to_string(),
            author: self.author.trim().to_string(),
            year,
            genre: self.genre.trim().to_string(),
            read: self.read,
            link: self.link.trim().to_string(),
        })
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field: BookField) -> Line<'static> {
        let is_active = self.active == field;
        let (display, empty) = match field {
            BookField::Read => (if self.read { "Yes" } else { "No" }.to_string(), false),
            _ => {
                let value = self.value(field);
                if value.is_empty() {
                    let placeholder = match field {
                        BookField::Title | BookField::Year => "<required>",
                        _ => "<optional>",
                    };
                    (placeholder.to_string(), true)
                } else {
                    (value.to_string(), false)
                }
            }
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if empty {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{}: ", field.label())),
            Span::styled(display, style),
        ])
    }

    /// Character count for cursor placement.
    pub(crate) fn value_len(&self, field: BookField) -> usize {
        self.value(field).chars().count()
    }

    fn value(&self, field: BookField) -> &str {
        match field {
            BookField::Title => &self.title,
            BookField::Author => &self.author,
            BookField::Year => &self.year,
            BookField::Genre => &self.genre,
            BookField::Link => &self.link,
            BookField::Read => "",
        }
    }
}

/// Confirmation state for deleting one list entry.
#[derive(Clone)]
pub(crate) struct ConfirmBookDelete {
    pub(crate) index: usize,
    pub(crate) book: Book,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_into(form: &mut BookForm, text: &str) {
        for ch in text.chars() {
            form.push_char(ch);
        }
    }

    #[test]
    fn fills_a_complete_book() {
        let mut form = BookForm::default();
        type_into(&mut form, "  Dune ");
        form.next_field();
        type_into(&mut form, "Frank Herbert");
        form.next_field();
        type_into(&mut form, "1965");
        form.next_field();
        type_into(&mut form, "Sci-Fi");
        form.next_field();
        assert!(form.push_char(' '));
        form.next_field();
        type_into(&mut form, "https://example.org/dune");

        let book = form.parse_inputs().unwrap();
        assert_eq!(
            book,
            Book::new(
                "Dune",
                "Frank Herbert",
                1965,
                "Sci-Fi",
                true,
                "https://example.org/dune"
            )
        );
    }

    #[test]
    fn year_accepts_only_digits_and_leading_minus() {
        let mut form = BookForm {
            active: BookField::Year,
            ..BookForm::default()
        };
        assert!(form.push_char('-'));
        assert!(form.push_char('4'));
        assert!(!form.push_char('-'));
        assert!(!form.push_char('x'));
        assert_eq!(form.year, "-4");
    }

    #[test]
    fn title_and_year_are_required() {
        let mut form = BookForm::default();
        assert_eq!(
            form.parse_inputs().unwrap_err().to_string(),
            "Book title is required."
        );
        form.title = "Dune".to_string();
        assert_eq!(
            form.parse_inputs().unwrap_err().to_string(),
            "Publication year is required."
        );
        form.year = "-".to_string();
        assert_eq!(
            form.parse_inputs().unwrap_err().to_string(),
            "Publication year must be an integer."
        );
    }

    #[test]
    fn focus_wraps_both_ways() {
        let mut form = BookForm::default();
        form.previous_field();
        assert_eq!(form.active, BookField::Link);
        form.next_field();
        assert_eq!(form.active, BookField::Title);
    }

    #[test]
    fn read_field_answers_yes_no() {
        let mut form = BookForm {
            active: BookField::Read,
            ..BookForm::default()
        };
        assert!(form.push_char('y'));
        assert!(form.read);
        assert!(form.push_char('N'));
        assert!(!form.read);
        assert!(!form.push_char('x'));
    }
}
