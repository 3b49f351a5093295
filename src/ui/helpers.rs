use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::models::Book;

/// Two-line list entry for a book: the title with its read mark, then the
/// remaining fields dimmed.
pub(crate) fn book_lines(book: &Book, selected: bool) -> Vec<Line<'static>> {
    let pointer = if selected { "▶ " } else { "  " };
    let mark = if book.read { "[x]" } else { "[ ]" };
    let title_style = if selected {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };

    let mut first = vec![
        Span::raw(pointer),
        Span::raw(format!("{mark} ")),
        Span::styled(book.title.clone(), title_style),
    ];
    if book.has_link() {
        first.push(Span::styled(" ↗", Style::default().fg(Color::Cyan)));
    }

    let details = format!(
        "      Author: {}   Year: {}   Genre: {}",
        book.author, book.year, book.genre
    );
    vec![
        Line::from(first),
        Line::from(Span::styled(details, Style::default().fg(Color::Gray))),
    ]
}

/// First visible row so `selected` stays on screen when each entry takes
/// `entry_height` rows.
pub(crate) fn scroll_offset(selected: usize, entry_height: u16, viewport: u16) -> usize {
    let per_page = (viewport / entry_height.max(1)).max(1) as usize;
    (selected + 1).saturating_sub(per_page)
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}
