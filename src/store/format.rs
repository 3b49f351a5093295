//! Line codec for the persisted library file.
//!
//! Each book occupies one line, fields joined by [`DELIMITER`] in the fixed
//! order title, author, year, genre, read, link. The read flag is written as
//! the literal `True`/`False` so files produced by earlier versions of the
//! manager keep loading; only the exact text `True` reads back as `true`.

use crate::models::Book;

use super::error::LineError;

/// Field separator. Three characters: space, pipe, space.
pub const DELIMITER: &str = " | ";

const READ_TRUE: &str = "True";
const READ_FALSE: &str = "False";
const MIN_FIELDS: usize = 5;

/// Serialize a book into one line without the trailing newline.
pub fn encode_line(book: &Book) -> String {
    let read = if book.read { READ_TRUE } else { READ_FALSE };
    let year = book.year.to_string();
    [
        book.title.as_str(),
        book.author.as_str(),
        year.as_str(),
        book.genre.as_str(),
        read,
        book.link.as_str(),
    ]
    .join(DELIMITER)
}

/// Parse one stored line. The caller strips the line terminator and skips
/// blank lines. Lines written before links existed carry only five fields and
/// load with an empty link; fields past the sixth are ignored.
pub fn decode_line(line: &str) -> Result<Book, LineError> {
    let parts: Vec<&str> = line.split(DELIMITER).collect();
    if parts.len() < MIN_FIELDS {
        return Err(LineError::TooFewFields { found: parts.len() });
    }

    // Legacy files: a six-field line with an empty link ends in " | ", which
    // a trimmed line turns into a trailing " |" glued to the read flag. Lines
    // written here never produce it.
    let read_raw = parts[4].strip_suffix(" |").unwrap_or(parts[4]);
    let year_raw = parts[2].trim();
    let year = year_raw.parse::<i64>().map_err(|_| LineError::InvalidYear {
        value: year_raw.to_string(),
    })?;

    Ok(Book {
        title: parts[0].to_string(),
        author: parts[1].to_string(),
        year,
        genre: parts[3].to_string(),
        read: read_raw == READ_TRUE,
        link: parts.get(5).map(|link| link.to_string()).unwrap_or_default(),
    })
}

/// Name of the first field that would not read back unchanged, if any. Besides
/// the delimiter itself, a field ending in `" |"` is refused: followed by the
/// delimiter it forms `" | |"`, and the split then cuts one character early.
pub(crate) fn offending_field(book: &Book) -> Option<&'static str> {
    let fields = [
        ("title", book.title.as_str()),
        ("author", book.author.as_str()),
        ("genre", book.genre.as_str()),
        ("link", book.link.as_str()),
    ];
    fields
        .into_iter()
        .find(|(_, value)| {
            value.contains(DELIMITER)
                || value.ends_with(" |")
                || value.contains('\n')
                || value.contains('\r')
        })
        .map(|(name, _)| name)
}
