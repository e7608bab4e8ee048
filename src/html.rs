//! HTML to text
//!
//! Two transforms, applied at different stages:
//!
//! - [`basic_normalize`] runs during body extraction. It keeps the
//!   tags but joins lines and pads every `<` with a space so adjacent
//!   words never glue together once the tags are gone.
//! - [`html_to_text`] runs when the body is printed and does the real
//!   rendering with `html2text`.
//!
//! The printer feeds the output of the first into the second.

use crate::error::{Error, Result};

/// Column width used when rendering HTML to text.
pub const TEXT_WIDTH: usize = 78;

/// Join lines with single spaces, insert a space before each `<` and
/// unescape HTML entities. Tags are left in place.
#[must_use]
pub fn basic_normalize(html: &str) -> String {
    let joined = split_lines(html).join(" ");
    let spaced = joined.replace('<', " <");
    html_escape::decode_html_entities(&spaced).into_owned()
}

/// Render HTML as plain text, wrapped at [`TEXT_WIDTH`] columns.
///
/// Tags are stripped; lists and emphasis are drawn with plain
/// characters. Text without markup comes back unchanged apart from
/// whitespace.
///
/// # Errors
///
/// Returns [`Error::Decoding`] if `html2text` cannot process the input.
pub fn html_to_text(html: &str) -> Result<String> {
    html2text::config::plain()
        .string_from_read(html.as_bytes(), TEXT_WIDTH)
        .map_err(|e| Error::Decoding(format!("HTML rendering failed: {e}")))
}

/// Split on every line boundary (`\n`, `\r\n`, `\r` and the Unicode
/// separators), dropping the terminators. A trailing terminator does
/// not produce an empty last line.
fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !is_line_break(c) {
            continue;
        }
        lines.push(&text[start..i]);
        let mut end = i + c.len_utf8();
        if c == '\r' && matches!(chars.peek(), Some((_, '\n'))) {
            chars.next();
            end += 1;
        }
        start = end;
    }

    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

const fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r'
            | '\u{0b}'
            | '\u{0c}'
            | '\u{1c}'
            | '\u{1d}'
            | '\u{1e}'
            | '\u{85}'
            | '\u{2028}'
            | '\u{2029}'
    )
}
