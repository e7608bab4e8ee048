//! Console output
//!
//! Writers take any `io::Write` so the binary can hand them a locked
//! stdout and tests a `Vec<u8>`.

use crate::error::Result;
use crate::folder::FolderEntry;
use crate::html::html_to_text;
use crate::message::Message;
use std::io::Write;

/// One folder name per line, in the order given.
///
/// # Errors
///
/// Returns [`Error::Io`](crate::Error::Io) if writing fails.
pub fn write_folders<W: Write>(out: &mut W, folders: &[FolderEntry]) -> Result<()> {
    for folder in folders {
        writeln!(out, "{}", folder.name)?;
    }
    Ok(())
}

/// The four header lines, a blank line and the rendered body.
///
/// The body goes through [`html_to_text`] whatever part it came from.
/// Absent headers print with an empty value.
///
/// # Errors
///
/// Fails if the body cannot be rendered or writing fails.
pub fn write_message<W: Write>(out: &mut W, message: &Message) -> Result<()> {
    let text = html_to_text(&message.body)?;
    let envelope = &message.envelope;

    writeln!(out, "From: {}", envelope.from.as_deref().unwrap_or_default())?;
    writeln!(out, "To: {}", envelope.to.as_deref().unwrap_or_default())?;
    writeln!(out, "Date: {}", envelope.date.as_deref().unwrap_or_default())?;
    writeln!(
        out,
        "Subject: {}",
        envelope.subject.as_deref().unwrap_or_default()
    )?;
    writeln!(out, "\nMessage:")?;
    writeln!(out, "{text}")?;
    Ok(())
}
