//! Message decoding
//!
//! Parses raw RFC 5322 bytes with `mailparse`, decodes the envelope
//! headers and picks the text body.
//!
//! Every MIME part is classified once as a [`PartKind`]; body selection
//! then only looks at the tags. In a multipart message the first
//! plain-text part wins, the first HTML part is the fallback (after
//! [`basic_normalize`]) and anything else yields an empty body.

use crate::error::{Error, Result};
use crate::flag::Flag;
use crate::html::basic_normalize;
use charset::Charset;
use mailparse::{DispositionType, MailHeaderMap, ParsedMail};

/// The four header fields printed for a message.
///
/// Each is decoded from RFC 2047 encoded words. A header missing from
/// the message (or present but empty) is `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Envelope {
    pub from: Option<String>,
    pub to: Option<String>,
    pub date: Option<String>,
    pub subject: Option<String>,
}

impl Envelope {
    /// Read `From`, `To`, `Date` and `Subject` (first occurrence each).
    #[must_use]
    pub fn from_headers(mail: &ParsedMail<'_>) -> Self {
        let header = |name: &str| {
            mail.headers
                .get_first_value(name)
                .filter(|value| !value.is_empty())
        };

        Self {
            from: header("From"),
            to: header("To"),
            date: header("Date"),
            subject: header("Subject"),
        }
    }
}

/// What a MIME part is, as far as body selection cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
    /// `text/plain`, not an attachment.
    PlainText,
    /// `text/html`, not an attachment.
    Html,
    /// Anything with `Content-Disposition: attachment`.
    Attachment,
    /// Containers, images, other inline types.
    Other,
}

impl PartKind {
    #[must_use]
    pub fn of(part: &ParsedMail<'_>) -> Self {
        if part.get_content_disposition().disposition == DispositionType::Attachment {
            return Self::Attachment;
        }
        match part.ctype.mimetype.to_ascii_lowercase().as_str() {
            "text/plain" => Self::PlainText,
            "text/html" => Self::Html,
            _ => Self::Other,
        }
    }
}

/// A fetched message with its decoded envelope and body.
#[derive(Debug, Clone)]
pub struct Message {
    pub uid: u32,
    pub flags: Vec<Flag>,
    pub envelope: Envelope,
    /// Extracted text body; HTML bodies are basic-normalized only.
    /// Empty when the message has no usable text part.
    pub body: String,
}

impl Message {
    /// Parse raw message bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decoding`] for malformed MIME or an undecodable
    /// body part.
    pub fn parse(uid: u32, flags: Vec<Flag>, raw: &[u8]) -> Result<Self> {
        let mail = mailparse::parse_mail(raw)
            .map_err(|e| Error::Decoding(format!("Invalid message UID {uid}: {e}")))?;

        Ok(Self {
            uid,
            flags,
            envelope: Envelope::from_headers(&mail),
            body: extract_body(&mail)?,
        })
    }

    #[must_use]
    pub fn is_seen(&self) -> bool {
        self.flags.contains(&Flag::Seen)
    }
}

/// Pick the text body of a parsed message.
///
/// Multipart: first [`PartKind::PlainText`] part in document order,
/// else the first [`PartKind::Html`] part basic-normalized, else `""`.
/// Single part: the payload decoded with its charset, basic-normalized
/// when it is `text/html`.
///
/// # Errors
///
/// Returns [`Error::Decoding`] if the chosen part's transfer encoding
/// or charset cannot be decoded.
pub fn extract_body(mail: &ParsedMail<'_>) -> Result<String> {
    if !is_multipart(mail) {
        let content = decode_part(mail)?;
        return Ok(if mail.ctype.mimetype.eq_ignore_ascii_case("text/html") {
            basic_normalize(&content)
        } else {
            content
        });
    }

    let mut parts = Vec::new();
    walk(mail, &mut parts);
    let classified: Vec<(PartKind, &ParsedMail<'_>)> =
        parts.into_iter().map(|p| (PartKind::of(p), p)).collect();

    let first = |wanted: PartKind| {
        classified
            .iter()
            .find(|(kind, _)| *kind == wanted)
            .map(|(_, part)| *part)
    };

    if let Some(part) = first(PartKind::PlainText) {
        return decode_part(part);
    }
    if let Some(part) = first(PartKind::Html) {
        return decode_part(part).map(|html| basic_normalize(&html));
    }
    Ok(String::new())
}

fn is_multipart(mail: &ParsedMail<'_>) -> bool {
    mail.ctype.mimetype.to_ascii_lowercase().starts_with("multipart/") || !mail.subparts.is_empty()
}

/// Depth-first, document order, container before its children.
fn walk<'p, 'a>(part: &'p ParsedMail<'a>, out: &mut Vec<&'p ParsedMail<'a>>) {
    out.push(part);
    for sub in &part.subparts {
        walk(sub, out);
    }
}

/// Undo the transfer encoding and decode with the declared charset.
///
/// A part without a `charset` parameter is us-ascii. A label nothing
/// recognises is an error rather than a lossy guess.
fn decode_part(part: &ParsedMail<'_>) -> Result<String> {
    let label = &part.ctype.charset;
    let charset = Charset::for_label(label.as_bytes()).ok_or_else(|| {
        Error::Decoding(format!(
            "Unknown charset '{label}' in {} part",
            part.ctype.mimetype
        ))
    })?;

    let raw = part.get_body_raw().map_err(|e| {
        Error::Decoding(format!(
            "Cannot decode {} part (charset {label}): {e}",
            part.ctype.mimetype
        ))
    })?;

    Ok(charset.decode_without_bom_handling(&raw).0.into_owned())
}
