//! Message flags as returned alongside a fetched body

use std::fmt;

use async_imap::types::Flag as ImapFlag;

/// A flag carried by a fetched message.
///
/// Fetching `BODY[]` makes the server add [`Flag::Seen`], so the flags
/// of a message returned by `MailClient::fetch_latest` normally
/// include it.
///
/// ```
/// use latest_mail::Flag;
///
/// assert_eq!(Flag::Seen.to_string(), "\\Seen");
/// assert_eq!(Flag::Keyword("$Label1".into()).to_string(), "$Label1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Flag {
    Seen,
    Answered,
    Flagged,
    Deleted,
    Draft,
    Recent,
    /// Anything without a system-flag meaning, verbatim.
    Keyword(String),
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let system = match self {
            Self::Seen => "Seen",
            Self::Answered => "Answered",
            Self::Flagged => "Flagged",
            Self::Deleted => "Deleted",
            Self::Draft => "Draft",
            Self::Recent => "Recent",
            Self::Keyword(kw) => return f.write_str(kw),
        };
        write!(f, "\\{system}")
    }
}

impl From<&ImapFlag<'_>> for Flag {
    fn from(flag: &ImapFlag<'_>) -> Self {
        match flag {
            ImapFlag::Seen => Self::Seen,
            ImapFlag::Answered => Self::Answered,
            ImapFlag::Flagged => Self::Flagged,
            ImapFlag::Deleted => Self::Deleted,
            ImapFlag::Draft => Self::Draft,
            ImapFlag::Recent => Self::Recent,
            ImapFlag::Custom(kw) => Self::Keyword(kw.to_string()),
            // `\*`, only valid in PERMANENTFLAGS
            _ => Self::Keyword("\\*".to_string()),
        }
    }
}
