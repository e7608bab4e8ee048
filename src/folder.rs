//! Folders: the one to read from, and the ones the server lists

use std::fmt;

/// Which folder to read the latest message from.
///
/// `INBOX` is the only name IMAP treats specially: it is
/// case-insensitive (RFC 3501 Section 5.1) and the default. Every
/// other name is passed to `SELECT` exactly as given.
///
/// ```
/// use latest_mail::Folder;
///
/// assert_eq!(Folder::default(), Folder::Inbox);
/// assert_eq!(Folder::from("inbox").as_str(), "INBOX");
/// assert_eq!(Folder::from("Receipts/2024").as_str(), "Receipts/2024");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Folder {
    #[default]
    Inbox,
    Custom(String),
}

impl Folder {
    #[must_use]
    pub fn custom(name: impl Into<String>) -> Self {
        Self::Custom(name.into())
    }

    /// The name sent in `SELECT`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Inbox => "INBOX",
            Self::Custom(name) => name,
        }
    }
}

impl fmt::Display for Folder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Folder {
    fn from(name: &str) -> Self {
        if name.eq_ignore_ascii_case("INBOX") {
            Self::Inbox
        } else {
            Self::custom(name)
        }
    }
}

/// One row of a `LIST` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderEntry {
    pub name: String,
    /// `None` when the server reports `NIL` (flat namespace).
    pub delimiter: Option<String>,
}

impl FolderEntry {
    #[must_use]
    pub fn new(name: impl Into<String>, delimiter: Option<&str>) -> Self {
        Self {
            name: name.into(),
            delimiter: delimiter.map(ToString::to_string),
        }
    }
}
