//! Latest-message IMAP reader
//!
//! Connects to an IMAP server, lists its folders and fetches the
//! newest non-deleted message of one folder. The message is decoded
//! into an [`Envelope`] and a text body: plain text is preferred, HTML
//! is the fallback and is converted to readable text when printed.
//!
//! Connections use rustls, either implicit TLS or STARTTLS. A rustls
//! crypto provider must be installed process-wide before connecting,
//! e.g. `rustls::crypto::ring::default_provider().install_default()`.

mod client;
mod config;
mod connection;
mod error;
mod flag;
mod folder;
pub mod html;
mod message;
pub mod report;

pub use client::{MailClient, Snapshot};
pub use config::{ImapConfig, Security};
pub use error::{Error, Result};
pub use flag::Flag;
pub use folder::{Folder, FolderEntry};
pub use message::{Envelope, Message, PartKind, extract_body};
