//! Read-only IMAP client

use crate::config::ImapConfig;
use crate::connection::{self, ImapSession};
use crate::error::Result;
use crate::folder::{Folder, FolderEntry};
use crate::message::Message;
use tracing::info;

/// The folder listing and latest message, read over one session.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub folders: Vec<FolderEntry>,
    /// `None` when the folder holds no non-deleted message.
    pub latest: Option<Message>,
}

/// Read-only IMAP client
///
/// Each public method opens its own session and always logs out before
/// returning, whether the work on the session succeeded or not.
pub struct MailClient {
    config: ImapConfig,
}

impl MailClient {
    #[must_use]
    pub const fn new(config: ImapConfig) -> Self {
        Self { config }
    }

    /// List all available IMAP folders, in server order
    ///
    /// # Errors
    ///
    /// Returns an error if the connection, login or LIST command fails.
    pub async fn list_folders(&self) -> Result<Vec<FolderEntry>> {
        let mut session = connection::connect(&self.config).await?;
        let result = connection::list(&mut session).await;
        connection::logout(session).await;
        result
    }

    /// Fetch the newest non-deleted message of a folder
    ///
    /// "Newest" is the highest UID, not the latest `Date` header.
    /// Returns `Ok(None)` for a folder without such messages.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection, SELECT, SEARCH or FETCH
    /// fails, or if the message cannot be decoded.
    pub async fn fetch_latest(&self, folder: &Folder) -> Result<Option<Message>> {
        let mut session = connection::connect(&self.config).await?;
        let result = latest(&mut session, folder).await;
        connection::logout(session).await;
        result
    }

    /// List the folders, then fetch the latest message of `folder`,
    /// all on a single session
    ///
    /// The listing is only returned when every stage succeeds; use
    /// [`MailClient::run_with`] to see it before the fetch can fail.
    ///
    /// # Errors
    ///
    /// Returns the first error of any stage; the session is logged out
    /// regardless.
    pub async fn run(&self, folder: &Folder) -> Result<Snapshot> {
        let mut folders = Vec::new();
        let latest = self
            .run_with(folder, |listed| {
                folders = listed.to_vec();
                Ok(())
            })
            .await?;
        Ok(Snapshot { folders, latest })
    }

    /// Like [`MailClient::run`], but hands the listing to `on_folders`
    /// as soon as it arrives, before the folder is selected
    ///
    /// # Errors
    ///
    /// Returns the first error of the listing, of `on_folders` or of
    /// the fetch; the session is logged out regardless.
    pub async fn run_with<F>(&self, folder: &Folder, on_folders: F) -> Result<Option<Message>>
    where
        F: FnOnce(&[FolderEntry]) -> Result<()>,
    {
        let mut session = connection::connect(&self.config).await?;
        let result = list_then_latest(&mut session, folder, on_folders).await;
        connection::logout(session).await;
        result
    }
}

async fn list_then_latest<F>(
    session: &mut ImapSession,
    folder: &Folder,
    on_folders: F,
) -> Result<Option<Message>>
where
    F: FnOnce(&[FolderEntry]) -> Result<()>,
{
    let folders = connection::list(session).await?;
    on_folders(&folders)?;
    latest(session, folder).await
}

async fn latest(session: &mut ImapSession, folder: &Folder) -> Result<Option<Message>> {
    let Some(uid) = connection::latest_uid(session, folder).await? else {
        info!("No messages in {}", folder);
        return Ok(None);
    };

    info!("Fetching UID {} from {}", uid, folder);
    let fetched = connection::fetch(session, uid).await?;
    Message::parse(fetched.uid, fetched.flags, &fetched.body).map(Some)
}
