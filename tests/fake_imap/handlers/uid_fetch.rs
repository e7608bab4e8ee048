//! UID FETCH command handler.
//!
//! Message bodies travel as **counted literals**:
//!
//! ```text
//! * <seq> FETCH (UID <uid> FLAGS (<flags>) BODY[] {<length>}
//! <exactly length bytes of raw RFC 5322 message>
//! )
//! ```
//!
//! The `{length}\r\n` marker tells the client that the next `length`
//! bytes are raw data, not protocol text.
//!
//! Fetching `BODY[]` (as opposed to `BODY.PEEK[]`) sets `\Seen`, so
//! the handler updates the shared mailbox before answering and reports
//! the new flags. The sequence number is the 1-based index of the
//! message within the folder (RFC 3501 Section 7.4.2).

use crate::fake_imap::io::{write_bytes, write_line};
use crate::fake_imap::mailbox::Mailbox;
use imap_codec::imap_types::sequence::{SeqOrUid, Sequence, SequenceSet};
use std::sync::Mutex;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};

/// Extract UIDs from a `SequenceSet`. Only single values are
/// supported; the client fetches one UID at a time.
fn extract_uids(seq_set: &SequenceSet) -> Vec<u32> {
    seq_set
        .0
        .as_ref()
        .iter()
        .filter_map(|seq| match seq {
            Sequence::Single(SeqOrUid::Value(v)) => Some(v.get()),
            _ => None,
        })
        .collect()
}

/// One message ready to be written: `(seq, uid, flags, raw)`.
type FetchRow = (usize, u32, String, Vec<u8>);

/// Handle the UID FETCH command. Marks each fetched message `\Seen`
/// and returns its flags and body.
pub async fn handle_uid_fetch<S: AsyncRead + AsyncWrite + Unpin>(
    tag: &str,
    sequence_set: &SequenceSet,
    mailbox: &Mutex<Mailbox>,
    selected_folder: Option<&str>,
    stream: &mut BufReader<S>,
) {
    let Some(folder_name) = selected_folder else {
        let resp = format!("{tag} BAD No folder selected\r\n");
        let _ = write_line(stream, &resp).await;
        return;
    };

    // Mutate under lock (no await inside), write afterwards.
    let rows: Option<Vec<FetchRow>> = {
        let mut mb = mailbox.lock().unwrap();
        mb.get_folder_mut(folder_name).map(|folder| {
            extract_uids(sequence_set)
                .into_iter()
                .filter_map(|uid| {
                    let (idx, email) = folder
                        .emails
                        .iter_mut()
                        .enumerate()
                        .find(|(_, e)| e.uid == uid)?;
                    email.seen = true;
                    Some((idx + 1, uid, email.flag_list(), email.raw.clone()))
                })
                .collect()
        })
    };

    let Some(rows) = rows else {
        let resp = format!("{tag} BAD Folder not found\r\n");
        let _ = write_line(stream, &resp).await;
        return;
    };

    for (seq, uid, flags, raw) in rows {
        let header = format!(
            "* {seq} FETCH (UID {uid} FLAGS ({flags}) BODY[] {{{}}}\r\n",
            raw.len()
        );
        if write_line(stream, &header).await.is_err() {
            return;
        }

        if write_bytes(stream, &raw).await.is_err() {
            return;
        }

        if write_line(stream, ")\r\n").await.is_err() {
            return;
        }
    }

    let resp = format!("{tag} OK FETCH completed\r\n");
    let _ = write_line(stream, &resp).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_imap::io::transcript;
    use crate::fake_imap::mailbox::MailboxBuilder;
    use std::num::NonZeroU32;

    const RAW: &[u8] = b"From: a@b.com\r\nSubject: Test\r\n\r\nBody";

    fn uid_set(uid: u32) -> SequenceSet {
        SequenceSet(
            vec![Sequence::Single(SeqOrUid::Value(
                NonZeroU32::new(uid).unwrap(),
            ))]
            .try_into()
            .unwrap(),
        )
    }

    async fn fetch(uid: u32, mailbox: &Mutex<Mailbox>, selected: Option<&str>) -> String {
        let (output, ()) = transcript(async |s| {
            handle_uid_fetch("A1", &uid_set(uid), mailbox, selected, s).await;
        })
        .await;
        output
    }

    #[tokio::test]
    async fn literal_carries_the_raw_message() {
        let mailbox = Mutex::new(
            MailboxBuilder::new()
                .folder("INBOX")
                .email(7, true, RAW)
                .email(42, false, RAW)
                .build(),
        );

        let output = fetch(42, &mailbox, Some("INBOX")).await;

        let expected = format!(
            "* 2 FETCH (UID 42 FLAGS (\\Seen) BODY[] {{{}}}\r\n{})\r\nA1 OK FETCH completed\r\n",
            RAW.len(),
            String::from_utf8_lossy(RAW)
        );
        assert_eq!(output, expected);
    }

    #[tokio::test]
    async fn only_the_fetched_message_becomes_seen() {
        let mailbox = Mutex::new(
            MailboxBuilder::new()
                .folder("INBOX")
                .email(1, false, RAW)
                .email(2, false, RAW)
                .build(),
        );

        fetch(2, &mailbox, Some("INBOX")).await;

        let mb = mailbox.lock().unwrap();
        let seen: Vec<bool> = mb.get_folder("INBOX").unwrap().emails.iter().map(|e| e.seen).collect();
        assert_eq!(seen, [false, true]);
    }

    #[tokio::test]
    async fn deleted_flag_is_reported() {
        let mailbox = Mutex::new(
            MailboxBuilder::new()
                .folder("INBOX")
                .deleted_email(3, RAW)
                .build(),
        );

        let output = fetch(3, &mailbox, Some("INBOX")).await;

        assert!(output.starts_with("* 1 FETCH (UID 3 FLAGS (\\Seen \\Deleted) BODY[] "));
    }

    #[tokio::test]
    async fn unknown_uid_only_completes() {
        let mailbox = Mutex::new(MailboxBuilder::new().folder("INBOX").build());

        let output = fetch(99, &mailbox, Some("INBOX")).await;

        assert_eq!(output, "A1 OK FETCH completed\r\n");
    }

    #[tokio::test]
    async fn requires_a_selected_folder() {
        let mailbox = Mutex::new(MailboxBuilder::new().folder("INBOX").build());

        let output = fetch(1, &mailbox, None).await;

        assert_eq!(output, "A1 BAD No folder selected\r\n");
    }
}
