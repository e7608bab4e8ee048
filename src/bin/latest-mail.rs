#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! Print the folders and the latest message of an IMAP mailbox

use clap::Parser;
use latest_mail::report::{write_folders, write_message};
use latest_mail::{Folder, ImapConfig, MailClient};
use std::io::Write;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "latest-mail")]
#[command(about = "Print the folders and the latest message of an IMAP mailbox")]
struct Args {
    /// Folder to read the latest message from
    #[arg(long, default_value = "INBOX")]
    folder: String,

    /// Do not print the folder listing
    #[arg(long)]
    skip_folders: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = ImapConfig::from_env()?;
    let client = MailClient::new(config);
    let folder = Folder::from(args.folder.as_str());

    let mut out = std::io::stdout().lock();

    let latest = if args.skip_folders {
        client.fetch_latest(&folder).await?
    } else {
        client
            .run_with(&folder, |folders| {
                write_folders(&mut out, folders)?;
                out.flush()?;
                Ok(())
            })
            .await?
    };

    match latest {
        Some(message) => write_message(&mut out, &message)?,
        None => info!("Nothing to show in {}", folder),
    }

    out.flush()?;
    Ok(())
}
