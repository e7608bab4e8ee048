//! IMAP session and TLS helpers
//!
//! Every protocol step the client performs lives here: `connect()`
//! (TCP, TLS or STARTTLS, LOGIN), `list()`, `latest_uid()`, `fetch()`
//! and `logout()`. `MailClient` strings them together.

use crate::config::{ImapConfig, Security};
use crate::error::{Error, Result};
use crate::flag::Flag;
use crate::folder::{Folder, FolderEntry};
use async_imap::Session;
use futures::StreamExt;
use rustls::pki_types::ServerName;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_util::compat::{Compat, TokioAsyncReadCompatExt};
use tracing::{debug, info, warn};

/// A TLS-wrapped IMAP session.
pub type ImapSession = Session<Compat<tokio_rustls::client::TlsStream<TcpStream>>>;

/// The raw result of fetching one message.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub uid: u32,
    pub flags: Vec<Flag>,
    pub body: Vec<u8>,
}

/// Build the TLS connector for `config`.
///
/// Certificates are checked against the Mozilla root store unless
/// `accept_invalid_certs` is set.
fn tls_connector(config: &ImapConfig) -> TlsConnector {
    let builder = rustls::ClientConfig::builder();
    let tls = if config.accept_invalid_certs {
        warn!("TLS certificate verification disabled for {}", config.host);
        builder
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(DangerousVerifier))
            .with_no_client_auth()
    } else {
        let mut roots = rustls::RootCertStore::empty();
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        builder.with_root_certificates(roots).with_no_client_auth()
    };
    TlsConnector::from(Arc::new(tls))
}

/// Open a fresh TLS-wrapped, authenticated IMAP session.
///
/// Connects to `config.host:config.port` via TCP, then either performs
/// the TLS handshake straight away ([`Security::Tls`]) or issues
/// STARTTLS first ([`Security::StartTls`]), and logs in.
///
/// Network and TLS failures are [`Error::Connection`]; a rejected
/// LOGIN is [`Error::Authentication`].
pub async fn connect(config: &ImapConfig) -> Result<ImapSession> {
    let addr = format!("{}:{}", config.host, config.port);
    debug!("Connecting to IMAP server at {} ({})", addr, config.security);

    let tcp_stream = TcpStream::connect(&addr)
        .await
        .map_err(|e| Error::Connection(format!("Failed to connect to {addr}: {e}")))?;

    let tcp_stream = match config.security {
        Security::Tls => tcp_stream,
        Security::StartTls => {
            let mut client = async_imap::Client::new(tcp_stream.compat());
            client
                .run_command_and_check_ok("STARTTLS", None)
                .await
                .map_err(|e| Error::Connection(format!("STARTTLS failed: {e}")))?;
            client.into_inner().into_inner()
        }
    };

    let server_name = ServerName::try_from(config.host.clone())
        .map_err(|e| Error::Connection(format!("Invalid server name: {e}")))?;

    let tls_stream = tls_connector(config)
        .connect(server_name, tcp_stream)
        .await
        .map_err(|e| Error::Connection(format!("TLS handshake failed: {e}")))?;

    let tls_client = async_imap::Client::new(tls_stream.compat());

    let session = tls_client
        .login(&config.username, &config.password)
        .await
        .map_err(|(e, _)| match e {
            async_imap::error::Error::Io(_) | async_imap::error::Error::ConnectionLost => {
                Error::Connection(format!("Connection lost during login: {e}"))
            }
            _ => Error::Authentication(format!("Login failed: {e}")),
        })?;

    info!("Connected to IMAP server as {}", config.username);
    Ok(session)
}

/// LOGOUT, logging instead of failing.
///
/// Called on every exit path, so its own failure must not mask the
/// result of the work done on the session.
pub async fn logout(mut session: ImapSession) {
    match session.logout().await {
        Ok(()) => debug!("Logged out"),
        Err(e) => warn!("Logout failed: {}", e),
    }
}

/// LIST every folder, in the order the server reports them.
pub async fn list(session: &mut ImapSession) -> Result<Vec<FolderEntry>> {
    let mut folder_stream = session
        .list(Some(""), Some("*"))
        .await
        .map_err(|e| Error::Protocol(format!("List folders failed: {e}")))?;

    let mut entries = Vec::new();
    while let Some(item) = folder_stream.next().await {
        let name = item.map_err(|e| Error::Protocol(format!("List folders failed: {e}")))?;
        entries.push(FolderEntry::new(name.name(), name.delimiter()));
    }

    debug!("Listed {} folders", entries.len());
    Ok(entries)
}

/// SELECT a folder on an existing session.
pub async fn select(session: &mut ImapSession, folder: &Folder) -> Result<()> {
    session
        .select(folder.as_str())
        .await
        .map_err(|e| Error::Protocol(format!("Failed to select {folder}: {e}")))?;
    Ok(())
}

/// SELECT `folder` and find the UID of its newest non-deleted message.
///
/// The search result arrives as an unordered set; the server's
/// ascending order makes the last element the largest, so the maximum
/// is taken. `None` when nothing matches.
pub async fn latest_uid(session: &mut ImapSession, folder: &Folder) -> Result<Option<u32>> {
    select(session, folder).await?;

    let uids = session
        .uid_search("NOT DELETED")
        .await
        .map_err(|e| Error::Protocol(format!("Search failed: {e}")))?;

    debug!("{} non-deleted messages in {}", uids.len(), folder);
    Ok(uids.into_iter().max())
}

/// UID FETCH the full body and flags of one message.
///
/// Uses `BODY[]` rather than `BODY.PEEK[]`, so the server marks the
/// message `\Seen`.
pub async fn fetch(session: &mut ImapSession, uid: u32) -> Result<Fetched> {
    let uid_set = format!("{uid}");
    let mut messages = session
        .uid_fetch(&uid_set, "(BODY[] FLAGS)")
        .await
        .map_err(|e| Error::Protocol(format!("Fetch failed: {e}")))?;

    let mut fetched = None;
    while let Some(msg_result) = messages.next().await {
        let msg = msg_result.map_err(|e| Error::Protocol(format!("Fetch error: {e}")))?;
        if fetched.is_some() {
            continue;
        }
        if let Some(body) = msg.body() {
            fetched = Some(Fetched {
                uid,
                flags: msg.flags().map(|f| Flag::from(&f)).collect(),
                body: body.to_vec(),
            });
        }
    }

    let fetched =
        fetched.ok_or_else(|| Error::Protocol(format!("No body found for UID {uid}")))?;
    let flags: Vec<String> = fetched.flags.iter().map(ToString::to_string).collect();
    debug!(
        "Fetched UID {} ({} bytes) [{}]",
        uid,
        fetched.body.len(),
        flags.join(" ")
    );
    Ok(fetched)
}

/// Certificate verifier that accepts all certificates
/// (self-signed bridges and test servers).
#[derive(Debug)]
struct DangerousVerifier;

impl rustls::client::danger::ServerCertVerifier for DangerousVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &rustls::pki_types::CertificateDer<'_>,
        _intermediates: &[rustls::pki_types::CertificateDer<'_>],
        _server_name: &rustls::pki_types::ServerName<'_>,
        _ocsp_response: &[u8],
        _now: rustls::pki_types::UnixTime,
    ) -> std::result::Result<rustls::client::danger::ServerCertVerified, rustls::Error> {
        Ok(rustls::client::danger::ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &rustls::pki_types::CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> std::result::Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &rustls::pki_types::CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> std::result::Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        vec![
            rustls::SignatureScheme::RSA_PKCS1_SHA256,
            rustls::SignatureScheme::RSA_PKCS1_SHA384,
            rustls::SignatureScheme::RSA_PKCS1_SHA512,
            rustls::SignatureScheme::ECDSA_NISTP256_SHA256,
            rustls::SignatureScheme::ECDSA_NISTP384_SHA384,
            rustls::SignatureScheme::ECDSA_NISTP521_SHA512,
            rustls::SignatureScheme::RSA_PSS_SHA256,
            rustls::SignatureScheme::RSA_PSS_SHA384,
            rustls::SignatureScheme::RSA_PSS_SHA512,
            rustls::SignatureScheme::ED25519,
        ]
    }
}
