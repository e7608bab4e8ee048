//! IMAP connection configuration

use crate::error::{Error, Result};
use std::env;
use std::fmt;
use std::str::FromStr;

/// How the TCP connection is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Security {
    /// TLS from the first byte (IMAPS, port 993).
    #[default]
    Tls,
    /// Plain TCP upgraded with the `STARTTLS` command (port 143).
    StartTls,
}

impl Security {
    /// The conventional port for this mode.
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::Tls => 993,
            Self::StartTls => 143,
        }
    }
}

impl FromStr for Security {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tls" | "ssl" | "imaps" => Ok(Self::Tls),
            "starttls" => Ok(Self::StartTls),
            other => Err(Error::Config(format!(
                "Invalid IMAP_SECURITY '{other}' (expected tls or starttls)"
            ))),
        }
    }
}

impl fmt::Display for Security {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Tls => "tls",
            Self::StartTls => "starttls",
        })
    }
}

/// IMAP connection configuration
#[derive(Debug, Clone)]
pub struct ImapConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub security: Security,
    /// Skip certificate verification (self-signed bridges, test servers).
    pub accept_invalid_certs: bool,
}

impl ImapConfig {
    /// Load IMAP configuration from environment variables
    ///
    /// Reads from `.env` file if present. Required variables:
    /// - `IMAP_HOST`
    /// - `IMAP_USERNAME`
    /// - `IMAP_PASSWORD`
    ///
    /// Optional (with defaults):
    /// - `IMAP_SECURITY` (default: `tls`, or `starttls`)
    /// - `IMAP_PORT` (default: `993` for `tls`, `143` for `starttls`)
    /// - `IMAP_ACCEPT_INVALID_CERTS` (default: `false`)
    ///
    /// A missing host is reported as a connection error and missing
    /// credentials as an authentication error.
    ///
    /// # Errors
    ///
    /// See [`ImapConfig::from_lookup`].
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// [`Error::Connection`] without a host, [`Error::Authentication`]
    /// without credentials (empty counts as missing), [`Error::Config`]
    /// for a malformed port, security mode or boolean. Required
    /// variables are checked first.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let host = required("IMAP_HOST")
            .ok_or_else(|| Error::Connection("IMAP_HOST not set".into()))?;
        let username = required("IMAP_USERNAME")
            .ok_or_else(|| Error::Authentication("IMAP_USERNAME not set".into()))?;
        let password = required("IMAP_PASSWORD")
            .ok_or_else(|| Error::Authentication("IMAP_PASSWORD not set".into()))?;

        let security = lookup("IMAP_SECURITY")
            .map(|s| s.parse::<Security>())
            .transpose()?
            .unwrap_or_default();

        let port = match lookup("IMAP_PORT") {
            Some(p) => p
                .trim()
                .parse()
                .map_err(|e| Error::Config(format!("Invalid IMAP_PORT: {e}")))?,
            None => security.default_port(),
        };

        let accept_invalid_certs = lookup("IMAP_ACCEPT_INVALID_CERTS")
            .map(|v| parse_bool(&v))
            .transpose()?
            .unwrap_or(false);

        Ok(Self {
            host,
            port,
            username,
            password,
            security,
            accept_invalid_certs,
        })
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(Error::Config(format!(
            "Invalid IMAP_ACCEPT_INVALID_CERTS '{other}'"
        ))),
    }
}
