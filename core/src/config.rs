//! Client configuration.
//!
//! Credentials are passed explicitly to the client. `from_env` is a
//! convenience for binaries that keep them in the process environment or a
//! `.env` file; it is read once, when called.

use std::env;
use std::io::ErrorKind;

use tracing::warn;

pub const DEFAULT_BASE_URL: &str = "https://api.ticktick.com/api/v2";

pub const CLIENT_ID_VAR: &str = "TICKTICK_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "TICKTICK_CLIENT_SECRET";
pub const BASE_URL_VAR: &str = "TICKTICK_BASE_URL";

/// Credentials and endpoint for one client instance.
#[derive(Clone)]
pub struct ClientConfig {
    pub client_id: String,
    pub client_secret: String,
    pub base_url: String,
}

impl ClientConfig {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Load credentials from `TICKTICK_CLIENT_ID` / `TICKTICK_CLIENT_SECRET`,
    /// reading a `.env` file first when one exists.
    ///
    /// Missing credentials become empty strings; the token endpoint rejects
    /// them on the first call.
    pub fn from_env() -> Self {
        if let Err(e) = dotenvy::dotenv() {
            if !is_missing_file(&e) {
                warn!(error = %e, "failed to load .env file");
            }
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let config = Self::new(
            lookup(CLIENT_ID_VAR).unwrap_or_default(),
            lookup(CLIENT_SECRET_VAR).unwrap_or_default(),
        );
        match lookup(BASE_URL_VAR) {
            Some(url) if !url.is_empty() => config.with_base_url(&url),
            _ => config,
        }
    }

    pub(crate) fn token_url(&self) -> String {
        format!("{}/oauth/token", self.base_url)
    }
}

/// A missing `.env` is normal; anything else (bad syntax, unreadable file) is not.
fn is_missing_file(error: &dotenvy::Error) -> bool {
    matches!(error, dotenvy::Error::Io(e) if e.kind() == ErrorKind::NotFound)
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}
