//! Cached bearer token and its expiry.

use std::time::Duration;

use serde::Deserialize;
use tokio::time::Instant;

/// Expiry used when `expires_in` does not fit the clock.
const FAR_FUTURE: Duration = Duration::from_secs(60 * 60 * 24 * 365 * 30);

/// Body returned by the token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Lifetime in seconds.
    pub expires_in: u64,
}

/// A bearer token held in memory for the life of one client.
#[derive(Debug, Clone)]
pub struct Session {
    token: String,
    expires_at: Instant,
}

impl Session {
    /// Start a session at `now` from a token endpoint reply.
    ///
    /// Lifetimes too large for `Instant` are clamped to roughly thirty years.
    pub fn from_response(response: TokenResponse, now: Instant) -> Self {
        let expires_at = now
            .checked_add(Duration::from_secs(response.expires_in))
            .unwrap_or_else(|| now + FAR_FUTURE);
        Self {
            token: response.access_token,
            expires_at,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// Usable iff the token is non-empty and `now` is strictly before expiry.
    pub fn is_valid_at(&self, now: Instant) -> bool {
        !self.token.is_empty() && now < self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(token: &str, expires_in: u64, now: Instant) -> Session {
        Session::from_response(
            TokenResponse {
                access_token: token.to_string(),
                expires_in,
            },
            now,
        )
    }

    #[test]
    fn valid_until_expiry_exclusive() {
        let now = Instant::now();
        let s = session("tok", 60, now);
        assert!(s.is_valid_at(now));
        assert!(s.is_valid_at(now + Duration::from_secs(59)));
        assert!(!s.is_valid_at(now + Duration::from_secs(60)));
    }

    #[test]
    fn empty_token_is_never_valid() {
        let now = Instant::now();
        assert!(!session("", 3600, now).is_valid_at(now));
    }

    #[test]
    fn zero_lifetime_is_expired_immediately() {
        let now = Instant::now();
        assert!(!session("tok", 0, now).is_valid_at(now));
    }

    #[test]
    fn huge_lifetime_is_clamped() {
        let now = Instant::now();
        let s = session("tok", u64::MAX, now);
        assert_eq!(s.expires_at(), now + FAR_FUTURE);
        assert!(s.is_valid_at(now + Duration::from_secs(60 * 60 * 24 * 365)));
    }

    #[test]
    fn token_response_ignores_extra_fields() {
        let parsed: TokenResponse = serde_json::from_str(
            r#"{"access_token":"abc","token_type":"bearer","expires_in":3600,"scope":"tasks:read"}"#,
        )
        .unwrap();
        assert_eq!(parsed.access_token, "abc");
        assert_eq!(parsed.expires_in, 3600);
    }
}
