use std::fmt;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Discriminates what a token may be used for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Short-lived credential presented on API calls.
    Access,
    /// Long-lived credential accepted only for renewal.
    Refresh,
}

impl TokenKind {
    /// Label used in the `token_type` claim and for key derivation.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claims carried by every token the service issues.
///
/// Subset of RFC 7519 registered claims plus the `token_type` discriminator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject (stable account identity)
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// JWT ID, unique per issued token
    pub jti: String,

    /// Access or refresh
    pub token_type: TokenKind,
}

impl Claims {
    /// Build claims for a freshly issued token.
    ///
    /// # Arguments
    /// * `subject` - Identity the token is bound to
    /// * `kind` - Access or refresh
    /// * `issued_at` - Issuance instant
    /// * `ttl` - Lifetime of the token
    ///
    /// # Returns
    /// Claims with sub, iat, exp, jti and token_type set
    pub fn issue(
        subject: impl ToString,
        kind: TokenKind,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            sub: subject.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type: kind,
        }
    }

    /// Check if token is expired.
    ///
    /// A token stays valid up to and including `exp + leeway_seconds`.
    pub fn is_expired(&self, current_timestamp: i64, leeway_seconds: i64) -> bool {
        self.exp.saturating_add(leeway_seconds) < current_timestamp
    }
}
