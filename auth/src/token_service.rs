use std::sync::Arc;

use chrono::Duration;

use crate::clock::Clock;
use crate::clock::SystemClock;
use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::jwt::TokenKind;

/// Lifetimes and tolerances applied to issued tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenPolicy {
    /// Lifetime of access tokens
    pub access_ttl: Duration,
    /// Lifetime of refresh tokens
    pub refresh_ttl: Duration,
    /// Clock skew tolerated when checking expiry
    pub leeway: Duration,
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self {
            access_ttl: Duration::minutes(15),
            refresh_ttl: Duration::days(7),
            leeway: Duration::zero(),
        }
    }
}

/// Issues, validates and redeems signed bearer tokens.
///
/// Stateless apart from its signing keys, policy and clock. Access and refresh
/// tokens are signed with distinct keys derived from the same secret, and carry
/// a `token_type` claim, so neither kind is accepted where the other is expected.
pub struct TokenService {
    access_handler: JwtHandler,
    refresh_handler: JwtHandler,
    policy: TokenPolicy,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    /// Create a token service backed by the system clock.
    ///
    /// # Arguments
    /// * `secret` - Process-wide signing secret
    /// * `policy` - Token lifetimes and leeway
    pub fn new(secret: &[u8], policy: TokenPolicy) -> Self {
        Self::with_clock(secret, policy, Arc::new(SystemClock))
    }

    /// Create a token service with an explicit time source.
    pub fn with_clock(secret: &[u8], policy: TokenPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            access_handler: JwtHandler::new(&signing_key(secret, TokenKind::Access)),
            refresh_handler: JwtHandler::new(&signing_key(secret, TokenKind::Refresh)),
            policy,
            clock,
        }
    }

    /// Issue a short-lived access token bound to `subject`.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token signing failed
    pub fn issue_access_token(&self, subject: &str) -> Result<String, JwtError> {
        self.issue(subject, TokenKind::Access)
    }

    /// Issue a long-lived refresh token bound to `subject`.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token signing failed
    pub fn issue_refresh_token(&self, subject: &str) -> Result<String, JwtError> {
        self.issue(subject, TokenKind::Refresh)
    }

    /// Validate an access token and return its claims.
    ///
    /// # Errors
    /// * `InvalidToken` / `DecodingFailed` - Bad signature or malformed token
    /// * `WrongTokenType` - A refresh token was presented
    /// * `TokenExpired` - Token is past its expiry
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.validate(token, TokenKind::Access)
    }

    /// Exchange a refresh token for a fresh access token.
    ///
    /// The presented refresh token is not invalidated and no new refresh token
    /// is issued.
    ///
    /// # Errors
    /// * `InvalidToken` / `DecodingFailed` - Bad signature or malformed token
    /// * `WrongTokenType` - An access token was presented
    /// * `TokenExpired` - Refresh token is past its expiry
    /// * `EncodingFailed` - Signing the new access token failed
    pub fn redeem_refresh_token(&self, refresh_token: &str) -> Result<String, JwtError> {
        let claims = self.validate(refresh_token, TokenKind::Refresh)?;
        tracing::debug!(subject = %claims.sub, jti = %claims.jti, "Refresh token redeemed");
        self.issue_access_token(&claims.sub)
    }

    /// Verify signature, kind and expiry of `token`.
    pub fn validate(&self, token: &str, expected: TokenKind) -> Result<Claims, JwtError> {
        // The declared kind selects the verification key, so a genuine token of
        // the other kind verifies and is then reported as the wrong type.
        let declared: Claims = self.handler(expected).decode_unverified(token)?;
        let claims: Claims = self.handler(declared.token_type).decode(token)?;

        if claims.token_type != expected {
            return Err(JwtError::WrongTokenType {
                expected,
                actual: claims.token_type,
            });
        }

        let now = self.clock.now().timestamp();
        if claims.is_expired(now, self.policy.leeway.num_seconds()) {
            return Err(JwtError::TokenExpired);
        }

        Ok(claims)
    }

    fn issue(&self, subject: &str, kind: TokenKind) -> Result<String, JwtError> {
        let ttl = match kind {
            TokenKind::Access => self.policy.access_ttl,
            TokenKind::Refresh => self.policy.refresh_ttl,
        };
        let claims = Claims::issue(subject, kind, self.clock.now(), ttl);

        tracing::debug!(
            subject = %subject,
            token_type = %kind,
            expires_at = claims.exp,
            "Issuing token"
        );

        self.handler(kind).encode(&claims)
    }

    fn handler(&self, kind: TokenKind) -> &JwtHandler {
        match kind {
            TokenKind::Access => &self.access_handler,
            TokenKind::Refresh => &self.refresh_handler,
        }
    }
}

fn signing_key(secret: &[u8], kind: TokenKind) -> Vec<u8> {
    let label = kind.as_str().as_bytes();
    let mut key = Vec::with_capacity(secret.len() + 1 + label.len());
    key.extend_from_slice(secret);
    key.push(b':');
    key.extend_from_slice(label);
    key
}
