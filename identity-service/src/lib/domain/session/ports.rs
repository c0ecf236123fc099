use async_trait::async_trait;

use crate::errors::IdentityError;
use crate::session::models::LoginCommand;
use crate::session::models::Principal;
use crate::session::models::TokenPair;

/// Port for credential exchange and token handling.
#[async_trait]
pub trait SessionServicePort: Send + Sync + 'static {
    /// Exchange an email and secret for a token pair.
    ///
    /// # Arguments
    /// * `command` - Identity and plaintext secret
    ///
    /// # Returns
    /// Fresh access and refresh tokens bound to the account email
    ///
    /// # Errors
    /// * `AccountDisabled` - Account is disabled
    /// * `AccountLocked` - Account is locked
    /// * `BadCredentials` - Unknown identity or wrong secret
    /// * `CredentialsExpired` - Secret must be changed before login
    async fn login(&self, command: LoginCommand) -> Result<TokenPair, IdentityError>;

    /// Buy a new access token with a refresh token.
    ///
    /// The refresh token itself is returned unchanged.
    ///
    /// # Errors
    /// * `TokenExpired` - Refresh token has expired
    /// * `TokenWrongType` - An access token was presented
    /// * `TokenInvalid` - Token is malformed or its signature does not verify
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, IdentityError>;

    /// Resolve the account behind an access token.
    ///
    /// Disabled accounts still resolve; callers decide what they may do.
    ///
    /// # Errors
    /// * `TokenExpired` - Access token has expired
    /// * `TokenWrongType` - A refresh token was presented
    /// * `TokenInvalid` - Token does not verify or its subject no longer exists
    async fn resolve_principal(&self, access_token: &str) -> Result<Principal, IdentityError>;
}
