use std::sync::Arc;
use std::sync::OnceLock;

use async_trait::async_trait;

use crate::account::models::EmailAddress;
use crate::account::ports::AccountRepository;
use crate::account::ports::CredentialHasher;
use crate::errors::IdentityError;
use crate::session::models::LoginCommand;
use crate::session::models::Principal;
use crate::session::models::TokenPair;
use crate::session::ports::SessionServicePort;

const TIMING_GUARD_SECRET: &str = "timing-guard-secret";

/// Domain service implementation for login, refresh and token resolution.
///
/// Tokens are bound to the account email. Account state is only consulted
/// at login and when resolving a principal, never on refresh.
pub struct SessionService<AR, H>
where
    AR: AccountRepository,
    H: CredentialHasher,
{
    accounts: Arc<AR>,
    hasher: Arc<H>,
    tokens: Arc<auth::TokenService>,
    timing_guard: OnceLock<Option<String>>,
}

impl<AR, H> SessionService<AR, H>
where
    AR: AccountRepository,
    H: CredentialHasher,
{
    /// Create a new session service with injected dependencies.
    ///
    /// # Arguments
    /// * `accounts` - Account persistence implementation
    /// * `hasher` - Secret hashing implementation
    /// * `tokens` - Token issuer and validator
    pub fn new(accounts: Arc<AR>, hasher: Arc<H>, tokens: Arc<auth::TokenService>) -> Self {
        Self {
            accounts,
            hasher,
            tokens,
            timing_guard: OnceLock::new(),
        }
    }

    /// Spend roughly one verification worth of work on an unknown identity,
    /// so it cannot be told apart from a wrong secret by response time.
    fn equalize_timing(&self, secret: &str) {
        let guard = self
            .timing_guard
            .get_or_init(|| self.hasher.hash(TIMING_GUARD_SECRET).ok());

        if let Some(hash) = guard {
            let _ = self.hasher.verify(secret, hash);
        }
    }
}

#[async_trait]
impl<AR, H> SessionServicePort for SessionService<AR, H>
where
    AR: AccountRepository,
    H: CredentialHasher,
{
    async fn login(&self, command: LoginCommand) -> Result<TokenPair, IdentityError> {
        let account = match EmailAddress::new(command.identity) {
            Ok(email) => self.accounts.find_by_email(&email).await?,
            Err(_) => None,
        };

        let Some(account) = account else {
            self.equalize_timing(&command.secret);
            tracing::debug!("Login rejected: unknown identity");
            return Err(IdentityError::BadCredentials);
        };

        if !account.enabled {
            tracing::debug!(account_id = %account.id, "Login rejected: account disabled");
            return Err(IdentityError::AccountDisabled);
        }

        if account.account_locked {
            tracing::debug!(account_id = %account.id, "Login rejected: account locked");
            return Err(IdentityError::AccountLocked);
        }

        if !self.hasher.verify(&command.secret, &account.secret_hash) {
            tracing::debug!(account_id = %account.id, "Login rejected: wrong secret");
            return Err(IdentityError::BadCredentials);
        }

        if account.credentials_expired {
            tracing::debug!(account_id = %account.id, "Login rejected: credentials expired");
            return Err(IdentityError::CredentialsExpired);
        }

        let subject = account.email.as_str();
        let access_token = self.tokens.issue_access_token(subject)?;
        let refresh_token = self.tokens.issue_refresh_token(subject)?;

        tracing::info!(account_id = %account.id, "Login succeeded");
        Ok(TokenPair::bearer(access_token, refresh_token))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, IdentityError> {
        let access_token = self.tokens.redeem_refresh_token(refresh_token)?;
        Ok(TokenPair::bearer(access_token, refresh_token.to_string()))
    }

    async fn resolve_principal(&self, access_token: &str) -> Result<Principal, IdentityError> {
        let claims = self.tokens.validate_access_token(access_token)?;

        let email = EmailAddress::new(claims.sub).map_err(|_| IdentityError::TokenInvalid)?;
        let account = self
            .accounts
            .find_by_email(&email)
            .await?
            .ok_or(IdentityError::TokenInvalid)?;

        Ok(Principal::from(&account))
    }
}
