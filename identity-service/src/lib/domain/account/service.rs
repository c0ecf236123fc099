use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::ChangeSecretCommand;
use crate::account::models::RegisterAccountCommand;
use crate::account::ports::AccountRepository;
use crate::account::ports::AccountServicePort;
use crate::account::ports::CredentialHasher;
use crate::account::ports::RoleRepository;
use crate::errors::IdentityError;

/// Domain service implementation for account registration and lifecycle.
///
/// Concrete implementation of AccountServicePort with dependency injection.
pub struct AccountService<AR, RR, H>
where
    AR: AccountRepository,
    RR: RoleRepository,
    H: CredentialHasher,
{
    accounts: Arc<AR>,
    roles: Arc<RR>,
    hasher: Arc<H>,
    default_role: String,
}

impl<AR, RR, H> AccountService<AR, RR, H>
where
    AR: AccountRepository,
    RR: RoleRepository,
    H: CredentialHasher,
{
    /// Create a new account service with injected dependencies.
    ///
    /// # Arguments
    /// * `accounts` - Account persistence implementation
    /// * `roles` - Role persistence implementation
    /// * `hasher` - Secret hashing implementation
    /// * `default_role` - Role granted to every new account
    ///
    /// # Returns
    /// Configured account service instance
    pub fn new(
        accounts: Arc<AR>,
        roles: Arc<RR>,
        hasher: Arc<H>,
        default_role: impl Into<String>,
    ) -> Self {
        Self {
            accounts,
            roles,
            hasher,
            default_role: default_role.into(),
        }
    }

    async fn load(&self, id: &AccountId) -> Result<Account, IdentityError> {
        self.accounts
            .find_by_id(id)
            .await?
            .ok_or(IdentityError::NotFound(id.to_string()))
    }

    async fn set_enabled(&self, id: &AccountId, enabled: bool) -> Result<(), IdentityError> {
        if !self.accounts.set_enabled(id, enabled, Utc::now()).await? {
            return Err(if enabled {
                IdentityError::AlreadyActivated
            } else {
                IdentityError::AlreadyDeactivated
            });
        }

        tracing::info!(account_id = %id, enabled, "Account status changed");
        Ok(())
    }
}

#[async_trait]
impl<AR, RR, H> AccountServicePort for AccountService<AR, RR, H>
where
    AR: AccountRepository,
    RR: RoleRepository,
    H: CredentialHasher,
{
    async fn register(&self, command: RegisterAccountCommand) -> Result<Account, IdentityError> {
        if self.accounts.exists_by_email(&command.email).await? {
            return Err(IdentityError::EmailExists);
        }

        if self.accounts.exists_by_phone(&command.phone_number).await? {
            return Err(IdentityError::PhoneExists);
        }

        let (secret, confirm_secret) = command.secrets().ok_or(IdentityError::MissingSecrets)?;
        if secret != confirm_secret {
            return Err(IdentityError::SecretMismatch);
        }

        let role = match self.roles.find_by_name(&self.default_role).await? {
            Some(role) => role,
            None => {
                tracing::error!(role = %self.default_role, "Default role is not provisioned");
                return Err(IdentityError::RoleNotFound(self.default_role.clone()));
            }
        };

        let secret_hash = self.hasher.hash(secret)?;

        let account = Account {
            id: AccountId::new(),
            first_name: command.first_name,
            last_name: command.last_name,
            email: command.email,
            phone_number: command.phone_number,
            secret_hash,
            date_of_birth: command.date_of_birth,
            profile_picture_url: None,
            enabled: true,
            account_locked: false,
            credentials_expired: false,
            email_verified: false,
            phone_verified: false,
            roles: vec![role],
            deletion_requested_at: None,
            created_at: Utc::now(),
            updated_at: None,
        };

        let created = self.accounts.create(account).await?;
        tracing::info!(account_id = %created.id, "Account registered");

        Ok(created)
    }

    async fn get_account(&self, id: &AccountId) -> Result<Account, IdentityError> {
        self.load(id).await
    }

    async fn change_secret(
        &self,
        id: &AccountId,
        command: ChangeSecretCommand,
    ) -> Result<(), IdentityError> {
        if command.new_secret != command.confirm_new_secret {
            return Err(IdentityError::SecretMismatch);
        }

        let account = self.load(id).await?;

        if !self
            .hasher
            .verify(&command.current_secret, &account.secret_hash)
        {
            return Err(IdentityError::InvalidCurrentSecret);
        }

        let new_hash = self.hasher.hash(&command.new_secret)?;
        let replaced = self
            .accounts
            .replace_secret_hash(id, &account.secret_hash, &new_hash, Utc::now())
            .await?;

        // The verified secret was replaced concurrently and no longer holds
        if !replaced {
            tracing::warn!(account_id = %id, "Concurrent secret change detected");
            return Err(IdentityError::InvalidCurrentSecret);
        }

        tracing::info!(account_id = %id, "Account secret changed");
        Ok(())
    }

    async fn deactivate(&self, id: &AccountId) -> Result<(), IdentityError> {
        self.set_enabled(id, false).await
    }

    async fn reactivate(&self, id: &AccountId) -> Result<(), IdentityError> {
        self.set_enabled(id, true).await
    }

    async fn schedule_deletion(&self, id: &AccountId) -> Result<(), IdentityError> {
        if self.accounts.mark_deletion_requested(id, Utc::now()).await? {
            tracing::info!(account_id = %id, "Account deletion requested");
        } else {
            tracing::debug!(account_id = %id, "Account deletion already requested");
        }
        Ok(())
    }
}
