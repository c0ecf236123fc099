use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::ChangeSecretCommand;
use crate::account::models::EmailAddress;
use crate::account::models::PhoneNumber;
use crate::account::models::RegisterAccountCommand;
use crate::account::models::Role;
use crate::errors::IdentityError;

/// Port for account domain service operations.
#[async_trait]
pub trait AccountServicePort: Send + Sync + 'static {
    /// Register a new account holding the default role.
    ///
    /// # Arguments
    /// * `command` - Validated registration data with raw secrets
    ///
    /// # Returns
    /// Created account entity
    ///
    /// # Errors
    /// * `EmailExists` - Email is already registered
    /// * `PhoneExists` - Phone number is already registered
    /// * `MissingSecrets` - Secret or confirmation absent or empty
    /// * `SecretMismatch` - Secret and confirmation differ
    /// * `RoleNotFound` - Default role is not provisioned
    /// * `DatabaseError` - Database operation failed
    async fn register(&self, command: RegisterAccountCommand) -> Result<Account, IdentityError>;

    /// Retrieve account by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `DatabaseError` - Database operation failed
    async fn get_account(&self, id: &AccountId) -> Result<Account, IdentityError>;

    /// Replace the secret of an account after verifying the current one.
    ///
    /// # Errors
    /// * `SecretMismatch` - New secret and confirmation differ
    /// * `NotFound` - Account does not exist
    /// * `InvalidCurrentSecret` - Current secret does not verify
    /// * `DatabaseError` - Database operation failed
    async fn change_secret(
        &self,
        id: &AccountId,
        command: ChangeSecretCommand,
    ) -> Result<(), IdentityError>;

    /// Disable an enabled account.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `AlreadyDeactivated` - Account is already disabled
    async fn deactivate(&self, id: &AccountId) -> Result<(), IdentityError>;

    /// Re-enable a disabled account.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `AlreadyActivated` - Account is already enabled
    async fn reactivate(&self, id: &AccountId) -> Result<(), IdentityError>;

    /// Record that the account holder asked for deletion.
    ///
    /// Idempotent: the first request timestamp is kept.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    async fn schedule_deletion(&self, id: &AccountId) -> Result<(), IdentityError>;
}

/// Persistence operations for account aggregate.
#[async_trait]
pub trait AccountRepository: Send + Sync + 'static {
    /// Persist new account and its role grants atomically.
    ///
    /// # Errors
    /// * `EmailExists` - Email is already registered
    /// * `PhoneExists` - Phone number is already registered
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, account: Account) -> Result<Account, IdentityError>;

    /// Retrieve account by identifier.
    ///
    /// # Returns
    /// Optional account entity (None if not found)
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, IdentityError>;

    /// Retrieve account by normalized email address.
    ///
    /// # Returns
    /// Optional account entity (None if not found)
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Account>, IdentityError>;

    async fn exists_by_email(&self, email: &EmailAddress) -> Result<bool, IdentityError>;

    async fn exists_by_phone(&self, phone_number: &PhoneNumber) -> Result<bool, IdentityError>;

    /// Set the enabled flag if it differs from `enabled`.
    ///
    /// Check and write happen as one store operation.
    ///
    /// # Returns
    /// `false` when the account already had the requested state
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `DatabaseError` - Database operation failed
    async fn set_enabled(
        &self,
        id: &AccountId,
        enabled: bool,
        at: DateTime<Utc>,
    ) -> Result<bool, IdentityError>;

    /// Swap the stored secret hash for `new_hash` and clear `credentials_expired`,
    /// provided the stored hash still equals `expected_hash`.
    ///
    /// # Returns
    /// `false` when the secret was changed by someone else in the meantime
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `DatabaseError` - Database operation failed
    async fn replace_secret_hash(
        &self,
        id: &AccountId,
        expected_hash: &str,
        new_hash: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, IdentityError>;

    /// Record a deletion request unless one is already recorded.
    ///
    /// # Returns
    /// `false` when an earlier request is kept
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `DatabaseError` - Database operation failed
    async fn mark_deletion_requested(
        &self,
        id: &AccountId,
        at: DateTime<Utc>,
    ) -> Result<bool, IdentityError>;
}

/// Persistence operations for roles.
#[async_trait]
pub trait RoleRepository: Send + Sync + 'static {
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, IdentityError>;

    /// Persist a new role.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed, including duplicate names
    async fn save(&self, role: Role) -> Result<Role, IdentityError>;
}

/// One-way secret hashing.
///
/// Implementations are CPU bound and carry no I/O.
pub trait CredentialHasher: Send + Sync + 'static {
    /// Produce a salted, self-describing hash of `secret`.
    fn hash(&self, secret: &str) -> Result<String, IdentityError>;

    /// Check `secret` against a hash produced by [`CredentialHasher::hash`].
    ///
    /// A malformed hash verifies as `false` rather than failing.
    fn verify(&self, secret: &str, hash: &str) -> bool;
}
