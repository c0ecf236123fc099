use thiserror::Error;

use crate::domain::account::errors::EmailError;
use crate::domain::account::errors::PersonNameError;
use crate::domain::account::errors::PhoneNumberError;

/// Top-level error for all identity operations.
///
/// Messages are safe to show to callers. `BadCredentials` covers both an
/// unknown identity and a wrong secret.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    // Value object validation errors (automatically converted via #[from])
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Invalid phone number: {0}")]
    InvalidPhoneNumber(#[from] PhoneNumberError),

    #[error("Invalid name: {0}")]
    InvalidName(#[from] PersonNameError),

    // Authentication errors
    #[error("Username or password is incorrect")]
    BadCredentials,

    #[error("This account is disabled. Please contact support")]
    AccountDisabled,

    #[error("This account is locked. Please contact support")]
    AccountLocked,

    #[error("Credentials have expired. Please change your password")]
    CredentialsExpired,

    // Registration and account errors
    #[error("This email is already in use")]
    EmailExists,

    #[error("This phone number is already in use")]
    PhoneExists,

    #[error("Password and confirm password are required")]
    MissingSecrets,

    #[error("Passwords do not match")]
    SecretMismatch,

    #[error("Current password is incorrect")]
    InvalidCurrentSecret,

    #[error("Account is already deactivated")]
    AlreadyDeactivated,

    #[error("Account is already activated")]
    AlreadyActivated,

    #[error("Account not found: {0}")]
    NotFound(String),

    #[error("Role does not exist: {0}")]
    RoleNotFound(String),

    // Token errors
    #[error("Token is invalid")]
    TokenInvalid,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token cannot be used for this operation")]
    TokenWrongType,

    // Infrastructure errors
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IdentityError {
    /// Stable machine-readable code for the error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            IdentityError::InvalidEmail(_) => "INVALID_EMAIL",
            IdentityError::InvalidPhoneNumber(_) => "INVALID_PHONE_NUMBER",
            IdentityError::InvalidName(_) => "INVALID_NAME",
            IdentityError::BadCredentials => "BAD_CREDENTIALS",
            IdentityError::AccountDisabled => "ERR_USER_DISABLED",
            IdentityError::AccountLocked => "ERR_USER_LOCKED",
            IdentityError::CredentialsExpired => "ERR_CREDENTIALS_EXPIRED",
            IdentityError::EmailExists => "EMAIL_ALREADY_EXISTS",
            IdentityError::PhoneExists => "PHONE_ALREADY_EXISTS",
            IdentityError::MissingSecrets => "MISSING_PASSWORDS",
            IdentityError::SecretMismatch => "PASSWORD_MISMATCH",
            IdentityError::InvalidCurrentSecret => "INVALID_CURRENT_PASSWORD",
            IdentityError::AlreadyDeactivated => "ACCOUNT_ALREADY_DEACTIVATED",
            IdentityError::AlreadyActivated => "ACCOUNT_ALREADY_ACTIVATED",
            IdentityError::NotFound(_) => "USER_NOT_FOUND",
            IdentityError::RoleNotFound(_) => "ROLE_NOT_FOUND",
            IdentityError::TokenInvalid => "TOKEN_INVALID",
            IdentityError::TokenExpired => "TOKEN_EXPIRED",
            IdentityError::TokenWrongType => "TOKEN_WRONG_TYPE",
            IdentityError::DatabaseError(_) | IdentityError::Internal(_) => "INTERNAL_EXCEPTION",
        }
    }

    /// Misconfiguration or unexpected failure rather than a caller mistake.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            IdentityError::RoleNotFound(_)
                | IdentityError::DatabaseError(_)
                | IdentityError::Internal(_)
        )
    }
}

impl From<auth::JwtError> for IdentityError {
    fn from(err: auth::JwtError) -> Self {
        match err {
            auth::JwtError::TokenExpired => IdentityError::TokenExpired,
            auth::JwtError::WrongTokenType { .. } => IdentityError::TokenWrongType,
            auth::JwtError::InvalidToken(_) | auth::JwtError::DecodingFailed(_) => {
                IdentityError::TokenInvalid
            }
            auth::JwtError::EncodingFailed(msg) => {
                IdentityError::Internal(format!("Token generation failed: {}", msg))
            }
        }
    }
}

impl From<auth::PasswordError> for IdentityError {
    fn from(err: auth::PasswordError) -> Self {
        IdentityError::Internal(err.to_string())
    }
}
