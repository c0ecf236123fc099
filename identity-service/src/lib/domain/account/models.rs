use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;
use uuid::Uuid;

use crate::account::errors::EmailError;
use crate::account::errors::PersonNameError;
use crate::account::errors::PhoneNumberError;

/// Account aggregate entity.
///
/// A registered principal together with its credential state, status flags
/// and granted roles.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: AccountId,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub email: EmailAddress,
    pub phone_number: PhoneNumber,
    pub secret_hash: String,
    pub date_of_birth: Option<NaiveDate>,
    pub profile_picture_url: Option<String>,
    pub enabled: bool,
    pub account_locked: bool,
    pub credentials_expired: bool,
    pub email_verified: bool,
    pub phone_verified: bool,
    pub roles: Vec<Role>,
    pub deletion_requested_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Account {
    /// Role names granted to this account, in grant order.
    pub fn authorities(&self) -> Vec<String> {
        self.roles.iter().map(|role| role.name.clone()).collect()
    }
}

/// Account unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountId(pub Uuid);

impl AccountId {
    /// Generate a new random account ID.
    ///
    /// # Returns
    /// AccountId with random UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Stored trimmed and lowercased so that lookups and uniqueness checks are
/// case-insensitive. Format is validated with an RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated, normalized email address.
    ///
    /// # Arguments
    /// * `email` - Raw email string
    ///
    /// # Returns
    /// Validated EmailAddress value object
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        let normalized = email.trim().to_lowercase();
        email_address::EmailAddress::from_str(&normalized)
            .map(|_| EmailAddress(normalized))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    /// Get email as string slice.
    ///
    /// # Returns
    /// Email string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Phone number value type
///
/// Digits only, with an optional leading `+`, at most 15 digits (E.164).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    const MAX_DIGITS: usize = 15;

    pub fn new(phone_number: String) -> Result<Self, PhoneNumberError> {
        let trimmed = phone_number.trim();
        let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);

        if digits.is_empty() {
            return Err(PhoneNumberError::Empty);
        }
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(PhoneNumberError::InvalidCharacters);
        }
        if digits.len() > Self::MAX_DIGITS {
            return Err(PhoneNumberError::TooLong {
                max: Self::MAX_DIGITS,
                actual: digits.len(),
            });
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// First or last name of an account holder.
///
/// Non-blank, trimmed, at most 100 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName(String);

impl PersonName {
    const MAX_LENGTH: usize = 100;

    pub fn new(name: String) -> Result<Self, PersonNameError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(PersonNameError::Blank);
        }

        let length = trimmed.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(PersonNameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Role unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoleId(pub Uuid);

impl RoleId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RoleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Named authority that can be granted to accounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Role {
    /// Construct a new role with a fresh identifier.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: RoleId::new(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}

/// Command to register a new account with domain types.
///
/// Secrets are kept optional so the service can distinguish a missing secret
/// from a mismatched one. Empty strings count as missing.
#[derive(Debug)]
pub struct RegisterAccountCommand {
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub email: EmailAddress,
    pub phone_number: PhoneNumber,
    pub secret: Option<String>,
    pub confirm_secret: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

impl RegisterAccountCommand {
    /// Both secrets, or `None` when either is absent or empty.
    pub fn secrets(&self) -> Option<(&str, &str)> {
        let secret = self.secret.as_deref().filter(|s| !s.is_empty())?;
        let confirm = self.confirm_secret.as_deref().filter(|s| !s.is_empty())?;
        Some((secret, confirm))
    }
}

/// Command to replace the secret of an authenticated account.
#[derive(Debug)]
pub struct ChangeSecretCommand {
    pub current_secret: String,
    pub new_secret: String,
    pub confirm_new_secret: String,
}

impl ChangeSecretCommand {
    pub fn new(current_secret: String, new_secret: String, confirm_new_secret: String) -> Self {
        Self {
            current_secret,
            new_secret,
            confirm_new_secret,
        }
    }
}
