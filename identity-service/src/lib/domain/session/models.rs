use crate::account::models::Account;
use crate::account::models::AccountId;

/// Credentials presented at login.
#[derive(Debug)]
pub struct LoginCommand {
    pub identity: String,
    pub secret: String,
}

impl LoginCommand {
    pub fn new(identity: String, secret: String) -> Self {
        Self { identity, secret }
    }
}

/// Access and refresh tokens handed to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

impl TokenPair {
    pub const BEARER: &'static str = "Bearer";

    pub fn bearer(access_token: String, refresh_token: String) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: Self::BEARER.to_string(),
        }
    }
}

/// Authenticated caller resolved from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub account_id: AccountId,
    pub email: String,
    pub authorities: Vec<String>,
}

impl From<&Account> for Principal {
    fn from(account: &Account) -> Self {
        Self {
            account_id: account.id,
            email: account.email.as_str().to_string(),
            authorities: account.authorities(),
        }
    }
}
