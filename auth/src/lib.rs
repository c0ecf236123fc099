//! Authentication utilities library
//!
//! Provides reusable credential and token infrastructure:
//! - Password hashing (Argon2id)
//! - JWT encoding and decoding
//! - Access/refresh token issuance, validation and redemption
//! - Injectable clock for deterministic expiry
//!
//! Services define their own ports and adapt these implementations.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Token Lifecycle
//! ```
//! use auth::{TokenPolicy, TokenService};
//!
//! let tokens = TokenService::new(b"secret_key_at_least_32_bytes_long!", TokenPolicy::default());
//!
//! let access_token = tokens.issue_access_token("alice@example.com").unwrap();
//! let refresh_token = tokens.issue_refresh_token("alice@example.com").unwrap();
//!
//! let claims = tokens.validate_access_token(&access_token).unwrap();
//! assert_eq!(claims.sub, "alice@example.com");
//!
//! // Refresh tokens buy new access tokens, never the other way round
//! let renewed = tokens.redeem_refresh_token(&refresh_token).unwrap();
//! assert!(tokens.redeem_refresh_token(&renewed).is_err());
//! ```

pub mod clock;
pub mod jwt;
pub mod password;
pub mod token_service;

// Re-export commonly used items
pub use clock::Clock;
pub use clock::ManualClock;
pub use clock::SystemClock;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::TokenKind;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use token_service::TokenPolicy;
pub use token_service::TokenService;
