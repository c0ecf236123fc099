use crate::account::ports::CredentialHasher;
use crate::errors::IdentityError;

impl CredentialHasher for auth::PasswordHasher {
    fn hash(&self, secret: &str) -> Result<String, IdentityError> {
        auth::PasswordHasher::hash(self, secret).map_err(IdentityError::from)
    }

    fn verify(&self, secret: &str, hash: &str) -> bool {
        match auth::PasswordHasher::verify(self, secret, hash) {
            Ok(valid) => valid,
            Err(e) => {
                tracing::warn!("Stored secret hash could not be parsed: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> auth::PasswordHasher {
        auth::PasswordHasher::with_params(8192, 1, 1).unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = hasher();
        let hash = CredentialHasher::hash(&hasher, "hunter22").unwrap();

        assert_ne!(hash, "hunter22");
        assert!(CredentialHasher::verify(&hasher, "hunter22", &hash));
        assert!(!CredentialHasher::verify(&hasher, "hunter23", &hash));
    }

    #[test]
    fn test_malformed_hash_does_not_verify() {
        assert!(!CredentialHasher::verify(&hasher(), "hunter22", "not-a-phc-string"));
    }
}
