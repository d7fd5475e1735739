use thiserror::Error;
use tracing::error;

/// Fixed work factor for production hashing
pub const HASH_COST: u32 = 10;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("failed to hash password: {0}")]
    Hash(#[source] bcrypt::BcryptError),

    /// The stored record is not a valid hash, a mismatched password never
    /// produces this
    #[error("malformed password hash")]
    MalformedHash,
}

/// One-way salted password hashing (bcrypt). Every call picks a fresh random
/// salt, so hashing the same password twice yields different records.
#[derive(Debug, Clone, Copy)]
pub struct CredentialHasher {
    cost: u32,
}

impl CredentialHasher {
    #[must_use]
    pub const fn new() -> Self {
        Self { cost: HASH_COST }
    }

    /// Lower costs are for tests only
    #[must_use]
    pub const fn with_cost(cost: u32) -> Self {
        Self { cost }
    }

    /// # Errors
    /// Returns `HashError::Hash` if the backend rejects the input
    pub fn hash(&self, password: &str) -> Result<String, HashError> {
        bcrypt::hash(password, self.cost).map_err(HashError::Hash)
    }

    /// Constant-time verification against a stored record. A wrong password
    /// returns `Ok(false)`.
    ///
    /// # Errors
    /// Returns `HashError::MalformedHash` if `hash` is structurally invalid
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, HashError> {
        match bcrypt::verify(password, hash) {
            Ok(matched) => Ok(matched),
            Err(e) => {
                error!("Invalid password hash record: {e}");

                Err(HashError::MalformedHash)
            }
        }
    }
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn hasher() -> CredentialHasher {
        // keep tests fast
        CredentialHasher::with_cost(crate::account::testing::MIN_COST)
    }

    #[test]
    fn test_hash_then_verify_round_trip() {
        let hasher = hasher();
        let record = hasher.hash("Secret1").unwrap();

        assert_ne!(record, "Secret1");
        assert!(hasher.verify("Secret1", &record).unwrap());
        assert!(!hasher.verify("wrong", &record).unwrap());
        assert!(!hasher.verify("", &record).unwrap());
    }

    #[test]
    fn test_salt_randomness() {
        let hasher = hasher();
        let one = hasher.hash("Secret1").unwrap();
        let two = hasher.hash("Secret1").unwrap();

        assert_ne!(one, two);
        assert!(hasher.verify("Secret1", &one).unwrap());
        assert!(hasher.verify("Secret1", &two).unwrap());
    }

    #[test]
    fn test_malformed_record() {
        let hasher = hasher();

        assert!(matches!(
            hasher.verify("Secret1", "not-a-bcrypt-record"),
            Err(HashError::MalformedHash)
        ));
    }
}
