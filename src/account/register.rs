use crate::account::{
    AccountError, AccountIdentity, AccountStore, ChallengeVerifier, CredentialHasher,
    IdentitySchema, StoreError,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, instrument};

/// Orchestrates new-account creation: presence validation, optional challenge
/// verification, per-field uniqueness pre-checks, hashing, and one atomic
/// write. First failure wins, at most one account is persisted and at most
/// one challenge call goes out per attempt.
pub struct RegistrationService {
    schema: IdentitySchema,
    store: Arc<dyn AccountStore>,
    hasher: CredentialHasher,
    challenge: Option<Arc<dyn ChallengeVerifier>>,
}

impl RegistrationService {
    #[must_use]
    pub fn new(
        schema: IdentitySchema,
        store: Arc<dyn AccountStore>,
        hasher: CredentialHasher,
        challenge: Option<Arc<dyn ChallengeVerifier>>,
    ) -> Self {
        Self {
            schema,
            store,
            hasher,
            challenge,
        }
    }

    /// # Errors
    /// Returns one of the `AccountError` outcomes, see the variant docs
    #[instrument(skip_all)]
    pub async fn register(
        &self,
        fields: &HashMap<String, String>,
        password: &str,
        challenge_token: Option<&str>,
    ) -> Result<AccountIdentity, AccountError> {
        // 1. presence: every schema field, the password, and the challenge
        //    token when a verifier is configured
        let mut values = HashMap::new();

        for field in self.schema.fields() {
            match fields.get(field).map(String::as_str) {
                Some(value) if !value.trim().is_empty() => {
                    values.insert(field.clone(), value.to_string());
                }
                _ => return Err(AccountError::Validation(field.clone())),
            }
        }

        if password.trim().is_empty() {
            return Err(AccountError::Validation("password".to_string()));
        }

        let token = match &self.challenge {
            Some(_) => match challenge_token {
                Some(token) if !token.trim().is_empty() => Some(token),
                _ => return Err(AccountError::Validation("challengeToken".to_string())),
            },
            None => None,
        };

        // 2. challenge, fail closed on any error
        if let (Some(verifier), Some(token)) = (&self.challenge, token) {
            match verifier.verify(token).await {
                Ok(true) => debug!("challenge passed"),
                Ok(false) => return Err(AccountError::ChallengeFailed),
                Err(e) => {
                    error!("Challenge verification error: {e}");

                    return Err(AccountError::ChallengeFailed);
                }
            }
        }

        // 3. uniqueness pre-checks in declared order, first conflict wins.
        //    This is only the fast path, the store constraint is the guarantee
        for field in self.schema.fields() {
            match self.store.find_by_field(field, &values[field]).await {
                Ok(Some(_)) => {
                    return Err(AccountError::Duplicate {
                        field: Some(field.clone()),
                    })
                }
                Ok(None) => (),
                Err(e) => {
                    error!("Uniqueness check failed: {e}");

                    return Err(AccountError::Internal);
                }
            }
        }

        // 4. hash
        let password_hash = self.hasher.hash(password).map_err(|e| {
            error!("Password hashing failed: {e}");

            AccountError::Internal
        })?;

        // 5. write; a unique violation here means the race was lost and maps
        //    to the same outcome as the pre-check
        match self.store.create(&values, &password_hash).await {
            Ok(account) => Ok(account.into()),
            Err(StoreError::DuplicateKey { field }) => Err(AccountError::Duplicate { field }),
            Err(e) => {
                error!("Account creation failed: {e}");

                Err(AccountError::Internal)
            }
        }
    }
}
