use crate::account::{AccountError, AccountStore, CredentialHasher, IdentitySchema};
use std::sync::Arc;
use tracing::{debug, error, instrument};

/// Sign-in: look up the account by its login field and verify the password.
/// An unknown identity and a wrong password yield the same outcome so
/// accounts cannot be enumerated.
pub struct AuthenticationService {
    store: Arc<dyn AccountStore>,
    hasher: CredentialHasher,
    login_field: String,
}

impl AuthenticationService {
    #[must_use]
    pub fn new(schema: &IdentitySchema, store: Arc<dyn AccountStore>, hasher: CredentialHasher) -> Self {
        Self {
            store,
            hasher,
            login_field: schema.login_field().to_string(),
        }
    }

    #[must_use]
    pub fn login_field(&self) -> &str {
        &self.login_field
    }

    /// # Errors
    /// `Validation` on empty input, `InvalidCredentials` on unknown identity
    /// or password mismatch, `Internal` on store or hash-record failure
    #[instrument(skip_all)]
    pub async fn authenticate(&self, identity: &str, password: &str) -> Result<(), AccountError> {
        if identity.trim().is_empty() {
            return Err(AccountError::Validation(self.login_field.clone()));
        }

        if password.trim().is_empty() {
            return Err(AccountError::Validation("password".to_string()));
        }

        let account = match self.store.find_by_field(&self.login_field, identity).await {
            Ok(Some(account)) => account,
            Ok(None) => {
                debug!("unknown {}", self.login_field);

                return Err(AccountError::InvalidCredentials);
            }
            Err(e) => {
                error!("Account lookup failed: {e}");

                return Err(AccountError::Internal);
            }
        };

        match self.hasher.verify(password, &account.password_hash) {
            Ok(true) => {
                debug!("login successful");

                Ok(())
            }
            Ok(false) => Err(AccountError::InvalidCredentials),
            Err(e) => {
                error!("Stored hash rejected: {e}");

                Err(AccountError::Internal)
            }
        }
    }
}
