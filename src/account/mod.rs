pub mod challenge;
pub mod hasher;
pub mod login;
pub mod register;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use self::challenge::{ChallengeError, ChallengeVerifier, RecaptchaVerifier};
pub use self::hasher::CredentialHasher;
pub use self::login::AuthenticationService;
pub use self::register::RegistrationService;
pub use self::store::{AccountStore, PgAccountStore, StoreError};

use anyhow::{anyhow, Result};
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

/// Ordered list of identity fields, each independently unique across all
/// accounts. Field names double as column names in the durable store.
#[derive(Debug, Clone)]
pub struct IdentitySchema {
    fields: Vec<String>,
}

impl IdentitySchema {
    /// # Errors
    /// Returns an error if the list is empty, contains duplicates, or a name
    /// is not a plain lowercase identifier
    pub fn new(fields: Vec<String>) -> Result<Self> {
        if fields.is_empty() {
            return Err(anyhow!("identity schema requires at least one field"));
        }

        for field in &fields {
            if !is_identifier(field) {
                return Err(anyhow!("invalid identity field name: {field}"));
            }

            if fields.iter().filter(|f| *f == field).count() > 1 {
                return Err(anyhow!("duplicate identity field: {field}"));
            }
        }

        Ok(Self { fields })
    }

    /// Parse a comma-separated field list, example: "username,email"
    ///
    /// # Errors
    /// Returns an error if the list is not a valid schema
    pub fn parse(list: &str) -> Result<Self> {
        Self::new(
            list.split(',')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(ToString::to_string)
                .collect(),
        )
    }

    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f == name)
    }

    /// Field used for sign-in: `email` when declared, else the first field
    #[must_use]
    pub fn login_field(&self) -> &str {
        self.fields
            .iter()
            .find(|f| f.as_str() == "email")
            .unwrap_or(&self.fields[0])
    }
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_lowercase() || c == '_')
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Persisted account: store-assigned id, unique identity fields, and the
/// hashed password. The raw password never appears here.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: i64,
    pub fields: HashMap<String, String>,
    pub password_hash: String,
}

/// Public identity of an account, safe to return to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountIdentity {
    pub id: i64,
    pub fields: HashMap<String, String>,
}

impl From<Account> for AccountIdentity {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            fields: account.fields,
        }
    }
}

/// Outcomes the services report across the transport boundary. Internal
/// failures are logged where they happen and collapse to `Internal`, detail
/// never crosses over.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccountError {
    /// A required field was missing or empty; nothing was performed
    #[error("missing required field: {0}")]
    Validation(String),

    /// A unique identity field already holds this value. `field` is `None`
    /// when the store reported a conflict without naming the column
    #[error("duplicate identity field")]
    Duplicate { field: Option<String> },

    /// Challenge not satisfied: explicit failure, unreachable verifier, or a
    /// malformed verifier response all land here (fail closed)
    #[error("challenge verification failed")]
    ChallengeFailed,

    /// Unknown identity value or wrong password, deliberately
    /// indistinguishable
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Store or hasher failure, surfaced to callers without detail
    #[error("internal error")]
    Internal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_parse() {
        let schema = IdentitySchema::parse("username, email").unwrap();
        assert_eq!(schema.fields(), ["username", "email"]);
        assert!(schema.contains("email"));
        assert!(!schema.contains("phone"));
    }

    #[test]
    fn test_schema_rejects_empty() {
        assert!(IdentitySchema::parse("").is_err());
        assert!(IdentitySchema::new(vec![]).is_err());
    }

    #[test]
    fn test_schema_rejects_duplicates() {
        assert!(IdentitySchema::parse("email,email").is_err());
    }

    #[test]
    fn test_schema_rejects_unsafe_names() {
        assert!(IdentitySchema::parse("email;drop table accounts").is_err());
        assert!(IdentitySchema::parse("Email").is_err());
        assert!(IdentitySchema::parse("e mail").is_err());
        assert!(IdentitySchema::parse("1email").is_err());
    }

    #[test]
    fn test_login_field_prefers_email() {
        let schema = IdentitySchema::parse("username,email").unwrap();
        assert_eq!(schema.login_field(), "email");

        let schema = IdentitySchema::parse("username").unwrap();
        assert_eq!(schema.login_field(), "username");
    }
}
