use crate::account::{Account, IdentitySchema};
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, error, instrument};

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write. `field` names the conflicting
    /// column when the backend reports it. A race lost at write time is a
    /// legitimate "already exists" outcome, not a fault
    #[error("duplicate key")]
    DuplicateKey { field: Option<String> },

    /// The durable backend could not be reached or failed the operation
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Durable collection of accounts keyed by the schema's unique fields.
/// Uniqueness is guaranteed by the store's own constraints at write time, a
/// prior lookup only buys a friendlier error.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Exact-match lookup on a single identity field
    async fn find_by_field(&self, field: &str, value: &str)
        -> Result<Option<Account>, StoreError>;

    /// Atomically insert a new account, all fields or nothing
    async fn create(
        &self,
        fields: &HashMap<String, String>,
        password_hash: &str,
    ) -> Result<Account, StoreError>;
}

/// `PostgreSQL` implementation. The `accounts` table carries one column per
/// schema field plus a unique constraint per field (see db/accounts.sql).
pub struct PgAccountStore {
    pool: PgPool,
    schema: IdentitySchema,
}

impl PgAccountStore {
    #[must_use]
    pub const fn new(pool: PgPool, schema: IdentitySchema) -> Self {
        Self { pool, schema }
    }

    fn account_from_row(&self, row: &sqlx::postgres::PgRow) -> Result<Account, sqlx::Error> {
        let mut fields = HashMap::new();

        for field in self.schema.fields() {
            fields.insert(field.clone(), row.try_get(field.as_str())?);
        }

        Ok(Account {
            id: row.try_get("id")?,
            fields,
            password_hash: row.try_get("password_hash")?,
        })
    }
}

impl std::fmt::Debug for PgAccountStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgAccountStore")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    #[instrument(skip(value))]
    async fn find_by_field(
        &self,
        field: &str,
        value: &str,
    ) -> Result<Option<Account>, StoreError> {
        // schema names are validated identifiers, safe to interpolate
        if !self.schema.contains(field) {
            return Err(StoreError::Unavailable(format!(
                "unknown identity field: {field}"
            )));
        }

        let columns = self.schema.fields().join(", ");
        let query = format!(
            "SELECT id, password_hash, {columns} FROM accounts WHERE {field} = $1"
        );

        match sqlx::query(&query).bind(value).fetch_optional(&self.pool).await {
            Ok(Some(row)) => self
                .account_from_row(&row)
                .map(Some)
                .map_err(|e| StoreError::Unavailable(e.to_string())),
            Ok(None) => Ok(None),
            Err(e) => {
                error!("Account lookup failed: {e}");

                Err(StoreError::Unavailable(e.to_string()))
            }
        }
    }

    #[instrument(skip(fields, password_hash))]
    async fn create(
        &self,
        fields: &HashMap<String, String>,
        password_hash: &str,
    ) -> Result<Account, StoreError> {
        let columns = self.schema.fields().join(", ");
        let placeholders = (1..=self.schema.fields().len() + 1)
            .map(|n| format!("${n}"))
            .collect::<Vec<_>>()
            .join(", ");

        let query = format!(
            "INSERT INTO accounts ({columns}, password_hash) VALUES ({placeholders}) RETURNING id"
        );

        let mut insert = sqlx::query(&query);

        for field in self.schema.fields() {
            insert = insert.bind(fields.get(field).map(String::as_str).unwrap_or_default());
        }

        match insert.bind(password_hash).fetch_one(&self.pool).await {
            Ok(row) => {
                let id: i64 = row
                    .try_get("id")
                    .map_err(|e| StoreError::Unavailable(e.to_string()))?;

                debug!("account created: {id}");

                Ok(Account {
                    id,
                    fields: fields.clone(),
                    password_hash: password_hash.to_string(),
                })
            }
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StoreError::DuplicateKey {
                    field: conflict_field(&self.schema, db.constraint()),
                })
            }
            Err(e) => {
                error!("Account insert failed: {e}");

                Err(StoreError::Unavailable(e.to_string()))
            }
        }
    }
}

/// Map a unique-constraint name back to the schema field it guards,
/// example: `accounts_email_key` -> `email`
fn conflict_field(schema: &IdentitySchema, constraint: Option<&str>) -> Option<String> {
    let constraint = constraint?;

    schema
        .fields()
        .iter()
        .find(|field| constraint.contains(field.as_str()))
        .cloned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_field_from_constraint_name() {
        let schema = IdentitySchema::parse("username,email").unwrap();

        assert_eq!(
            conflict_field(&schema, Some("accounts_email_key")),
            Some("email".to_string())
        );
        assert_eq!(
            conflict_field(&schema, Some("accounts_username_key")),
            Some("username".to_string())
        );
        assert_eq!(conflict_field(&schema, Some("accounts_pkey")), None);
        assert_eq!(conflict_field(&schema, None), None);
    }
}
