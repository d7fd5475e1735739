//! In-memory collaborators for service tests.

use crate::account::{
    Account, AccountStore, ChallengeError, ChallengeVerifier, IdentitySchema, StoreError,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// bcrypt's minimum work factor; the bcrypt crate keeps its own `MIN_COST`
/// private
pub(crate) const MIN_COST: u32 = 4;

/// Account store backed by a `Vec` under a lock. `create` enforces the
/// schema's unique fields atomically, like the real store's constraints.
pub(crate) struct MemoryStore {
    schema: IdentitySchema,
    accounts: Mutex<Vec<Account>>,
    lookups: AtomicUsize,
    created: AtomicUsize,
}

impl MemoryStore {
    pub(crate) fn new(schema: IdentitySchema) -> Self {
        Self {
            schema,
            accounts: Mutex::new(Vec::new()),
            lookups: AtomicUsize::new(0),
            created: AtomicUsize::new(0),
        }
    }

    pub(crate) fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub(crate) fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn find_by_field(
        &self,
        field: &str,
        value: &str,
    ) -> Result<Option<Account>, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        let accounts = self.accounts.lock().await;

        Ok(accounts
            .iter()
            .find(|a| a.fields.get(field).is_some_and(|v| v == value))
            .cloned())
    }

    async fn create(
        &self,
        fields: &HashMap<String, String>,
        password_hash: &str,
    ) -> Result<Account, StoreError> {
        let mut accounts = self.accounts.lock().await;

        for field in self.schema.fields() {
            let value = fields.get(field).map(String::as_str).unwrap_or_default();

            if accounts
                .iter()
                .any(|a| a.fields.get(field).is_some_and(|v| v == value))
            {
                return Err(StoreError::DuplicateKey {
                    field: Some(field.clone()),
                });
            }
        }

        let account = Account {
            id: i64::try_from(accounts.len()).unwrap_or_default() + 1,
            fields: fields.clone(),
            password_hash: password_hash.to_string(),
        };

        accounts.push(account.clone());
        self.created.fetch_add(1, Ordering::SeqCst);

        Ok(account)
    }
}

/// Store whose lookups never see existing accounts, forcing the
/// check-then-create race to be resolved by `create` alone.
pub(crate) struct RacingStore {
    inner: Arc<MemoryStore>,
}

impl RacingStore {
    pub(crate) fn new(inner: Arc<MemoryStore>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl AccountStore for RacingStore {
    async fn find_by_field(
        &self,
        _field: &str,
        _value: &str,
    ) -> Result<Option<Account>, StoreError> {
        Ok(None)
    }

    async fn create(
        &self,
        fields: &HashMap<String, String>,
        password_hash: &str,
    ) -> Result<Account, StoreError> {
        self.inner.create(fields, password_hash).await
    }
}

/// Store where the backend is down.
pub(crate) struct UnavailableStore;

#[async_trait]
impl AccountStore for UnavailableStore {
    async fn find_by_field(
        &self,
        _field: &str,
        _value: &str,
    ) -> Result<Option<Account>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn create(
        &self,
        _fields: &HashMap<String, String>,
        _password_hash: &str,
    ) -> Result<Account, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

/// Scripted challenge verifier.
pub(crate) enum FakeChallenge {
    Pass,
    Fail,
    Unreachable,
}

#[async_trait]
impl ChallengeVerifier for FakeChallenge {
    async fn verify(&self, _token: &str) -> Result<bool, ChallengeError> {
        match self {
            Self::Pass => Ok(true),
            Self::Fail => Ok(false),
            Self::Unreachable => Err(ChallengeError::Unreachable(
                "connection timed out".to_string(),
            )),
        }
    }
}
