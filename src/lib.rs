//! # accesso
//!
//! Minimal account-credential service: registers accounts with unique
//! identity fields, stores bcrypt-hashed passwords, authenticates returning
//! users, and optionally gates registration behind a CAPTCHA-style challenge.
//!
//! The credential core lives in [`account`]: an [`account::AccountStore`]
//! abstraction over `PostgreSQL`, a bcrypt [`account::CredentialHasher`], a
//! [`account::ChallengeVerifier`] for the external human-presence check, and
//! the registration/authentication services that orchestrate them. All
//! collaborators are injected at startup so tests run against in-memory
//! fakes.
//!
//! Uniqueness is enforced by the store's unique constraints at write time,
//! the service-level pre-check only produces a friendlier error for the
//! common case.

pub mod accesso;
pub mod account;
pub mod cli;
