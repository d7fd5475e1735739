use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, instrument};

static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

/// Timeout for the verification call, a slow verifier counts as unreachable
pub const VERIFY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum ChallengeError {
    /// Network error or timeout reaching the verification endpoint
    #[error("challenge verifier unreachable: {0}")]
    Unreachable(String),

    /// The endpoint answered with a non-success status or a malformed body
    #[error("challenge verifier protocol error: {0}")]
    Protocol(String),
}

/// Human-presence verification. One attempt per call, no internal retry,
/// callers treat every error as "not verified".
#[async_trait]
pub trait ChallengeVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<bool, ChallengeError>;
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    success: bool,
}

/// reCAPTCHA-style verifier: posts the challenge token plus the server-held
/// secret and reads the `success` field of the response.
pub struct RecaptchaVerifier {
    url: String,
    secret: SecretString,
}

impl RecaptchaVerifier {
    #[must_use]
    pub const fn new(url: String, secret: SecretString) -> Self {
        Self { url, secret }
    }
}

impl std::fmt::Debug for RecaptchaVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecaptchaVerifier")
            .field("url", &self.url)
            .field("secret", &"***")
            .finish()
    }
}

#[async_trait]
impl ChallengeVerifier for RecaptchaVerifier {
    #[instrument(skip(token))]
    async fn verify(&self, token: &str) -> Result<bool, ChallengeError> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(VERIFY_TIMEOUT)
            .build()
            .map_err(|e| ChallengeError::Unreachable(e.to_string()))?;

        let response = client
            .post(&self.url)
            .form(&[
                ("secret", self.secret.expose_secret()),
                ("response", token),
            ])
            .send()
            .await
            .map_err(|e| {
                error!("Challenge verification request failed: {e}");

                ChallengeError::Unreachable(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();

            error!("Challenge verifier returned {status}");

            return Err(ChallengeError::Protocol(format!(
                "{} - {status}",
                self.url
            )));
        }

        let verdict: VerifyResponse = response.json().await.map_err(|e| {
            error!("Malformed challenge verifier response: {e}");

            ChallengeError::Protocol(e.to_string())
        })?;

        debug!("challenge verified: {}", verdict.success);

        Ok(verdict.success)
    }
}
