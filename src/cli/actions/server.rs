use crate::accesso;
use crate::account::{ChallengeVerifier, IdentitySchema, RecaptchaVerifier};
use crate::cli::actions::Action;
use anyhow::{Context, Result};
use std::sync::Arc;
use url::Url;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server {
            port,
            dsn,
            identity_fields,
            challenge_secret,
            challenge_url,
            cors_origin,
        } => {
            // fail fast on a malformed connection string
            Url::parse(&dsn).context("Invalid database connection string")?;

            let schema = IdentitySchema::parse(&identity_fields)?;

            // no secret, no challenge gate
            let challenge = challenge_secret.map(|secret| {
                Arc::new(RecaptchaVerifier::new(challenge_url, secret))
                    as Arc<dyn ChallengeVerifier>
            });

            accesso::new(port, dsn, schema, challenge, cors_origin).await?;
        }
    }

    Ok(())
}
