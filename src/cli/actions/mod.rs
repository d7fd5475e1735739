pub mod server;

use secrecy::SecretString;

#[derive(Debug)]
pub enum Action {
    Server {
        port: u16,
        dsn: String,
        identity_fields: String,
        challenge_secret: Option<SecretString>,
        challenge_url: String,
        cors_origin: Option<String>,
    },
}
