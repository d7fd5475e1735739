pub mod health;
pub use self::health::health;

pub mod signup;
pub use self::signup::signup;

pub mod login;
pub use self::login::login;

// common helpers for the handlers
use crate::account::AccountError;
use axum::http::StatusCode;
use regex::Regex;

pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

fn capitalize(field: &str) -> String {
    let mut chars = field.chars();

    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().collect::<String>() + chars.as_str()
    })
}

/// Map a registration outcome to status + message. Internal detail was
/// already logged where it happened and never reaches the response.
pub(crate) fn signup_error(err: &AccountError) -> (StatusCode, String) {
    match err {
        AccountError::Validation(_) => (
            StatusCode::BAD_REQUEST,
            "Please provide all required fields.".to_string(),
        ),
        AccountError::Duplicate { field: Some(field) } => (
            StatusCode::CONFLICT,
            format!("{} already exists.", capitalize(field)),
        ),
        AccountError::Duplicate { field: None } => {
            (StatusCode::CONFLICT, "Account already exists.".to_string())
        }
        AccountError::ChallengeFailed => (
            StatusCode::BAD_REQUEST,
            "Captcha verification failed.".to_string(),
        ),
        AccountError::InvalidCredentials | AccountError::Internal => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Error creating user.".to_string(),
        ),
    }
}

/// Map a sign-in outcome to status + message. The unauthorized payload is
/// identical for unknown identity and wrong password.
pub(crate) fn login_error(err: &AccountError, login_field: &str) -> (StatusCode, String) {
    match err {
        AccountError::Validation(_) => (
            StatusCode::BAD_REQUEST,
            "Please provide all required fields.".to_string(),
        ),
        AccountError::InvalidCredentials => (
            StatusCode::UNAUTHORIZED,
            format!("Invalid {login_field} or password."),
        ),
        AccountError::Duplicate { .. }
        | AccountError::ChallengeFailed
        | AccountError::Internal => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Error logging in.".to_string(),
        ),
    }
}
