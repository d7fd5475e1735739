use crate::accesso::handlers::{signup_error, valid_email};
use crate::account::RegistrationService;
use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct Signup {
    /// identity fields of the active schema, example: email or username+email
    #[serde(flatten)]
    fields: HashMap<String, String>,
    password: String,
    #[serde(rename = "challengeToken", skip_serializing_if = "Option::is_none")]
    challenge_token: Option<String>,
}

impl std::fmt::Debug for Signup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signup")
            .field("fields", &self.fields)
            .field("password", &"***")
            .field("challenge_token", &self.challenge_token)
            .finish()
    }
}

#[utoipa::path(
    post,
    path= "/api/signup",
    responses (
        (status = 201, description = "Registration successful"),
        (status = 400, description = "Missing fields or challenge not satisfied"),
        (status = 409, description = "An account with one of the identity fields already exists"),
    ),
    tag= "signup"
)]
// axum handler for signup
#[instrument(skip(registration))]
pub async fn signup(
    registration: Extension<Arc<RegistrationService>>,
    payload: Option<Json<Signup>>,
) -> impl IntoResponse {
    let signup: Signup = match payload {
        Some(Json(payload)) => payload,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"message": "Missing payload"})),
            )
        }
    };

    debug!("signup: {:?}", signup);

    if let Some(email) = signup.fields.get("email") {
        if !email.trim().is_empty() && !valid_email(email) {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"message": "Please provide a valid email."})),
            );
        }
    }

    match registration
        .register(
            &signup.fields,
            &signup.password,
            signup.challenge_token.as_deref(),
        )
        .await
    {
        Ok(_) => (
            StatusCode::CREATED,
            Json(json!({"message": "User created successfully!"})),
        ),
        Err(e) => {
            let (status, message) = signup_error(&e);

            (status, Json(json!({"message": message})))
        }
    }
}
