use crate::accesso::handlers::{login_error, valid_email};
use crate::account::AuthenticationService;
use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct Login {
    /// carries the login field, example: email
    #[serde(flatten)]
    fields: HashMap<String, String>,
    password: String,
}

impl std::fmt::Debug for Login {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Login")
            .field("fields", &self.fields)
            .field("password", &"***")
            .finish()
    }
}

#[utoipa::path(
    post,
    path= "/api/login",
    responses (
        (status = 200, description = "Login successful"),
        (status = 401, description = "Unauthorized"),
    ),
    tag= "login"
)]
// axum handler for login
#[instrument(skip(auth))]
pub async fn login(
    auth: Extension<Arc<AuthenticationService>>,
    payload: Option<Json<Login>>,
) -> impl IntoResponse {
    let login: Login = match payload {
        Some(Json(payload)) => payload,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"message": "Missing payload"})),
            )
        }
    };

    debug!("login: {:?}", login);

    let field = auth.login_field();
    let identity = login.fields.get(field).map(String::as_str).unwrap_or("");

    if field == "email" && !identity.trim().is_empty() && !valid_email(identity) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "Please provide a valid email."})),
        );
    }

    match auth.authenticate(identity, &login.password).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({"message": "Logged in successfully!"})),
        ),
        Err(e) => {
            let (status, message) = login_error(&e, field);

            (status, Json(json!({"message": message})))
        }
    }
}
