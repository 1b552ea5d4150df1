//! Login and registration.

use crate::error::AppError;
use crate::extractors::{AuthUser, JsonObject};
use crate::response::{success_created, success_ok};
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
struct CredentialsBody {
    username: String,
    password: String,
}

fn credentials(body: JsonObject) -> Result<CredentialsBody, AppError> {
    serde_json::from_value(serde_json::Value::Object(body.0))
        .map_err(|e| AppError::Validation(format!("username and password are required strings: {}", e)))
}

/// POST /login: no token required.
pub async fn login(State(state): State<AppState>, body: JsonObject) -> Result<impl IntoResponse, AppError> {
    let creds = credentials(body)?;
    let token = state
        .credentials
        .login(&state.gateway, &creds.username, &creds.password)
        .await?;
    Ok(success_ok(token))
}

/// POST /register: only an authenticated user can add another.
pub async fn register(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    body: JsonObject,
) -> Result<impl IntoResponse, AppError> {
    let creds = credentials(body)?;
    let id = state
        .credentials
        .register(&state.gateway, &creds.username, &creds.password)
        .await?;
    tracing::info!(by = %identity.username, id, "registration accepted");
    Ok(success_created(json!({ "Id": id, "Username": creds.username })))
}
