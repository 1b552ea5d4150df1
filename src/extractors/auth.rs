//! Bearer token guard for protected routes.

use crate::auth::{AuthError, Identity};
use crate::error::AppError;
use crate::state::AppState;
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

const BEARER_PREFIX: &str = "Bearer ";

/// Caller identity from a valid `Authorization: Bearer <token>` header.
/// Extracting it is what makes a handler protected.
#[derive(Clone, Debug)]
pub struct AuthUser(pub Identity);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingToken)?
            .to_str()
            .map_err(|_| AuthError::MalformedToken)?;
        let token = bearer_token(header).ok_or(AuthError::MalformedToken)?;
        let identity = state.credentials.verify(token).map_err(|e| {
            tracing::debug!(error = %e, "token rejected");
            e
        })?;
        Ok(AuthUser(identity))
    }
}

fn bearer_token(header: &str) -> Option<&str> {
    let prefix = header.get(..BEARER_PREFIX.len())?;
    if !prefix.eq_ignore_ascii_case(BEARER_PREFIX) {
        return None;
    }
    Some(header[BEARER_PREFIX.len()..].trim()).filter(|t| !t.is_empty())
}
