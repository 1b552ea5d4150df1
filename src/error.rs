//! Typed errors and HTTP mapping.

use crate::auth::AuthError;
use crate::response::{envelope, INTERNAL_ERROR_MESSAGE};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {var}: '{value}'")]
    Invalid { var: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("validation: {0}")]
    Validation(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("conflict: {0}")]
    Conflict(String),
    /// Statement rejected by the database because of caller-supplied data.
    #[error("constraint: {0}")]
    Constraint(String),
    #[error("database connection: {0}")]
    Connection(#[source] sqlx::Error),
    #[error("database statement: {0}")]
    Statement(#[source] sqlx::Error),
    #[error("invalid statement: {0}")]
    InvalidStatement(&'static str),
    #[error("internal: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::BadRequest(_) | AppError::Constraint(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Config(_)
            | AppError::Connection(_)
            | AppError::Statement(_)
            | AppError::InvalidStatement(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// SQLSTATE codes that point at the request payload rather than the server.
fn is_caller_error(code: &str) -> bool {
    matches!(code, "23502" | "23503" | "23514") || code.starts_with("22")
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => AppError::NotFound("row".into()),
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Configuration(_) => AppError::Connection(e),
            sqlx::Error::Database(ref db) => {
                let code = db.code().map(|c| c.into_owned()).unwrap_or_default();
                if code == "23505" {
                    AppError::Conflict(db.message().to_string())
                } else if is_caller_error(&code) {
                    AppError::Constraint(db.message().to_string())
                } else {
                    AppError::Statement(e)
                }
            }
            other => AppError::Statement(other),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::WeakPassword(m) | AuthError::InvalidUsername(m) => AppError::Validation(m),
            AuthError::UsernameTaken => AppError::Conflict(e.to_string()),
            AuthError::HashingFailed | AuthError::TokenGenerationFailed => AppError::Internal(e.to_string()),
            other => AppError::Unauthorized(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let data = match &self {
            AppError::NotFound(_) => Value::Array(Vec::new()),
            _ if status.is_server_error() => {
                tracing::error!(error = %self, source = ?std::error::Error::source(&self), "request failed");
                Value::String(INTERNAL_ERROR_MESSAGE.into())
            }
            _ => Value::String(self.to_string()),
        };
        envelope(status, data).into_response()
    }
}
