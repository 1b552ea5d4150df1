//! Error types for credential handling and bearer tokens.

use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// Unknown username or wrong password; the two are deliberately indistinguishable.
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("username already registered")]
    UsernameTaken,

    #[error("password does not meet requirements: {0}")]
    WeakPassword(String),

    #[error("invalid username: {0}")]
    InvalidUsername(String),

    #[error("missing bearer token")]
    MissingToken,

    #[error("malformed token")]
    MalformedToken,

    #[error("token expired")]
    TokenExpired,

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("password hashing failed")]
    HashingFailed,

    #[error("token generation failed")]
    TokenGenerationFailed,
}
