//! Credential service: salted and peppered password hashing, login, bearer tokens.

pub mod crypto;
pub mod errors;
pub mod jwt;
pub mod service;

pub use crypto::{Credential, PasswordPolicy};
pub use errors::{AuthError, AuthResult};
pub use jwt::{Claims, JwtConfig, JwtManager, TokenResponse};
pub use service::{CredentialService, Identity};
