//! Register, login and token verification against the USER table.

use super::crypto::{self, Credential, PasswordPolicy};
use super::errors::{AuthError, AuthResult};
use super::jwt::{JwtConfig, JwtManager, TokenResponse};
use crate::error::AppError;
use crate::gateway::{self, Gateway, Outcome, Record};
use crate::settings::AuthSettings;
use crate::sql::Statement;
use serde_json::Value;

/// Authenticated caller, taken from a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
}

pub struct CredentialService {
    jwt: JwtManager,
    pepper: String,
    policy: PasswordPolicy,
}

impl CredentialService {
    pub fn new(settings: &AuthSettings) -> Self {
        Self {
            jwt: JwtManager::new(JwtConfig {
                secret: settings.jwt_secret.clone(),
                ttl: settings.token_ttl,
                issuer: settings.issuer.clone(),
            }),
            pepper: settings.pepper.clone(),
            policy: PasswordPolicy::default(),
        }
    }

    /// Create a user and return its id. Duplicate usernames are a conflict and insert nothing.
    pub async fn register(&self, gateway: &Gateway, username: &str, password: &str) -> Result<i32, AppError> {
        crypto::validate_username(username)?;
        self.policy.validate(password)?;
        let (pw, pepper) = (password.to_string(), self.pepper.clone());
        let cred = off_runtime(move || crypto::hash_password(&pw, &pepper)).await?;
        let stmt = Statement::new(
            r#"INSERT INTO "USER" ("Username", "PasswordHash", "Salt", "HashAlgorithm") VALUES ($1::text, $2::text, $3::text, $4::text) RETURNING "Id""#,
        )
        .bind(username)
        .bind(cred.hash)
        .bind(cred.salt)
        .bind(cred.algorithm)
        .returning("Id");

        let mut conn = gateway.acquire().await?;
        match gateway::execute(&mut conn, &stmt).await {
            Ok(Outcome::Inserted { id }) => {
                tracing::info!(username, id, "user registered");
                Ok(id)
            }
            Ok(other) => Err(AppError::Internal(format!("unexpected insert outcome: {:?}", other))),
            Err(AppError::Conflict(_)) => Err(AuthError::UsernameTaken.into()),
            Err(e) => Err(e),
        }
    }

    /// Check credentials and issue a token. Unknown user and wrong password fail the same way.
    pub async fn login(&self, gateway: &Gateway, username: &str, password: &str) -> Result<TokenResponse, AppError> {
        let stmt = Statement::new(
            r#"SELECT "PasswordHash", "Salt", "HashAlgorithm" FROM "USER" WHERE "Username" = $1::text"#,
        )
        .bind(username);
        let row = {
            let mut conn = gateway.acquire().await?;
            gateway::fetch_one(&mut conn, &stmt).await?
        };

        let (pw, pepper) = (password.to_string(), self.pepper.clone());
        let Some(stored) = row.as_ref().and_then(credential_from_record) else {
            off_runtime(move || {
                crypto::burn_hash(&pw, &pepper);
                Ok(())
            })
            .await?;
            tracing::warn!(username, reason = "unknown user", "login rejected");
            return Err(AuthError::InvalidCredentials.into());
        };
        if !off_runtime(move || crypto::verify_password(&pw, &pepper, &stored)).await? {
            tracing::warn!(username, reason = "password mismatch", "login rejected");
            return Err(AuthError::InvalidCredentials.into());
        }
        tracing::info!(username, "login succeeded");
        Ok(self.jwt.issue(username)?)
    }

    pub fn verify(&self, token: &str) -> AuthResult<Identity> {
        let claims = self.jwt.validate(token)?;
        Ok(Identity { username: claims.sub })
    }

    pub fn issue_token(&self, username: &str) -> AuthResult<TokenResponse> {
        self.jwt.issue(username)
    }
}

/// Argon2 is CPU-bound; keep it off the async workers.
async fn off_runtime<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> AuthResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(format!("password hashing task failed: {}", e)))?
        .map_err(AppError::from)
}

fn credential_from_record(rec: &Record) -> Option<Credential> {
    let field = |k: &str| rec.get(k).and_then(Value::as_str).map(str::to_string);
    Some(Credential {
        hash: field("PasswordHash")?,
        salt: field("Salt")?,
        algorithm: field("HashAlgorithm")?,
    })
}
