//! Signed, time-limited bearer tokens (HS256 JWT) carrying the username as subject.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::errors::{AuthError, AuthResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Username.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl: Duration,
    pub issuer: String,
}

#[derive(Clone)]
pub struct JwtManager {
    ttl: Duration,
    issuer: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtManager {
    pub fn new(config: JwtConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            ttl: config.ttl,
            issuer: config.issuer,
        }
    }

    pub fn issue(&self, username: &str) -> AuthResult<TokenResponse> {
        let now = Utc::now();
        let claims = Claims {
            sub: username.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            iss: self.issuer.clone(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|_| AuthError::TokenGenerationFailed)?;
        Ok(TokenResponse {
            token,
            token_type: "Bearer",
            expires_in: self.ttl.num_seconds(),
        })
    }

    /// Check signature, issuer and expiry.
    pub fn validate(&self, token: &str) -> AuthResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.leeway = 0;
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::MalformedToken,
            })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(secret: &str) -> JwtManager {
        JwtManager::new(JwtConfig {
            secret: secret.to_string(),
            ttl: Duration::minutes(15),
            issuer: "test".to_string(),
        })
    }

    #[test]
    fn issued_token_validates() {
        let m = manager("k1");
        let issued = m.issue("alice").unwrap();
        assert_eq!(issued.token_type, "Bearer");
        assert_eq!(issued.expires_in, 15 * 60);
        assert_eq!(issued.token.split('.').count(), 3);
        assert_eq!(m.validate(&issued.token).unwrap().sub, "alice");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = manager("k1").issue("alice").unwrap().token;
        assert!(matches!(manager("k2").validate(&token), Err(AuthError::InvalidSignature)));
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(manager("k").validate("not.a.jwt"), Err(AuthError::MalformedToken)));
        assert!(matches!(manager("k").validate(""), Err(AuthError::MalformedToken)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = Utc::now();
        let claims = Claims {
            sub: "alice".into(),
            iat: (now - Duration::hours(2)).timestamp(),
            exp: (now - Duration::hours(1)).timestamp(),
            iss: "test".into(),
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(b"k")).unwrap();
        assert!(matches!(manager("k").validate(&token), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn foreign_issuer_is_rejected() {
        let other = JwtManager::new(JwtConfig {
            secret: "k".into(),
            ttl: Duration::minutes(5),
            issuer: "someone-else".into(),
        });
        let token = other.issue("alice").unwrap().token;
        assert!(manager("k").validate(&token).is_err());
    }
}
