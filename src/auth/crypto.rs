//! Password hashing and credential checks.
//!
//! Passwords are hashed as Argon2id over `password ++ pepper` with a per-user salt.
//! The salt and the raw hash output are stored in separate columns, so a login
//! recomputes the hash with the stored salt and compares in constant time.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use regex::Regex;
use std::sync::OnceLock;
use subtle::ConstantTimeEq;

use super::errors::{AuthError, AuthResult};

/// Tag persisted next to every hash.
pub const ALGORITHM: &str = "argon2id";

/// Salt used to burn the same time on unknown usernames as on real ones.
const DUMMY_SALT: &str = "c2NoZWR1bGVkdW1teXNhbHQ";

/// Stored form of a password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub hash: String,
    pub salt: String,
    pub algorithm: String,
}

#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub max_length: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 256,
        }
    }
}

impl PasswordPolicy {
    pub fn validate(&self, password: &str) -> AuthResult<()> {
        let len = password.chars().count();
        if len < self.min_length {
            return Err(AuthError::WeakPassword(format!(
                "password must be at least {} characters",
                self.min_length
            )));
        }
        if len > self.max_length {
            return Err(AuthError::WeakPassword(format!(
                "password must be at most {} characters",
                self.max_length
            )));
        }
        Ok(())
    }
}

fn username_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_.@-]{3,64}$").expect("static pattern"))
}

pub fn validate_username(username: &str) -> AuthResult<()> {
    if username_pattern().is_match(username) {
        Ok(())
    } else {
        Err(AuthError::InvalidUsername(
            "3 to 64 characters of letters, digits, '_', '.', '@' or '-'".into(),
        ))
    }
}

fn hash_with_salt(password: &str, pepper: &str, salt: &SaltString) -> AuthResult<String> {
    let mut peppered = String::with_capacity(password.len() + pepper.len());
    peppered.push_str(password);
    peppered.push_str(pepper);
    let phc = Argon2::default()
        .hash_password(peppered.as_bytes(), salt)
        .map_err(|_| AuthError::HashingFailed)?;
    phc.hash.map(|out| out.to_string()).ok_or(AuthError::HashingFailed)
}

/// Hash a new password with a fresh random salt.
pub fn hash_password(password: &str, pepper: &str) -> AuthResult<Credential> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = hash_with_salt(password, pepper, &salt)?;
    Ok(Credential {
        hash,
        salt: salt.as_str().to_string(),
        algorithm: ALGORITHM.to_string(),
    })
}

/// Recompute with the stored salt and compare in constant time.
pub fn verify_password(password: &str, pepper: &str, stored: &Credential) -> AuthResult<bool> {
    if stored.algorithm != ALGORITHM {
        tracing::warn!(algorithm = %stored.algorithm, "unsupported password hash algorithm");
        return Ok(false);
    }
    let salt = SaltString::from_b64(&stored.salt).map_err(|_| AuthError::HashingFailed)?;
    let computed = hash_with_salt(password, pepper, &salt)?;
    Ok(constant_time_str_eq(&computed, &stored.hash))
}

/// Spend one hash computation without a stored credential.
pub fn burn_hash(password: &str, pepper: &str) {
    if let Ok(salt) = SaltString::from_b64(DUMMY_SALT) {
        let _ = hash_with_salt(password, pepper, &salt);
    }
}

pub fn constant_time_str_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
