//! Immutable process configuration, read once from the environment at startup.

use crate::error::ConfigError;
use sqlx::postgres::PgConnectOptions;
use std::str::FromStr;
use std::time::Duration;

#[derive(Clone)]
pub struct DatabaseSettings {
    pub options: PgConnectOptions,
    pub connect_timeout: Duration,
    pub max_connections: u32,
}

impl std::fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("host", &self.options.get_host())
            .field("port", &self.options.get_port())
            .field("database", &self.options.get_database())
            .field("connect_timeout", &self.connect_timeout)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

#[derive(Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
    pub issuer: String,
    pub pepper: String,
    /// First account, created only on an empty USER table.
    pub bootstrap_user: Option<(String, String)>,
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("token_ttl", &self.token_ttl)
            .field("issuer", &self.issuer)
            .field("bootstrap_user", &self.bootstrap_user.as_ref().map(|(u, _)| u))
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub url_prefix: String,
    pub api_version: String,
    pub body_limit: usize,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
}

impl Settings {
    /// Process environment, after loading `.env` from the working directory when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let connect_timeout = Duration::from_secs(parse_or(&get, "DB_CONNECT_TIMEOUT", 5u64)?);
        let options = match get("DATABASE_URL") {
            Some(url) => PgConnectOptions::from_str(&url).map_err(|_| ConfigError::Invalid {
                var: "DATABASE_URL",
                value: "<redacted>".into(),
            })?,
            None => {
                let mut o = PgConnectOptions::new()
                    .host(&get("DB_HOST").unwrap_or_else(|| "localhost".into()))
                    .port(parse_or(&get, "DB_PORT", 5432u16)?)
                    .username(&get("DB_USER").unwrap_or_else(|| "postgres".into()))
                    .database(&get("DB_NAME").unwrap_or_else(|| "schedule".into()));
                if let Some(pw) = get("DB_PASSWD") {
                    o = o.password(&pw);
                }
                o
            }
        };

        let bootstrap_user = match (get("BOOTSTRAP_USERNAME"), get("BOOTSTRAP_PASSWORD")) {
            (Some(u), Some(p)) => Some((u, p)),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing("BOOTSTRAP_PASSWORD")),
            (None, Some(_)) => return Err(ConfigError::Missing("BOOTSTRAP_USERNAME")),
        };

        Ok(Settings {
            host: get("SCHEDULE_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&get, "SCHEDULE_PORT", 3000u16)?,
            url_prefix: get("SCHEDULE_URL_PREFIX")
                .unwrap_or_else(|| "api".into())
                .trim_matches('/')
                .to_lowercase(),
            api_version: get("SCHEDULE_API_VERSION").unwrap_or_else(|| "v1".into()).to_lowercase(),
            body_limit: parse_or(&get, "REQUEST_BODY_LIMIT", 64 * 1024usize)?,
            database: DatabaseSettings {
                options,
                connect_timeout,
                max_connections: parse_or(&get, "DB_MAX_CONNECTIONS", 5u32)?,
            },
            auth: AuthSettings {
                jwt_secret: get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?,
                token_ttl: chrono::Duration::minutes(parse_or(&get, "TOKEN_TTL_MINUTES", 60i64)?),
                issuer: get("TOKEN_ISSUER").unwrap_or_else(|| "schedule-api".into()),
                pepper: get("PASSWORD_PEPPER").ok_or(ConfigError::Missing("PASSWORD_PEPPER"))?,
                bootstrap_user,
            },
        })
    }

    /// Versioned route prefix, e.g. `/api/v1`.
    pub fn route_prefix(&self) -> String {
        format!("/{}/{}", self.url_prefix, self.api_version)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<G, T>(get: &G, var: &'static str, default: T) -> Result<T, ConfigError>
where
    G: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match get(var) {
        None => Ok(default),
        Some(v) => v.parse().map_err(|_| ConfigError::Invalid { var, value: v }),
    }
}
