use anyhow::{Context, Result};
use tracing::warn;

const DEFAULT_JWT_SECRET: &str = "default-secret-change-in-production";
const DEFAULT_JWT_EXPIRATION_HOURS: i64 = 24;
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;

/// Server settings read from the environment at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub cors_allowed_origins: String,
    pub host: String,
    pub port: u16,
    pub environment: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL must be set")?;

        let jwt_secret = lookup("JWT_SECRET").unwrap_or_else(|| {
            warn!("JWT_SECRET not set, using default (not secure for production)");
            DEFAULT_JWT_SECRET.to_string()
        });

        let jwt_expiration_hours = parse_or_default(&lookup, "JWT_EXPIRATION_HOURS", DEFAULT_JWT_EXPIRATION_HOURS);
        let port = parse_or_default(&lookup, "PORT", DEFAULT_PORT);

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_expiration_hours,
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS").unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string()),
            host: lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

fn parse_or_default<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + Copy + std::fmt::Display,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "invalid value, using default {}", default);
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://localhost/clinic")])).unwrap();

        assert_eq!(config.jwt_secret, DEFAULT_JWT_SECRET);
        assert_eq!(config.jwt_expiration_hours, 24);
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert!(config.is_development());
    }

    #[test]
    fn test_missing_database_url_is_an_error() {
        let err = AppConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/clinic"),
            ("JWT_EXPIRATION_HOURS", "soon"),
            ("PORT", "99999"),
            ("ENVIRONMENT", "production"),
        ]))
        .unwrap();

        assert_eq!(config.jwt_expiration_hours, 24);
        assert_eq!(config.port, 8080);
        assert!(!config.is_development());
    }
}
