//! Process settings read from the environment (after loading `.env` when present).

use crate::error::{ConfigError, ErrorVerbosity};
use crate::middleware::ValidationSource;
use std::net::SocketAddr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn verbosity(&self) -> ErrorVerbosity {
        match self {
            Environment::Development => ErrorVerbosity::Development,
            Environment::Production => ErrorVerbosity::Production,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub environment: Environment,
    /// No URL means in-memory repositories.
    pub database_url: Option<String>,
    pub schema_name: String,
    pub bind_addr: SocketAddr,
    pub db_max_connections: u32,
    pub max_body_bytes: usize,
    pub validation_source: ValidationSource,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            database_url: None,
            schema_name: "medibloc".into(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            db_max_connections: 5,
            max_body_bytes: 1024 * 1024,
            validation_source: ValidationSource::Merged,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup; missing keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let environment = match get("APP_ENV").as_deref() {
            None | Some("development") | Some("dev") | Some("test") => Environment::Development,
            Some("production") | Some("prod") => Environment::Production,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "APP_ENV",
                    value: other.to_string(),
                })
            }
        };

        let schema_name = get("MEDIBLOC_SCHEMA").unwrap_or(defaults.schema_name);
        if !schema_name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ConfigError::Invalid {
                key: "MEDIBLOC_SCHEMA",
                value: schema_name,
            });
        }

        Ok(Self {
            environment,
            database_url: get("DATABASE_URL"),
            schema_name,
            bind_addr: parse_or(get("BIND_ADDR"), "BIND_ADDR", defaults.bind_addr)?,
            db_max_connections: parse_or(
                get("DB_MAX_CONNECTIONS"),
                "DB_MAX_CONNECTIONS",
                defaults.db_max_connections,
            )?,
            max_body_bytes: parse_or(get("MAX_BODY_BYTES"), "MAX_BODY_BYTES", defaults.max_body_bytes)?,
            validation_source: parse_or(
                get("VALIDATION_SOURCE"),
                "VALIDATION_SOURCE",
                defaults.validation_source,
            )?,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    raw: Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let env: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Settings::from_lookup(|k| env.get(k).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let s = settings(&[]).unwrap();
        assert_eq!(s.environment, Environment::Development);
        assert!(s.database_url.is_none());
        assert_eq!(s.schema_name, "medibloc");
        assert_eq!(s.bind_addr.port(), 3000);
        assert_eq!(s.validation_source, ValidationSource::Merged);
    }

    #[test]
    fn reads_overrides() {
        let s = settings(&[
            ("APP_ENV", "production"),
            ("DATABASE_URL", "postgres://localhost/medibloc"),
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("MAX_BODY_BYTES", "2048"),
            ("VALIDATION_SOURCE", "body"),
        ])
        .unwrap();
        assert_eq!(s.environment.verbosity(), ErrorVerbosity::Production);
        assert_eq!(s.database_url.as_deref(), Some("postgres://localhost/medibloc"));
        assert_eq!(s.bind_addr.port(), 8080);
        assert_eq!(s.max_body_bytes, 2048);
        assert_eq!(s.validation_source, ValidationSource::Body);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            settings(&[("DB_MAX_CONNECTIONS", "many")]),
            Err(ConfigError::Invalid { key: "DB_MAX_CONNECTIONS", .. })
        ));
        assert!(settings(&[("APP_ENV", "staging")]).is_err());
        assert!(settings(&[("MEDIBLOC_SCHEMA", "bad;name")]).is_err());
        assert!(settings(&[("VALIDATION_SOURCE", "headers")]).is_err());
    }
}
