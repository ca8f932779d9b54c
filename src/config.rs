//! Runtime settings, read once at start-up and handed to constructors.

use std::str::FromStr;
use std::time::Duration;

use secrecy::Secret;

use crate::errors::AppError;
use crate::videos::metadata::DEFAULT_YOUTUBE_API_BASE_URL;

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3001";
const DEFAULT_API_TIMEOUT_MS: u64 = 10000;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

pub struct Settings {
    pub database_url: Secret<String>,
    pub database_max_connections: u32,
    pub youtube_api_key: Secret<String>,
    pub youtube_api_base_url: String,
    pub youtube_api_timeout: Duration,
    /// JWT secret for attributing submissions. Without it every submission is anonymous.
    pub token_secret: Option<Secret<String>>,
    pub bind_address: String,
}

impl Settings {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| AppError::Configuration(format!("{} must be set", key)))
        };

        Ok(Self {
            database_url: Secret::new(required("DATABASE_URL")?),
            database_max_connections: parse_or(
                &lookup,
                "DATABASE_MAX_CONNECTIONS",
                DEFAULT_MAX_CONNECTIONS,
            )?,
            youtube_api_key: Secret::new(required("YOUTUBE_API_KEY")?),
            youtube_api_base_url: lookup("YOUTUBE_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_YOUTUBE_API_BASE_URL.to_string()),
            youtube_api_timeout: Duration::from_millis(parse_or(
                &lookup,
                "YOUTUBE_API_TIMEOUT_MS",
                DEFAULT_API_TIMEOUT_MS,
            )?),
            token_secret: lookup("SECRET_TOKEN")
                .filter(|value| !value.is_empty())
                .map(Secret::new),
            bind_address: lookup("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Configuration(format!("{} has an invalid value '{}'", key, raw))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Result<Settings, AppError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn applies_defaults() {
        let settings = settings(&[
            ("DATABASE_URL", "postgres://localhost/videos"),
            ("YOUTUBE_API_KEY", "key"),
        ])
        .unwrap();

        assert_eq!(settings.youtube_api_key.expose_secret(), "key");
        assert_eq!(settings.youtube_api_base_url, DEFAULT_YOUTUBE_API_BASE_URL);
        assert_eq!(settings.youtube_api_timeout, Duration::from_millis(10000));
        assert_eq!(settings.database_max_connections, 5);
        assert_eq!(settings.bind_address, "0.0.0.0:3001");
        assert!(settings.token_secret.is_none());
    }

    #[test]
    fn missing_api_key_is_a_configuration_error() {
        let result = settings(&[("DATABASE_URL", "postgres://localhost/videos")]);
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let result = settings(&[
            ("DATABASE_URL", "postgres://localhost/videos"),
            ("YOUTUBE_API_KEY", "key"),
            ("YOUTUBE_API_TIMEOUT_MS", "soon"),
        ]);
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }
}
