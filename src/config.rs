use std::env;
use std::str::FromStr;
use std::time::Duration;

use dotenvy::dotenv;

use crate::error::ConfigError;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,
    pub api_prefix: String,
    pub log_dir: String,

    // Rate limiting, per peer IP
    pub rate_read_per_min: u32,
    pub rate_write_per_min: u32,

    pub roster_cache_ttl: Duration,
    pub pending_ttl: Duration,
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::Missing(key))
}

fn parse_or<T: FromStr>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

fn optional<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    parse_or(key, env::var(key).ok(), default)
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),

            rate_read_per_min: optional("RATE_READ_PER_MIN", 1000)?,
            rate_write_per_min: optional("RATE_WRITE_PER_MIN", 120)?,

            roster_cache_ttl: Duration::from_secs(optional("ROSTER_CACHE_TTL_SECS", 300)?),
            pending_ttl: Duration::from_secs(optional("PENDING_TTL_SECS", 600)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_value_falls_back_to_default() {
        assert_eq!(parse_or::<u32>("RATE_READ_PER_MIN", None, 1000).unwrap(), 1000);
    }

    #[test]
    fn present_value_is_parsed_after_trimming() {
        assert_eq!(
            parse_or::<u64>("PENDING_TTL_SECS", Some(" 30 ".into()), 600).unwrap(),
            30
        );
    }

    #[test]
    fn garbage_is_a_configuration_error() {
        let err = parse_or::<u32>("RATE_WRITE_PER_MIN", Some("lots".into()), 120).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { key: "RATE_WRITE_PER_MIN", ref value } if value == "lots"
        ));
    }
}
