use anyhow::{Context, Result};
use std::env;

use crate::storage::RetentionPolicy;
use crate::web::app::MAX_BODY_BYTES;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
/// Log filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "statusreg=info,tower_http=info";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub retention: RetentionPolicy,
    pub max_body_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            retention: RetentionPolicy::default(),
            max_body_bytes: MAX_BODY_BYTES,
        }
    }
}

impl AppConfig {
    /// Loads `.env` if present, then reads the bind address from the environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Only the bind address (`APP_HOST`, `APP_PORT`) is read. Retention, sweep
    /// interval and body limit are constants and ignore the environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("APP_HOST") {
            config.host = host;
        }

        if let Some(port) = lookup("APP_PORT") {
            config.port = port
                .parse::<u16>()
                .context("APP_PORT must be a valid u16")?;
        }

        Ok(config)
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config.address(), "0.0.0.0:8080");
        assert_eq!(config.retention, RetentionPolicy::default());
        assert_eq!(config.max_body_bytes, 1024 * 1024);
    }

    #[test]
    fn bind_address_can_be_overridden() {
        let config =
            AppConfig::from_lookup(lookup_from(&[("APP_HOST", "127.0.0.1"), ("APP_PORT", "9000")]))
                .unwrap();

        assert_eq!(config.address(), "127.0.0.1:9000");
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[("APP_PORT", "http")])).unwrap_err();
        assert!(err.to_string().contains("APP_PORT"));
    }

    #[test]
    fn retention_and_body_limit_ignore_the_environment() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("APP_MAX_AGE_HOURS", "1"),
            ("APP_SWEEP_INTERVAL_SECS", "5"),
            ("APP_MAX_BODY_BYTES", "10"),
            ("RETENTION", "0"),
        ]))
        .unwrap();

        assert_eq!(config.retention, RetentionPolicy::default());
        assert_eq!(config.max_body_bytes, MAX_BODY_BYTES);
        assert_eq!(config.address(), "0.0.0.0:8080");
    }
}
