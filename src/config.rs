//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::geo::GeoLookupConfig;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Path of the visit snapshot file
    pub visits_file: PathBuf,

    /// Environment (development, production)
    pub environment: String,

    /// Take the visitor key from X-Forwarded-For (only behind a trusted proxy)
    pub trust_forwarded_for: bool,

    /// Region lookup settings
    pub geo_lookup: GeoLookupConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT"))?;

        let visits_file = env::var("VISITS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("visits.json"));

        if visits_file.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue("VISITS_FILE"));
        }

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let trust_forwarded_for = parse_bool("TRUST_FORWARDED_FOR", false)?;

        let defaults = GeoLookupConfig::default();

        let geo_enabled = parse_bool("GEO_LOOKUP_ENABLED", defaults.enabled)?;

        let geo_base_url = env::var("GEO_LOOKUP_URL").unwrap_or(defaults.base_url);

        let geo_timeout_ms: u64 = env::var("GEO_LOOKUP_TIMEOUT_MS")
            .unwrap_or_else(|_| defaults.timeout.as_millis().to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("GEO_LOOKUP_TIMEOUT_MS"))?;

        Ok(Self {
            host,
            port,
            visits_file,
            environment,
            trust_forwarded_for,
            geo_lookup: GeoLookupConfig {
                enabled: geo_enabled,
                base_url: geo_base_url,
                timeout: Duration::from_millis(geo_timeout_ms),
            },
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn parse_bool(name: &'static str, default: bool) -> Result<bool, ConfigError> {
    match env::var(name) {
        Err(_) => Ok(default),
        Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidValue(name)),
        },
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}
