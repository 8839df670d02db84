//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;
use std::str::FromStr;

use rand::RngCore;

use crate::domain::PriceTable;

/// Where admins, weddings and the ledger live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            _ => Err(ConfigError::InvalidValue("STORAGE_BACKEND")),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Storage backend
    pub storage_backend: StorageBackend,

    /// Database connection URL (required for postgres)
    pub database_url: Option<String>,

    /// Maximum database connections in pool
    pub database_max_connections: u32,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// HMAC key for bearer tokens
    pub token_secret: Vec<u8>,

    /// True when no TOKEN_SECRET was set and one was generated
    pub token_secret_generated: bool,

    /// Bearer token lifetime in minutes
    pub token_ttl_minutes: i64,

    /// Let publish charge as an upgrade on an already published wedding
    pub allow_published_upgrade: bool,

    /// Allow self-registration as SUPER_ADMIN
    pub allow_super_admin_signup: bool,

    /// Design and feature prices
    pub prices: PriceTable,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let storage_backend: StorageBackend = env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "postgres".to_string())
            .parse()?;

        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.is_empty());
        if storage_backend == StorageBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::MissingEnv("DATABASE_URL"));
        }

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS"))?;

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "8001".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT"))?;

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let (token_secret, token_secret_generated) = match env::var("TOKEN_SECRET") {
            Ok(secret) if !secret.is_empty() => (secret.into_bytes(), false),
            _ => (generate_secret(), true),
        };

        let token_ttl_minutes = env::var("TOKEN_TTL_MINUTES")
            .unwrap_or_else(|_| "1440".to_string())
            .parse()
            .ok()
            .filter(|minutes: &i64| *minutes > 0)
            .ok_or(ConfigError::InvalidValue("TOKEN_TTL_MINUTES"))?;

        let allow_published_upgrade = parse_flag("ALLOW_PUBLISHED_UPGRADE")?;
        let allow_super_admin_signup = parse_flag("ALLOW_SUPER_ADMIN_SIGNUP")?;

        let prices = match env::var("PRICE_TABLE_PATH") {
            Ok(path) if !path.is_empty() => {
                let json = std::fs::read_to_string(&path)
                    .map_err(|_| ConfigError::InvalidValue("PRICE_TABLE_PATH"))?;
                PriceTable::from_json(&json)
                    .map_err(|_| ConfigError::InvalidValue("PRICE_TABLE_PATH"))?
            }
            _ => PriceTable::default(),
        };

        let config = Self {
            storage_backend,
            database_url,
            database_max_connections,
            host,
            port,
            environment,
            token_secret,
            token_secret_generated,
            token_ttl_minutes,
            allow_published_upgrade,
            allow_super_admin_signup,
            prices,
        };
        config.validate()?;

        Ok(config)
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Production needs durable storage and a stable token secret
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.is_production() {
            return Ok(());
        }
        if self.storage_backend == StorageBackend::Memory {
            return Err(ConfigError::Unsupported(
                "memory storage is not allowed in production",
            ));
        }
        if self.token_secret_generated {
            return Err(ConfigError::MissingEnv("TOKEN_SECRET"));
        }
        Ok(())
    }
}

fn parse_flag(name: &'static str) -> Result<bool, ConfigError> {
    match env::var(name) {
        Err(_) => Ok(false),
        Ok(value) => match value.to_ascii_lowercase().as_str() {
            "" | "0" | "false" | "no" | "off" => Ok(false),
            "1" | "true" | "yes" | "on" => Ok(true),
            _ => Err(ConfigError::InvalidValue(name)),
        },
    }
}

fn generate_secret() -> Vec<u8> {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes).into_bytes()
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),

    #[error("Unsupported configuration: {0}")]
    Unsupported(&'static str),
}
