// src/config.rs

use std::{env, fmt, net::SocketAddr};

use dotenvy::dotenv;

/// Smallest leaderboard a caller may request.
pub const LEADERBOARD_MIN_TOP: i64 = 1;
/// Largest leaderboard a caller may request.
pub const LEADERBOARD_MAX_TOP: i64 = 100;
/// Leaderboard size when the caller does not ask for one.
pub const LEADERBOARD_DEFAULT_TOP: i64 = 10;

/// Which storage adapter backs the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub storage: StorageKind,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub rust_log: String,
    pub log_dir: String,
    pub server_addr: SocketAddr,
    /// JSON file of quiz trees loaded into the memory store at startup.
    pub quiz_seed_file: Option<String>,
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid { key, value } => write!(f, "{} has invalid value '{}'", key, value),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let storage = match env::var("STORAGE").as_deref() {
            Ok("postgres") | Err(_) => StorageKind::Postgres,
            Ok("memory") => StorageKind::Memory,
            Ok(other) => {
                return Err(ConfigError::Invalid {
                    key: "STORAGE",
                    value: other.to_string(),
                });
            }
        };

        let database_url = env::var("DATABASE_URL").ok();
        if storage == StorageKind::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let jwt_secret = env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let log_dir = env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());

        let server_addr = parse_or("SERVER_ADDR", "0.0.0.0:3000")?;
        let database_max_connections = parse_or("DATABASE_MAX_CONNECTIONS", "5")?;
        let quiz_seed_file = env::var("QUIZ_SEED_FILE").ok();

        Ok(Self {
            storage,
            database_url,
            database_max_connections,
            jwt_secret,
            rust_log,
            log_dir,
            server_addr,
            quiz_seed_file,
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError> {
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    value
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value })
}
