use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

use crate::session::sweeper::SweepPolicy;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Environment (dev, staging, prod)
    #[serde(default = "default_environment")]
    pub environment: String,

    /// CORS allowed origins, comma separated
    pub cors_origins: Option<String>,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// How often the session sweeper runs, in seconds
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Sessions older than this are evicted regardless of activity
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,

    /// Empty sessions older than this are evicted
    #[serde(default = "default_empty_session_ttl_secs")]
    pub empty_session_ttl_secs: u64,
}

impl Config {
    /// Load configuration from environment variables or app.env file
    pub fn load() -> Result<Self, ConfigError> {
        // Try to load from app.env file first
        if std::path::Path::new("app.env").exists() {
            dotenvy::from_filename("app.env").ok();
        } else {
            // Fallback to .env file
            dotenvy::dotenv().ok();
        }

        // Load from environment variables using envy
        match envy::from_env::<Config>() {
            Ok(config) => {
                info!("Configuration loaded successfully");
                Ok(config)
            }
            Err(e) => {
                error!("Failed to load configuration: {}", e);
                Err(ConfigError::EnvError(e))
            }
        }
    }

    /// Get the full server address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if running in development mode
    pub fn is_development(&self) -> bool {
        self.environment.to_lowercase() == "dev" || self.environment.to_lowercase() == "development"
    }

    /// Eviction policy for the session sweeper
    pub fn sweep_policy(&self) -> SweepPolicy {
        SweepPolicy {
            interval: Duration::from_secs(self.sweep_interval_secs),
            hard_ttl: Duration::from_secs(self.session_ttl_secs),
            empty_ttl: Duration::from_secs(self.empty_session_ttl_secs),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            log_level: default_log_level(),
            cors_origins: None,
            sweep_interval_secs: default_sweep_interval_secs(),
            session_ttl_secs: default_session_ttl_secs(),
            empty_session_ttl_secs: default_empty_session_ttl_secs(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    EnvError(envy::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::EnvError(e) => write!(f, "Environment variable error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_sweep_interval_secs() -> u64 {
    10 * 60
}

fn default_session_ttl_secs() -> u64 {
    60 * 60
}

fn default_empty_session_ttl_secs() -> u64 {
    5 * 60
}
