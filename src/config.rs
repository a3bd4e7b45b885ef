use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::ingest::DEFAULT_FIRST_ROW_NUMBER;

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "KGRAPH_CONFIG";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub http_server: HttpServerConfig,
}

/// Graph service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GraphConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Bulk ingestion configuration
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    /// Row number reported for the first data row in error messages.
    #[serde(default = "default_first_row_number")]
    pub first_row_number: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            first_row_number: default_first_row_number(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "default_http_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub port: u16,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_http_host(),
            port: default_http_port(),
            allowed_origins: Vec::new(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_first_row_number() -> usize {
    DEFAULT_FIRST_ROW_NUMBER
}

fn default_http_host() -> String {
    "127.0.0.1".to_string()
}

fn default_http_port() -> u16 {
    8080
}

impl Config {
    /// Load configuration
    ///
    /// Loads environment variables from .env file (if present) first.
    /// Looks for a config file in this order:
    /// 1. Path specified in KGRAPH_CONFIG environment variable (must exist)
    /// 2. ./config.toml in current directory (optional)
    ///
    /// Falls back to defaults when neither is present.
    pub fn load() -> Result<Self> {
        let _ = dotenv::dotenv();

        match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(Path::new(&path)),
            Err(_) => {
                let default_path = PathBuf::from("config.toml");
                if default_path.exists() {
                    Self::from_file(&default_path)
                } else {
                    log::debug!("No config.toml found, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    /// Read and validate a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&config_str)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse and validate TOML config text
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(config_str).context("Failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.http_server.port == 0 {
            anyhow::bail!("http_server.port must be greater than 0");
        }

        if self.http_server.host.trim().is_empty() {
            anyhow::bail!("http_server.host must not be empty");
        }

        if self.ingest.first_row_number == 0 {
            anyhow::bail!("ingest.first_row_number must be at least 1");
        }

        Ok(())
    }

    /// Address the HTTP server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.http_server.host, self.http_server.port)
    }
}
