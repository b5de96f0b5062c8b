//! # Configuration
//!
//! Settings are layered, lowest precedence first:
//! 1. built-in defaults
//! 2. an optional TOML file (`--config`)
//! 3. environment variables (`FITSCOPE_RATE_LIMIT`, `FITSCOPE_CORS_ORIGINS`)
//! 4. CLI flags
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//! request_timeout_secs = 60
//! cache_max_age = 3600
//! rate_limit = 0
//! cors_origins = ["*"]
//!
//! [data]
//! catalog = "catalog.json"
//! database = "fitscope.db"
//! backend = "redb"
//! ```

use clap::ValueEnum;
use fitscope_core::FitscopeError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Maximum size of a configuration file (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

// =============================================================================
// BACKEND
// =============================================================================

/// Where fits are stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// In-memory store, optionally seeded from a JSON fits file.
    Memory,
    /// Persistent redb database.
    #[default]
    Redb,
}

impl Backend {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Redb => "redb",
        }
    }
}

// =============================================================================
// SECTIONS
// =============================================================================

/// `[server]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Per-request deadline; the request is dropped when it expires.
    pub request_timeout_secs: u64,
    /// `Cache-Control: max-age` on successful responses. 0 disables the header.
    pub cache_max_age: u32,
    /// Global requests per second. 0 disables rate limiting.
    pub rate_limit: u32,
    /// Allowed CORS origins, or `["*"]` for any.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            request_timeout_secs: 60,
            cache_max_age: 3600,
            rate_limit: 0,
            cors_origins: vec!["*".to_string()],
        }
    }
}

/// `[data]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataConfig {
    /// JSON catalog of groups and items.
    pub catalog: PathBuf,
    /// redb database file.
    pub database: PathBuf,
    pub backend: Backend,
    /// JSON fits file loaded into the memory backend at startup.
    pub fits: Option<PathBuf>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            catalog: PathBuf::from("catalog.json"),
            database: PathBuf::from("fitscope.db"),
            backend: Backend::Redb,
            fits: None,
        }
    }
}

// =============================================================================
// CONFIG
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: ServerConfig,
    pub data: DataConfig,
}

impl Config {
    /// Load the TOML file at `path`, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, FitscopeError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let metadata = std::fs::metadata(path).map_err(|e| {
            FitscopeError::Io(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(FitscopeError::InvalidInput(format!(
                "Config file size {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }

        let text = std::fs::read_to_string(path).map_err(|e| {
            FitscopeError::Io(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        Self::parse(&text)
    }

    /// Parse a TOML document.
    pub fn parse(text: &str) -> Result<Self, FitscopeError> {
        toml::from_str(text)
            .map_err(|e| FitscopeError::Serialization(format!("Invalid config: {}", e)))
    }

    /// Apply `FITSCOPE_RATE_LIMIT` and `FITSCOPE_CORS_ORIGINS`.
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var("FITSCOPE_RATE_LIMIT").ok().as_deref(),
            std::env::var("FITSCOPE_CORS_ORIGINS").ok().as_deref(),
        );
    }

    /// Apply raw override values as they would appear in the environment.
    ///
    /// An unparseable rate limit is ignored with a warning. Origins are a
    /// comma-separated list; blank entries are dropped.
    pub fn apply_overrides(&mut self, rate_limit: Option<&str>, cors_origins: Option<&str>) {
        if let Some(raw) = rate_limit {
            match raw.trim().parse::<u32>() {
                Ok(rps) => self.server.rate_limit = rps,
                Err(_) => tracing::warn!("Ignoring invalid FITSCOPE_RATE_LIMIT '{}'", raw),
            }
        }

        if let Some(raw) = cors_origins {
            let origins: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            if !origins.is_empty() {
                self.server.cors_origins = origins;
            }
        }
    }

    /// `host:port` for the listener.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

// =============================================================================
// TESTS
// =============================================================================
