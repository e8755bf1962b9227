//! Service configuration
//!
//! Values come from environment variables first; command-line flags in the
//! binary override them.
//!
//! - `CLX_HOST`: bind host (default: 127.0.0.1)
//! - `CLX_PORT`: bind port (default: 5000)
//! - `CLX_FETCH_TIMEOUT_MS`: retriever timeout (default: 30000)
//! - `CLX_USER_AGENT`: retriever `User-Agent`
//! - `CLX_DATA_DIR`: directory for JSON lines storage; unset keeps records in memory
//! - `CLX_LENIENT_THUMBNAILS`: "true" to accept listings without a photo container
//! - `CLX_CORS_ORIGINS`: comma-separated extra origins allowed by CORS

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use tracing::info;

use crate::error::{Error, Result};
use crate::extraction::ExtractOptions;
use crate::retriever::RetrieverConfig;

/// Default bind port
pub const DEFAULT_PORT: u16 = 5000;

/// Where extracted records go
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StoreConfig {
    /// Keep records in process memory
    #[default]
    Memory,
    /// Append JSON lines under this directory
    JsonLines(PathBuf),
}

/// Complete service configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address
    pub host: IpAddr,
    /// Bind port
    pub port: u16,
    /// Retriever settings
    pub retriever: RetrieverConfig,
    /// Storage backend
    pub store: StoreConfig,
    /// Extraction switches
    pub extract: ExtractOptions,
    /// Origins allowed by CORS in addition to localhost
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: DEFAULT_PORT,
            retriever: RetrieverConfig::default(),
            store: StoreConfig::default(),
            extract: ExtractOptions::default(),
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] when a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] when a variable is set to an unparseable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("CLX_HOST") {
            config.host = host
                .parse()
                .map_err(|e| Error::config(format!("CLX_HOST={host}: {e}")))?;
        }
        if let Some(port) = lookup("CLX_PORT") {
            config.port = port
                .parse()
                .map_err(|e| Error::config(format!("CLX_PORT={port}: {e}")))?;
        }
        if let Some(timeout) = lookup("CLX_FETCH_TIMEOUT_MS") {
            let timeout_ms: u64 = timeout
                .parse()
                .map_err(|e| Error::config(format!("CLX_FETCH_TIMEOUT_MS={timeout}: {e}")))?;
            if timeout_ms == 0 {
                return Err(Error::config("CLX_FETCH_TIMEOUT_MS cannot be 0"));
            }
            config.retriever.timeout_ms = timeout_ms;
        }
        if let Some(agent) = lookup("CLX_USER_AGENT").filter(|a| !a.trim().is_empty()) {
            config.retriever.user_agent = agent;
        }
        if let Some(dir) = lookup("CLX_DATA_DIR").filter(|d| !d.trim().is_empty()) {
            config.store = StoreConfig::JsonLines(PathBuf::from(dir));
        }
        if let Some(lenient) = lookup("CLX_LENIENT_THUMBNAILS") {
            config.extract.require_thumbnails = !parse_bool("CLX_LENIENT_THUMBNAILS", &lenient)?;
        }
        if let Some(origins) = lookup("CLX_CORS_ORIGINS") {
            config.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect();
        }

        Ok(config)
    }

    /// Socket address to bind.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Log the effective configuration.
    pub fn log_summary(&self) {
        info!(
            addr = %self.socket_addr(),
            timeout_ms = self.retriever.timeout_ms,
            store = ?self.store,
            require_thumbnails = self.extract.require_thumbnails,
            cors_origins = self.cors_origins.len(),
            "configuration loaded"
        );
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(Error::config(format!("{key}={other}: expected true or false"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:5000");
        assert_eq!(config.store, StoreConfig::Memory);
        assert!(config.extract.require_thumbnails);
        assert!(config.cors_origins.is_empty());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("CLX_HOST", "0.0.0.0"),
            ("CLX_PORT", "8080"),
            ("CLX_FETCH_TIMEOUT_MS", "1500"),
            ("CLX_USER_AGENT", "bot/1.0"),
            ("CLX_DATA_DIR", "/tmp/listings"),
            ("CLX_LENIENT_THUMBNAILS", "true"),
            ("CLX_CORS_ORIGINS", "https://a.example, https://b.example,"),
        ])
        .unwrap();
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.retriever.timeout_ms, 1500);
        assert_eq!(config.retriever.user_agent, "bot/1.0");
        assert_eq!(config.store, StoreConfig::JsonLines(PathBuf::from("/tmp/listings")));
        assert!(!config.extract.require_thumbnails);
        assert_eq!(config.cors_origins, vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(load(&[("CLX_PORT", "http")]), Err(Error::Config(_))));
        assert!(matches!(load(&[("CLX_HOST", "nowhere")]), Err(Error::Config(_))));
        assert!(matches!(load(&[("CLX_FETCH_TIMEOUT_MS", "0")]), Err(Error::Config(_))));
        assert!(matches!(
            load(&[("CLX_LENIENT_THUMBNAILS", "maybe")]),
            Err(Error::Config(_))
        ));
    }
}
