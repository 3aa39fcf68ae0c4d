//! Gateway configuration
//!
//! Loaded from TOML. Every `[gateway]` field has a default, so an empty
//! file is a valid configuration for an empty gateway.
//!
//! ```toml
//! [gateway]
//! fallback = "concurrent"
//! call_timeout_secs = 10
//!
//! [[servers]]
//! name = "living-room"
//! type = "mock"
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use mediagate_core::{ConfigError, ServerConfig};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// How fallback operations dispatch backend calls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackMode {
    /// One instance at a time, in configuration order
    #[default]
    Sequential,
    /// All instances at once; the earliest-in-order positive result wins
    Concurrent,
}

/// Settings of the orchestration core
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewaySettings {
    #[serde(default)]
    pub fallback: FallbackMode,
    /// Upper bound for a single backend call
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,
    /// Period of the reconnect sweep
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    /// Page size used when streaming library items
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_call_timeout_secs() -> u64 {
    30
}

fn default_sweep_interval_secs() -> u64 {
    600
}

fn default_page_size() -> usize {
    100
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            fallback: FallbackMode::default(),
            call_timeout_secs: default_call_timeout_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
            page_size: default_page_size(),
        }
    }
}

impl GatewaySettings {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub gateway: GatewaySettings,
    /// Server entries in resolution order
    #[serde(default)]
    pub servers: Vec<ServerConfig>,
}

impl GatewayConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: GatewayConfig = toml::from_str(s).map_err(|e| ConfigError::Toml(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Reject settings the gateway cannot run with.
    ///
    /// Individual server entries are not validated here: a bad entry only
    /// excludes that instance when the registry is loaded.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.gateway;
        if g.call_timeout_secs == 0 {
            return Err(ConfigError::invalid("gateway", "call_timeout_secs must be > 0"));
        }
        if g.sweep_interval_secs == 0 {
            return Err(ConfigError::invalid("gateway", "sweep_interval_secs must be > 0"));
        }
        if g.page_size == 0 {
            return Err(ConfigError::invalid("gateway", "page_size must be > 0"));
        }

        let mut seen = HashSet::new();
        for server in &self.servers {
            if !seen.insert(server.name.as_str()) {
                warn!(server = %server.name, "Duplicate server name, later entry replaces earlier one");
            }
        }
        Ok(())
    }
}
