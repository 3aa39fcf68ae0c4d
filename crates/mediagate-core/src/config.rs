//! Per-instance server configuration
//!
//! A `ServerConfig` names one backend connection. The `config` table is
//! opaque to the gateway and is interpreted only by the backend factory
//! registered for `server_type`.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Configuration for one named media-server connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Unique instance name
    pub name: String,
    /// Backend product type (e.g., "plex", "emby", "mock")
    #[serde(rename = "type")]
    pub server_type: String,
    /// Disabled entries are skipped at load time
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Library IDs kept in sync; empty means all libraries
    #[serde(default)]
    pub sync_libraries: Vec<String>,
    /// Backend-specific settings
    #[serde(default = "empty_table")]
    pub config: serde_json::Value,
}

fn default_enabled() -> bool {
    true
}

fn empty_table() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl ServerConfig {
    /// Create an enabled config with an empty backend table
    pub fn new(name: impl Into<String>, server_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            server_type: server_type.into(),
            enabled: true,
            sync_libraries: Vec::new(),
            config: empty_table(),
        }
    }

    /// Replace the backend-specific table
    pub fn with_config(mut self, config: serde_json::Value) -> Self {
        self.config = config;
        self
    }

    /// Check the fields the gateway itself depends on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::MissingName);
        }
        if !self.enabled {
            return Err(ConfigError::Disabled(self.name.clone()));
        }
        if self.server_type.trim().is_empty() {
            return Err(ConfigError::invalid(&self.name, "server type is empty"));
        }
        Ok(())
    }

    /// Whether a library is covered by `sync_libraries`
    pub fn is_synced(&self, library_id: &str) -> bool {
        self.sync_libraries.is_empty() || self.sync_libraries.iter().any(|id| id == library_id)
    }

    /// Deserialize the backend table into a typed config
    pub fn backend_config<T>(&self) -> Result<T, ConfigError>
    where
        T: serde::de::DeserializeOwned,
    {
        serde_json::from_value(self.config.clone())
            .map_err(|e| ConfigError::invalid(&self.name, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_blank_name_and_disabled() {
        assert!(matches!(
            ServerConfig::new("  ", "plex").validate(),
            Err(ConfigError::MissingName)
        ));

        let mut cfg = ServerConfig::new("den", "plex");
        cfg.enabled = false;
        assert!(matches!(cfg.validate(), Err(ConfigError::Disabled(_))));

        assert!(ServerConfig::new("den", "plex").validate().is_ok());
    }

    #[test]
    fn sync_libraries_filter() {
        let mut cfg = ServerConfig::new("den", "plex");
        assert!(cfg.is_synced("anything"));

        cfg.sync_libraries = vec!["1".into(), "3".into()];
        assert!(cfg.is_synced("3"));
        assert!(!cfg.is_synced("2"));
    }

    #[test]
    fn typed_backend_config() {
        #[derive(Deserialize)]
        struct Typed {
            host: String,
        }

        let cfg = ServerConfig::new("den", "plex")
            .with_config(serde_json::json!({ "host": "http://10.0.0.2:32400" }));
        let typed: Typed = cfg.backend_config().unwrap();
        assert_eq!(typed.host, "http://10.0.0.2:32400");

        let bad = ServerConfig::new("den", "plex").with_config(serde_json::json!({ "host": 5 }));
        assert!(matches!(
            bad.backend_config::<Typed>(),
            Err(ConfigError::Invalid { .. })
        ));
    }
}
