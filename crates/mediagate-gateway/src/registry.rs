//! Instance registry - named backend connections in configuration order
//!
//! The registry exclusively owns every backend connection. Callers borrow an
//! instance by name for the duration of one operation and must not keep the
//! `Arc` around: a reconfiguration may retire it at any time.
//!
//! The name map sits behind a read-mostly lock that is never held across a
//! backend call.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use mediagate_core::{BackendFactory, ConfigError, MediaServerBackend, ServerConfig};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::instance::ServerInstance;

#[derive(Default)]
struct RegistryInner {
    /// Names in insertion order
    order: Vec<String>,
    instances: HashMap<String, Arc<ServerInstance>>,
}

/// Holds the configured backend connections, keyed by name
pub struct InstanceRegistry {
    inner: RwLock<RegistryInner>,
    call_timeout: Duration,
}

impl InstanceRegistry {
    /// Create an empty registry; `call_timeout` bounds every backend call
    pub fn new(call_timeout: Duration) -> Self {
        Self {
            inner: RwLock::new(RegistryInner::default()),
            call_timeout,
        }
    }

    /// Register a backend under `config.name`.
    ///
    /// A registration with an existing name keeps that name's position in the
    /// resolution order and releases the previous connection.
    pub async fn register(
        &self,
        config: ServerConfig,
        backend: Arc<dyn MediaServerBackend>,
    ) -> Result<Arc<ServerInstance>, ConfigError> {
        config.validate()?;
        if backend.server_type() != config.server_type {
            return Err(ConfigError::invalid(
                &config.name,
                format!(
                    "backend type '{}' does not match configured type '{}'",
                    backend.server_type(),
                    config.server_type
                ),
            ));
        }

        let name = config.name.clone();
        let instance = Arc::new(ServerInstance::new(config, backend, self.call_timeout));

        let previous = {
            let mut inner = self.inner.write();
            let previous = inner.instances.insert(name.clone(), instance.clone());
            if previous.is_none() {
                inner.order.push(name.clone());
            }
            previous
        };

        match previous {
            Some(old) => {
                info!(server = %name, "Replaced media server instance");
                old.backend().shutdown().await;
            }
            None => {
                info!(
                    server = %name,
                    server_type = %instance.server_type(),
                    state = %instance.state(),
                    "Registered media server instance"
                );
            }
        }

        Ok(instance)
    }

    /// Build and register every config entry, in order.
    ///
    /// A bad entry is logged and skipped; it never prevents the remaining
    /// entries from loading. Returns the number of registered instances.
    pub async fn load(
        &self,
        configs: &[ServerConfig],
        factories: &[Arc<dyn BackendFactory>],
    ) -> usize {
        let mut loaded = 0;
        for config in configs {
            match self.load_one(config, factories).await {
                Ok(_) => loaded += 1,
                Err(ConfigError::Disabled(name)) => {
                    debug!(server = %name, "Skipping disabled media server");
                }
                Err(e) => {
                    warn!(server = %config.name, error = %e, "Skipping media server with invalid configuration");
                }
            }
        }
        loaded
    }

    async fn load_one(
        &self,
        config: &ServerConfig,
        factories: &[Arc<dyn BackendFactory>],
    ) -> Result<Arc<ServerInstance>, ConfigError> {
        config.validate()?;
        let factory = factories
            .iter()
            .find(|f| f.server_type() == config.server_type)
            .ok_or_else(|| ConfigError::UnknownType {
                name: config.name.clone(),
                server_type: config.server_type.clone(),
            })?;

        let backend = factory.connect(config).await?;
        self.register(config.clone(), backend).await
    }

    /// Remove an instance and release its connection
    pub async fn unregister(&self, name: &str) -> bool {
        let removed = {
            let mut inner = self.inner.write();
            let removed = inner.instances.remove(name);
            if removed.is_some() {
                inner.order.retain(|n| n != name);
            }
            removed
        };

        match removed {
            Some(instance) => {
                instance.backend().shutdown().await;
                info!(server = %name, "Unregistered media server instance");
                true
            }
            None => false,
        }
    }

    /// Release every connection and empty the registry
    pub async fn shutdown(&self) {
        let drained: Vec<Arc<ServerInstance>> = {
            let mut inner = self.inner.write();
            let order = std::mem::take(&mut inner.order);
            let mut instances = std::mem::take(&mut inner.instances);
            order.iter().filter_map(|n| instances.remove(n)).collect()
        };

        for instance in drained {
            debug!(server = %instance.name(), "Releasing media server connection");
            instance.backend().shutdown().await;
        }
    }

    /// Look up an instance by name
    pub fn get(&self, name: &str) -> Option<Arc<ServerInstance>> {
        self.inner.read().instances.get(name).cloned()
    }

    /// Look up an instance by name, only if it has the given backend type
    pub fn get_typed(&self, name: &str, server_type: &str) -> Option<Arc<ServerInstance>> {
        self.get(name).filter(|i| i.server_type() == server_type)
    }

    /// Snapshot of all instances in configuration order
    pub fn list_all(&self) -> Vec<Arc<ServerInstance>> {
        let inner = self.inner.read();
        inner
            .order
            .iter()
            .filter_map(|n| inner.instances.get(n).cloned())
            .collect()
    }

    /// Instance names in configuration order
    pub fn names(&self) -> Vec<String> {
        self.inner.read().order.clone()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.read().instances.contains_key(name)
    }

    /// Whether `instance` is still the one registered under its name
    pub fn is_current(&self, instance: &Arc<ServerInstance>) -> bool {
        self.inner
            .read()
            .instances
            .get(instance.name())
            .is_some_and(|current| Arc::ptr_eq(current, instance))
    }

    pub fn len(&self) -> usize {
        self.inner.read().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InstanceRegistry {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediagate_mock::{MockBackendFactory, MockMediaServer, MockServerConfig};
    use pretty_assertions::assert_eq;

    fn mock(name: &str) -> Arc<MockMediaServer> {
        Arc::new(MockMediaServer::new(name, MockServerConfig::default()))
    }

    #[tokio::test]
    async fn preserves_insertion_order() {
        let registry = InstanceRegistry::default();
        for name in ["c", "a", "b"] {
            registry
                .register(ServerConfig::new(name, "mock"), mock(name))
                .await
                .unwrap();
        }

        assert_eq!(registry.names(), vec!["c", "a", "b"]);
        let listed: Vec<_> = registry
            .list_all()
            .iter()
            .map(|i| i.name().to_string())
            .collect();
        assert_eq!(listed, vec!["c", "a", "b"]);
        assert!(registry.get("a").is_some());
        assert!(registry.get("z").is_none());
    }

    #[tokio::test]
    async fn reregistration_replaces_and_releases() {
        let registry = InstanceRegistry::default();
        let first = mock("a");
        registry
            .register(ServerConfig::new("a", "mock"), first.clone())
            .await
            .unwrap();
        registry
            .register(ServerConfig::new("b", "mock"), mock("b"))
            .await
            .unwrap();

        let stale = registry.get("a").unwrap();
        let second = mock("a");
        registry
            .register(ServerConfig::new("a", "mock"), second.clone())
            .await
            .unwrap();

        assert!(first.is_shut_down());
        assert!(!second.is_shut_down());
        assert_eq!(registry.names(), vec!["a", "b"]);
        assert_eq!(registry.len(), 2);
        assert!(!registry.is_current(&stale));
        assert!(registry.is_current(&registry.get("a").unwrap()));
    }

    #[tokio::test]
    async fn type_mismatch_rejected() {
        let registry = InstanceRegistry::default();
        let err = registry
            .register(ServerConfig::new("a", "plex"), mock("a"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn load_skips_invalid_entries() {
        let registry = InstanceRegistry::default();
        let factories: Vec<Arc<dyn BackendFactory>> = vec![Arc::new(MockBackendFactory::new())];

        let mut disabled = ServerConfig::new("off", "mock");
        disabled.enabled = false;
        let configs = vec![
            ServerConfig::new("a", "mock"),
            ServerConfig::new("", "mock"),
            ServerConfig::new("k", "kodi"),
            ServerConfig::new("bad", "mock")
                .with_config(serde_json::json!({ "latency_ms": "slow" })),
            disabled,
            ServerConfig::new("b", "mock"),
        ];

        assert_eq!(registry.load(&configs, &factories).await, 2);
        assert_eq!(registry.names(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn typed_lookup() {
        let registry = InstanceRegistry::default();
        registry
            .register(ServerConfig::new("a", "mock"), mock("a"))
            .await
            .unwrap();

        assert!(registry.get_typed("a", "mock").is_some());
        assert!(registry.get_typed("a", "plex").is_none());
    }

    #[tokio::test]
    async fn unregister_and_shutdown_release_handles() {
        let registry = InstanceRegistry::default();
        let a = mock("a");
        let b = mock("b");
        registry
            .register(ServerConfig::new("a", "mock"), a.clone())
            .await
            .unwrap();
        registry
            .register(ServerConfig::new("b", "mock"), b.clone())
            .await
            .unwrap();

        assert!(registry.unregister("a").await);
        assert!(!registry.unregister("a").await);
        assert!(a.is_shut_down());
        assert_eq!(registry.names(), vec!["b"]);

        registry.shutdown().await;
        assert!(b.is_shut_down());
        assert!(registry.is_empty());
    }
}
