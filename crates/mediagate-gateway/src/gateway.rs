//! MediaGateway - the single entry point upstream callers use
//!
//! The gateway owns the instance registry and hands a borrowed view of it to
//! the resolver, router, aggregator and catalog for each call. None of its
//! operations fail for ordinary not-found or connectivity outcomes: they
//! return `None` or an empty list.

use std::sync::Arc;

use futures::future::join_all;
use futures::stream::BoxStream;
use mediagate_core::{
    BackendFactory, ExistMediaInfo, LibraryDescriptor, MediaInfo, MediaItem, PlayItem,
    SeasonInfo, Statistic, WebhookEvent, WebhookPayload,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::catalog::LibraryCatalog;
use crate::config::{GatewayConfig, GatewaySettings};
use crate::existence::ExistenceResolver;
use crate::instance::HealthState;
use crate::registry::InstanceRegistry;
use crate::statistics::StatisticsAggregator;
use crate::webhook::WebhookRouter;

/// Outcome of [`MediaGateway::test_connectivity`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectivityReport {
    pub ok: bool,
    pub message: String,
}

/// Health of one instance, as reported by [`MediaGateway::health_snapshot`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceHealth {
    pub name: String,
    pub server_type: String,
    pub state: HealthState,
}

/// Unified access to every configured media server
pub struct MediaGateway {
    registry: Arc<InstanceRegistry>,
    settings: GatewaySettings,
}

impl MediaGateway {
    /// Create a gateway over an existing registry
    pub fn new(registry: Arc<InstanceRegistry>, settings: GatewaySettings) -> Self {
        Self { registry, settings }
    }

    /// Build the registry from configuration, skipping invalid entries
    pub async fn from_config(config: &GatewayConfig, factories: &[Arc<dyn BackendFactory>]) -> Self {
        let registry = Arc::new(InstanceRegistry::new(config.gateway.call_timeout()));
        let loaded = registry.load(&config.servers, factories).await;
        info!(
            loaded,
            configured = config.servers.len(),
            "Media server registry loaded"
        );
        Self::new(registry, config.gateway.clone())
    }

    pub fn registry(&self) -> &Arc<InstanceRegistry> {
        &self.registry
    }

    pub fn settings(&self) -> &GatewaySettings {
        &self.settings
    }

    // =========================================================================
    // Health
    // =========================================================================

    /// Check every instance can list its libraries.
    ///
    /// Inactive instances get one reconnect attempt first. Fails closed on the
    /// first instance that cannot list libraries. `None` for an empty registry.
    pub async fn test_connectivity(&self) -> Option<ConnectivityReport> {
        let instances = self.registry.list_all();
        if instances.is_empty() {
            return None;
        }

        for instance in instances {
            if !instance.is_active() {
                instance.reconnect().await;
            }
            let libraries = instance
                .call("list_libraries", |b| async move { b.list_libraries(false).await })
                .await;
            if libraries.map_or(true, |l| l.is_empty()) {
                warn!(server = %instance.name(), "Connectivity test failed");
                return Some(ConnectivityReport {
                    ok: false,
                    message: format!("Cannot connect to media server: {}", instance.name()),
                });
            }
        }

        Some(ConnectivityReport {
            ok: true,
            message: String::new(),
        })
    }

    /// Reconnect every inactive instance.
    ///
    /// Attempts run concurrently and independently, each bounded by the
    /// per-call timeout; failures leave the instance inactive for the next sweep.
    pub async fn periodic_reconnect_sweep(&self) {
        let inactive: Vec<_> = self
            .registry
            .list_all()
            .into_iter()
            .filter(|instance| !instance.is_active())
            .collect();
        if inactive.is_empty() {
            debug!("Reconnect sweep: all media servers active");
            return;
        }

        for instance in &inactive {
            info!(server = %instance.name(), "Media server connection lost, trying to reconnect");
        }
        let outcomes = join_all(inactive.iter().map(|instance| instance.reconnect())).await;
        let recovered = outcomes.iter().filter(|ok| **ok).count();
        info!(
            attempted = inactive.len(),
            recovered,
            "Reconnect sweep finished"
        );
    }

    /// Health of every instance in configuration order
    pub fn health_snapshot(&self) -> Vec<InstanceHealth> {
        self.registry
            .list_all()
            .iter()
            .map(|instance| InstanceHealth {
                name: instance.name().to_string(),
                server_type: instance.server_type().to_string(),
                state: instance.state(),
            })
            .collect()
    }

    // =========================================================================
    // Webhooks & existence
    // =========================================================================

    /// Decode a webhook sent by a backend of type `server_type`
    pub fn decode_webhook(
        &self,
        server_type: &str,
        payload: &WebhookPayload,
        source: Option<&str>,
    ) -> Option<WebhookEvent> {
        WebhookRouter::new(&self.registry).decode(server_type, payload, source)
    }

    /// Where `media` already exists, if anywhere
    pub async fn resolve_existence(
        &self,
        media: &MediaInfo,
        item_id: Option<&str>,
    ) -> Option<ExistMediaInfo> {
        ExistenceResolver::new(&self.registry, self.settings.fallback)
            .resolve(media, item_id)
            .await
    }

    // =========================================================================
    // Statistics & catalog
    // =========================================================================

    pub async fn statistics(&self, server: Option<&str>) -> Vec<Statistic> {
        StatisticsAggregator::new(&self.registry)
            .statistics(server)
            .await
    }

    pub async fn librarys(&self, server: &str, include_hidden: bool) -> Option<Vec<LibraryDescriptor>> {
        self.catalog().librarys(server, include_hidden).await
    }

    pub fn items(
        &self,
        server: &str,
        library_id: &str,
        start_index: usize,
        limit: usize,
    ) -> Option<BoxStream<'static, MediaItem>> {
        self.catalog().items(server, library_id, start_index, limit)
    }

    pub async fn item_info(&self, server: &str, item_id: &str) -> Option<MediaItem> {
        self.catalog().item_info(server, item_id).await
    }

    pub async fn tv_episodes(&self, server: &str, item_id: &str) -> Option<Vec<SeasonInfo>> {
        self.catalog().tv_episodes(server, item_id).await
    }

    pub async fn resume_list(&self, server: &str, count: usize) -> Vec<PlayItem> {
        self.catalog().resume_list(server, count).await
    }

    pub async fn latest_list(&self, server: &str, count: usize) -> Vec<PlayItem> {
        self.catalog().latest_list(server, count).await
    }

    pub async fn play_url(&self, server: &str, item_id: &str) -> Option<String> {
        self.catalog().play_url(server, item_id).await
    }

    /// Release every backend connection
    pub async fn shutdown(&self) {
        self.registry.shutdown().await;
        info!("Media gateway shut down");
    }

    fn catalog(&self) -> LibraryCatalog<'_> {
        LibraryCatalog::new(&self.registry, self.settings.page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediagate_core::{LibraryKind, ServerConfig};
    use mediagate_mock::{MockBackendFactory, MockLibrary, MockMediaServer, MockServerConfig};

    fn with_library() -> MockServerConfig {
        MockServerConfig {
            libraries: vec![MockLibrary {
                id: "1".into(),
                name: "Films".into(),
                kind: LibraryKind::Movies,
                hidden: false,
                path: None,
            }],
            ..Default::default()
        }
    }

    async fn gateway(entries: Vec<(&str, MockServerConfig)>) -> (MediaGateway, Vec<Arc<MockMediaServer>>) {
        let registry = Arc::new(InstanceRegistry::default());
        let mut mocks = Vec::new();
        for (name, config) in entries {
            let mock = Arc::new(MockMediaServer::new(name, config));
            registry
                .register(ServerConfig::new(name, "mock"), mock.clone())
                .await
                .unwrap();
            mocks.push(mock);
        }
        (MediaGateway::new(registry, GatewaySettings::default()), mocks)
    }

    #[tokio::test]
    async fn connectivity_empty_registry() {
        let (gw, _) = gateway(vec![]).await;
        assert_eq!(gw.test_connectivity().await, None);
    }

    #[tokio::test]
    async fn connectivity_ok_and_reconnects_inactive() {
        let down = MockServerConfig {
            connected: false,
            ..with_library()
        };
        let (gw, mocks) = gateway(vec![("a", with_library()), ("b", down)]).await;

        let report = gw.test_connectivity().await.unwrap();
        assert!(report.ok, "{}", report.message);
        assert_eq!(mocks[1].reconnect_count(), 1);
    }

    #[tokio::test]
    async fn connectivity_fails_closed() {
        let (gw, _) = gateway(vec![("a", with_library()), ("empty", MockServerConfig::default())]).await;

        let report = gw.test_connectivity().await.unwrap();
        assert!(!report.ok);
        assert!(report.message.contains("empty"));
    }

    #[tokio::test]
    async fn sweep_reconnects_only_inactive() {
        let down = MockServerConfig {
            connected: false,
            ..Default::default()
        };
        let stuck = MockServerConfig {
            connected: false,
            reconnect_fails: true,
            ..Default::default()
        };
        let (gw, mocks) = gateway(vec![
            ("up", MockServerConfig::default()),
            ("down", down),
            ("stuck", stuck),
        ])
        .await;

        gw.periodic_reconnect_sweep().await;

        assert_eq!(mocks[0].reconnect_count(), 0);
        assert_eq!(mocks[1].reconnect_count(), 1);
        assert_eq!(mocks[2].reconnect_count(), 1);

        let states: Vec<_> = gw.health_snapshot().into_iter().map(|h| h.state).collect();
        assert_eq!(
            states,
            vec![HealthState::Active, HealthState::Active, HealthState::Inactive]
        );

        gw.periodic_reconnect_sweep().await;
        assert_eq!(mocks[1].reconnect_count(), 1);
        assert_eq!(mocks[2].reconnect_count(), 2);
    }

    #[tokio::test]
    async fn from_config_uses_factories() {
        let config = GatewayConfig::from_toml_str(
            r#"
            [[servers]]
            name = "a"
            type = "mock"

            [[servers]]
            name = "b"
            type = "unknown"
            "#,
        )
        .unwrap();
        let factories: Vec<Arc<dyn BackendFactory>> = vec![Arc::new(MockBackendFactory::new())];

        let gw = MediaGateway::from_config(&config, &factories).await;
        assert_eq!(gw.registry().names(), vec!["a"]);

        gw.shutdown().await;
        assert!(gw.registry().is_empty());
    }
}
