//! Factory building mock servers from `[[servers]]` entries

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mediagate_core::{BackendFactory, ConfigError, MediaServerBackend, ServerConfig};
use parking_lot::Mutex;
use tracing::info;

use crate::config::MockServerConfig;
use crate::server::MockMediaServer;

/// Builds [`MockMediaServer`]s and keeps a handle to each for inspection
pub struct MockBackendFactory {
    server_type: String,
    created: Mutex<HashMap<String, Arc<MockMediaServer>>>,
}

impl MockBackendFactory {
    pub fn new() -> Self {
        Self::with_server_type("mock")
    }

    /// Factory answering for another product type
    pub fn with_server_type(server_type: impl Into<String>) -> Self {
        Self {
            server_type: server_type.into(),
            created: Mutex::new(HashMap::new()),
        }
    }

    /// The server most recently built for `name`
    pub fn created(&self, name: &str) -> Option<Arc<MockMediaServer>> {
        self.created.lock().get(name).cloned()
    }
}

impl Default for MockBackendFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BackendFactory for MockBackendFactory {
    fn server_type(&self) -> &str {
        &self.server_type
    }

    async fn connect(
        &self,
        config: &ServerConfig,
    ) -> Result<Arc<dyn MediaServerBackend>, ConfigError> {
        let mock_config: MockServerConfig = config.backend_config()?;
        info!(
            server = %config.name,
            movies = mock_config.movies.len(),
            shows = mock_config.shows.len(),
            "Created mock media server"
        );

        let server = Arc::new(
            MockMediaServer::new(&config.name, mock_config).with_server_type(&self.server_type),
        );
        self.created
            .lock()
            .insert(config.name.clone(), server.clone());
        Ok(server as Arc<dyn MediaServerBackend>)
    }
}
