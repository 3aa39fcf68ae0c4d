//! One registered backend connection and its health state
//!
//! ```text
//!            connectivity failure / timeout / backend self-report
//!   Active ─────────────────────────────────────────────────────▶ Inactive
//!     ▲                                                              │
//!     └──────────────── reconnect() succeeded ◀──────────────────────┘
//! ```
//!
//! The flag only becomes `Active` once the backend reconnect call has
//! completed successfully. Reconnects of one instance are serialised;
//! other instances are never blocked by them.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use mediagate_core::{BackendResult, MediaServerBackend, ServerConfig};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Liveness of an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Active,
    Inactive,
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthState::Active => f.write_str("active"),
            HealthState::Inactive => f.write_str("inactive"),
        }
    }
}

/// A named backend connection owned by the registry
pub struct ServerInstance {
    config: ServerConfig,
    backend: Arc<dyn MediaServerBackend>,
    active: AtomicBool,
    reconnect_lock: Mutex<()>,
    call_timeout: Duration,
}

impl ServerInstance {
    /// Wrap a backend; the initial state comes from the backend's own liveness report
    pub(crate) fn new(
        config: ServerConfig,
        backend: Arc<dyn MediaServerBackend>,
        call_timeout: Duration,
    ) -> Self {
        let active = !backend.is_inactive();
        if !active {
            warn!(server = %config.name, "Media server unreachable at registration");
        }
        Self {
            config,
            backend,
            active: AtomicBool::new(active),
            reconnect_lock: Mutex::new(()),
            call_timeout,
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn server_type(&self) -> &str {
        &self.config.server_type
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn backend(&self) -> &Arc<dyn MediaServerBackend> {
        &self.backend
    }

    /// Current health; demotes the instance if the backend reports itself down
    pub fn state(&self) -> HealthState {
        if self.active.load(Ordering::SeqCst) && self.backend.is_inactive() {
            self.mark_inactive("backend reports connection down");
        }
        if self.active.load(Ordering::SeqCst) {
            HealthState::Active
        } else {
            HealthState::Inactive
        }
    }

    pub fn is_active(&self) -> bool {
        self.state() == HealthState::Active
    }

    /// Transition to `Inactive`; logs only on an actual transition
    pub fn mark_inactive(&self, reason: &str) {
        if self.active.swap(false, Ordering::SeqCst) {
            warn!(server = %self.name(), reason, "Media server marked inactive");
        }
    }

    /// Re-establish the connection if the instance is `Inactive`.
    ///
    /// Returns whether the instance is `Active` afterwards. On an already
    /// active instance this returns immediately without touching the backend.
    pub async fn reconnect(&self) -> bool {
        if self.is_active() {
            return true;
        }

        let _guard = self.reconnect_lock.lock().await;
        // Another caller may have finished a reconnect while we waited
        if self.active.load(Ordering::SeqCst) {
            return true;
        }

        debug!(server = %self.name(), "Reconnecting media server");
        match tokio::time::timeout(self.call_timeout, self.backend.reconnect()).await {
            Ok(Ok(())) if !self.backend.is_inactive() => {
                self.active.store(true, Ordering::SeqCst);
                info!(server = %self.name(), "Media server reconnected");
                true
            }
            Ok(Ok(())) => {
                warn!(server = %self.name(), "Reconnect returned but backend is still down");
                false
            }
            Ok(Err(e)) => {
                warn!(server = %self.name(), error = %e, "Reconnect failed");
                false
            }
            Err(_) => {
                warn!(
                    server = %self.name(),
                    timeout_ms = self.call_timeout.as_millis() as u64,
                    "Reconnect timed out"
                );
                false
            }
        }
    }

    /// Run one backend call under the per-call timeout.
    ///
    /// Any failure yields `None`. Connectivity failures and timeouts also
    /// demote the instance to `Inactive`.
    pub async fn call<T, F, Fut>(&self, op: &'static str, f: F) -> Option<T>
    where
        F: FnOnce(Arc<dyn MediaServerBackend>) -> Fut,
        Fut: Future<Output = BackendResult<T>>,
    {
        match tokio::time::timeout(self.call_timeout, f(self.backend.clone())).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) if e.is_connectivity() => {
                self.mark_inactive(&format!("{op}: {e}"));
                None
            }
            Ok(Err(e)) => {
                debug!(server = %self.name(), op, error = %e, "Backend call failed");
                None
            }
            Err(_) => {
                self.mark_inactive(&format!("{op}: timed out"));
                None
            }
        }
    }
}

impl fmt::Debug for ServerInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerInstance")
            .field("name", &self.config.name)
            .field("type", &self.config.server_type)
            .field("active", &self.active.load(Ordering::SeqCst))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediagate_core::BackendError;
    use mediagate_mock::{MockMediaServer, MockServerConfig};

    fn instance(mock: Arc<MockMediaServer>) -> ServerInstance {
        ServerInstance::new(
            ServerConfig::new("den", "mock"),
            mock,
            Duration::from_secs(1),
        )
    }

    #[tokio::test]
    async fn initial_state_follows_backend() {
        let up = Arc::new(MockMediaServer::new("den", MockServerConfig::default()));
        assert_eq!(instance(up).state(), HealthState::Active);

        let down = Arc::new(MockMediaServer::new(
            "den",
            MockServerConfig {
                connected: false,
                ..Default::default()
            },
        ));
        assert_eq!(instance(down).state(), HealthState::Inactive);
    }

    #[tokio::test]
    async fn reconnect_on_active_is_noop() {
        let mock = Arc::new(MockMediaServer::new("den", MockServerConfig::default()));
        let inst = instance(mock.clone());

        assert!(inst.reconnect().await);
        assert!(inst.reconnect().await);
        assert_eq!(mock.reconnect_count(), 0);
        assert_eq!(inst.state(), HealthState::Active);
    }

    #[tokio::test]
    async fn connectivity_error_marks_inactive_and_reconnect_restores() {
        let mock = Arc::new(MockMediaServer::new("den", MockServerConfig::default()));
        let inst = instance(mock.clone());

        let result: Option<()> = inst
            .call("probe", |_| async { Err(BackendError::Connectivity("reset".into())) })
            .await;
        assert!(result.is_none());
        assert_eq!(inst.state(), HealthState::Inactive);

        assert!(inst.reconnect().await);
        assert_eq!(inst.state(), HealthState::Active);
        assert_eq!(mock.reconnect_count(), 1);
    }

    #[tokio::test]
    async fn non_connectivity_error_keeps_active() {
        let mock = Arc::new(MockMediaServer::new("den", MockServerConfig::default()));
        let inst = instance(mock);

        let result: Option<()> = inst
            .call("get_item_info", |_| async { Err(BackendError::NotFound("7".into())) })
            .await;
        assert!(result.is_none());
        assert_eq!(inst.state(), HealthState::Active);
    }

    #[tokio::test]
    async fn backend_self_report_demotes() {
        let mock = Arc::new(MockMediaServer::new("den", MockServerConfig::default()));
        let inst = instance(mock.clone());

        mock.set_connected(false);
        assert_eq!(inst.state(), HealthState::Inactive);
    }

    #[tokio::test]
    async fn failed_reconnect_stays_inactive() {
        let mock = Arc::new(MockMediaServer::new(
            "den",
            MockServerConfig {
                connected: false,
                reconnect_fails: true,
                ..Default::default()
            },
        ));
        let inst = instance(mock.clone());

        assert!(!inst.reconnect().await);
        assert_eq!(inst.state(), HealthState::Inactive);
        assert_eq!(mock.reconnect_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_counts_as_connectivity_failure() {
        let mock = Arc::new(MockMediaServer::new("den", MockServerConfig::default()));
        let inst = instance(mock.clone());
        mock.set_stalled(true);

        let libs = inst
            .call("list_libraries", |b| async move { b.list_libraries(false).await })
            .await;
        assert!(libs.is_none());
        assert_eq!(inst.state(), HealthState::Inactive);
    }

    #[tokio::test]
    async fn concurrent_reconnects_hit_backend_once() {
        let mock = Arc::new(MockMediaServer::new(
            "den",
            MockServerConfig {
                connected: false,
                latency_ms: 20,
                ..Default::default()
            },
        ));
        let inst = Arc::new(instance(mock.clone()));

        let (a, b) = tokio::join!(inst.reconnect(), inst.reconnect());
        assert!(a && b);
        assert_eq!(mock.reconnect_count(), 1);
    }
}
