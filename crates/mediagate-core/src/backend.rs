//! MediaServerBackend trait - the capability interface every backend implements

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ServerConfig;
use crate::error::{BackendError, BackendResult, ConfigError};
use crate::models::{
    LibraryDescriptor, MediaCounts, MediaItem, MediaQuery, PlayItem, TvEpisodes, WebhookEvent,
    WebhookPayload,
};

/// The core trait that all media-server connections implement.
///
/// One implementation exists per backend product (Plex, Emby, Jellyfin, ...).
/// The gateway never branches on the product: it only talks to this trait.
///
/// Transport concerns (authentication, HTTP, per-call timeouts) live in the
/// implementation. Connectivity failures must be reported as errors for which
/// [`BackendError::is_connectivity`] returns true.
///
/// Backends can leave default implementations for features they don't support.
#[async_trait]
pub trait MediaServerBackend: Send + Sync {
    // =========================================================================
    // Connection
    // =========================================================================

    /// Backend product type, matched against `ServerConfig::server_type`
    fn server_type(&self) -> &str;

    /// Whether the backend knows its connection to be down
    fn is_inactive(&self) -> bool;

    /// Re-establish the connection
    async fn reconnect(&self) -> BackendResult<()>;

    /// Release the connection. Called once when the instance is retired.
    async fn shutdown(&self) {}

    // =========================================================================
    // Libraries
    // =========================================================================

    /// List libraries, optionally including hidden ones
    async fn list_libraries(&self, include_hidden: bool) -> BackendResult<Vec<LibraryDescriptor>>;

    /// One page of a library's items
    async fn list_items(
        &self,
        library_id: &str,
        start_index: usize,
        limit: usize,
    ) -> BackendResult<Vec<MediaItem>>;

    /// Item details by backend-native id
    async fn get_item_info(&self, item_id: &str) -> BackendResult<Option<MediaItem>>;

    // =========================================================================
    // Existence
    // =========================================================================

    /// Movies matching the query under the backend's own matching rule
    async fn find_movies(&self, query: &MediaQuery<'_>) -> BackendResult<Vec<MediaItem>>;

    /// Episodes recorded for a show.
    ///
    /// The show is identified by `query`, by `item_id`, or both. `Ok(None)`
    /// means the show is absent from this backend.
    async fn find_tv_episodes(
        &self,
        query: Option<&MediaQuery<'_>>,
        item_id: Option<&str>,
    ) -> BackendResult<Option<TvEpisodes>>;

    // =========================================================================
    // Statistics & playback
    // =========================================================================

    /// Media counts, if the backend can report them
    async fn get_media_counts(&self) -> BackendResult<Option<MediaCounts>>;

    /// Items with playback in progress
    async fn get_resume_list(&self, count: usize) -> BackendResult<Vec<PlayItem>> {
        let _ = count;
        Ok(vec![])
    }

    /// Most recently added items
    async fn get_latest_list(&self, count: usize) -> BackendResult<Vec<PlayItem>> {
        let _ = count;
        Ok(vec![])
    }

    /// Playback URL for an item
    async fn get_play_url(&self, item_id: &str) -> BackendResult<Option<String>> {
        let _ = item_id;
        Err(BackendError::NotSupported("get_play_url".to_string()))
    }

    // =========================================================================
    // Webhooks
    // =========================================================================

    /// Decode a webhook payload sent by this backend.
    ///
    /// `Ok(None)` or `Err(BackendError::Parse)` both mean "not mine".
    fn decode_webhook(&self, payload: &WebhookPayload) -> BackendResult<Option<WebhookEvent>> {
        let _ = payload;
        Ok(None)
    }
}

/// Builds backend connections of one product type from configuration
#[async_trait]
pub trait BackendFactory: Send + Sync {
    /// Backend product type this factory handles
    fn server_type(&self) -> &str;

    /// Build a connection from a validated config.
    ///
    /// Must not fail just because the server is unreachable: an unreachable
    /// backend is returned and reports `is_inactive() == true`.
    async fn connect(&self, config: &ServerConfig)
        -> Result<Arc<dyn MediaServerBackend>, ConfigError>;
}
