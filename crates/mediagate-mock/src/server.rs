//! Mock media server

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use mediagate_core::{
    BackendError, BackendResult, LibraryDescriptor, MediaCounts, MediaItem, MediaQuery, MediaType,
    MediaServerBackend, PlayItem, SeasonMap, TvEpisodes, WebhookEvent, WebhookEventKind,
    WebhookPayload,
};
use parking_lot::{Mutex, RwLock};
use serde::Deserialize;
use tracing::{debug, trace};

use crate::config::{MockMovie, MockServerConfig, MockShow};

/// In-memory media server
pub struct MockMediaServer {
    name: String,
    server_type: String,
    config: MockServerConfig,
    movies: RwLock<Vec<MockMovie>>,
    shows: RwLock<Vec<MockShow>>,
    connected: AtomicBool,
    stalled: AtomicBool,
    shut_down: AtomicBool,
    fail_next: AtomicUsize,
    reconnects: AtomicUsize,
    /// Backend requests in the order they were made
    calls: Mutex<Vec<String>>,
}

impl MockMediaServer {
    pub fn new(name: impl Into<String>, config: MockServerConfig) -> Self {
        Self {
            name: name.into(),
            server_type: "mock".to_string(),
            connected: AtomicBool::new(config.connected),
            movies: RwLock::new(config.movies.clone()),
            shows: RwLock::new(config.shows.clone()),
            config,
            stalled: AtomicBool::new(false),
            shut_down: AtomicBool::new(false),
            fail_next: AtomicUsize::new(0),
            reconnects: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Report a different product type, for routing tests
    pub fn with_server_type(mut self, server_type: impl Into<String>) -> Self {
        self.server_type = server_type.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set connection state
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Make every call hang until cleared
    pub fn set_stalled(&self, stalled: bool) {
        self.stalled.store(stalled, Ordering::SeqCst);
    }

    /// Fail the next `n` calls with a connectivity error, without going down
    pub fn fail_next_calls(&self, n: usize) {
        self.fail_next.store(n, Ordering::SeqCst);
    }

    pub fn add_movie(&self, movie: MockMovie) {
        self.movies.write().push(movie);
    }

    pub fn add_show(&self, show: MockShow) {
        self.shows.write().push(show);
    }

    pub fn reconnect_count(&self) -> usize {
        self.reconnects.load(Ordering::SeqCst)
    }

    /// How many times `op` was requested
    pub fn call_count(&self, op: &str) -> usize {
        self.calls.lock().iter().filter(|c| *c == op).count()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    /// Common prologue of every request
    async fn begin(&self, op: &str) -> BackendResult<()> {
        self.calls.lock().push(op.to_string());
        trace!(server = %self.name, op, "Mock request");

        if self.stalled.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        self.delay().await;

        if !self.connected.load(Ordering::SeqCst) {
            return Err(BackendError::Connectivity(format!("{} is offline", self.name)));
        }
        let injected = self
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(BackendError::Connectivity("connection reset".to_string()));
        }
        Ok(())
    }

    async fn delay(&self) {
        if self.config.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;
        }
    }

    fn find_show(&self, query: Option<&MediaQuery<'_>>, item_id: Option<&str>) -> Option<MockShow> {
        let shows = self.shows.read();
        let by_id = item_id.and_then(|id| shows.iter().find(|s| s.id == id));
        let by_query = || {
            query.and_then(|q| {
                shows
                    .iter()
                    .find(|s| same_media(q, &s.title, s.original_title.as_deref(), s.year, s.tmdb_id))
            })
        };
        by_id.or_else(by_query).cloned()
    }
}

/// Same movie or show: TMDB id when both sides have one, otherwise a
/// case-insensitive title match plus the year when both sides have one
fn same_media(
    query: &MediaQuery<'_>,
    title: &str,
    original_title: Option<&str>,
    year: Option<u16>,
    tmdb_id: Option<u64>,
) -> bool {
    if let (Some(wanted), Some(have)) = (query.tmdb_id, tmdb_id) {
        return wanted == have;
    }

    let candidates = [Some(title), original_title];
    let wanted = [Some(query.title), query.original_title];
    let title_match = wanted.iter().flatten().any(|w| {
        candidates
            .iter()
            .flatten()
            .any(|c| c.to_lowercase() == w.to_lowercase())
    });

    let year_match = match (query.year, year) {
        (Some(wanted), Some(have)) => wanted == have,
        _ => true,
    };
    title_match && year_match
}

fn movie_item(movie: &MockMovie) -> MediaItem {
    MediaItem {
        item_id: movie.id.clone(),
        library_id: movie.library.clone(),
        media_type: MediaType::Movie,
        title: movie.title.clone(),
        original_title: movie.original_title.clone(),
        year: movie.year,
        tmdb_id: movie.tmdb_id,
        path: None,
    }
}

fn show_item(show: &MockShow) -> MediaItem {
    MediaItem {
        item_id: show.id.clone(),
        library_id: show.library.clone(),
        media_type: MediaType::Tv,
        title: show.title.clone(),
        original_title: show.original_title.clone(),
        year: show.year,
        tmdb_id: show.tmdb_id,
        path: None,
    }
}

/// JSON body the mock accepts as a webhook
#[derive(Debug, Deserialize)]
struct MockWebhookBody {
    #[serde(alias = "Event")]
    event: String,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default, alias = "Title")]
    title: Option<String>,
    #[serde(default, alias = "Text")]
    text: Option<String>,
    #[serde(default, alias = "Image")]
    image: Option<String>,
    #[serde(default, alias = "ItemType")]
    item_type: Option<String>,
    #[serde(default, alias = "ItemName")]
    item_name: Option<String>,
    #[serde(default, alias = "ItemId")]
    item_id: Option<String>,
    #[serde(default, alias = "UserName")]
    user_name: Option<String>,
    #[serde(default, alias = "DeviceName")]
    device_name: Option<String>,
    #[serde(default, alias = "Client")]
    client: Option<String>,
}

#[async_trait]
impl MediaServerBackend for MockMediaServer {
    fn server_type(&self) -> &str {
        &self.server_type
    }

    fn is_inactive(&self) -> bool {
        !self.connected.load(Ordering::SeqCst)
    }

    async fn reconnect(&self) -> BackendResult<()> {
        self.reconnects.fetch_add(1, Ordering::SeqCst);
        self.delay().await;

        if self.config.reconnect_fails {
            return Err(BackendError::Connectivity(format!(
                "{} refused the connection",
                self.name
            )));
        }
        self.connected.store(true, Ordering::SeqCst);
        debug!(server = %self.name, "Mock reconnected");
        Ok(())
    }

    async fn shutdown(&self) {
        self.shut_down.store(true, Ordering::SeqCst);
        self.connected.store(false, Ordering::SeqCst);
    }

    async fn list_libraries(&self, include_hidden: bool) -> BackendResult<Vec<LibraryDescriptor>> {
        self.begin("list_libraries").await?;

        let movies = self.movies.read();
        let shows = self.shows.read();
        let libraries = self
            .config
            .libraries
            .iter()
            .filter(|lib| include_hidden || !lib.hidden)
            .map(|lib| {
                let count = movies.iter().filter(|m| m.library == lib.id).count()
                    + shows.iter().filter(|s| s.library == lib.id).count();
                LibraryDescriptor {
                    server: String::new(),
                    id: lib.id.clone(),
                    name: lib.name.clone(),
                    kind: lib.kind,
                    path: lib.path.clone(),
                    item_count: Some(count as u64),
                    hidden: lib.hidden,
                    synced: false,
                }
            })
            .collect();
        Ok(libraries)
    }

    async fn list_items(
        &self,
        library_id: &str,
        start_index: usize,
        limit: usize,
    ) -> BackendResult<Vec<MediaItem>> {
        self.begin("list_items").await?;

        let movies = self.movies.read();
        let shows = self.shows.read();
        let items = movies
            .iter()
            .filter(|m| m.library == library_id)
            .map(movie_item)
            .chain(shows.iter().filter(|s| s.library == library_id).map(show_item))
            .skip(start_index)
            .take(limit)
            .collect();
        Ok(items)
    }

    async fn get_item_info(&self, item_id: &str) -> BackendResult<Option<MediaItem>> {
        self.begin("get_item_info").await?;

        if let Some(movie) = self.movies.read().iter().find(|m| m.id == item_id) {
            return Ok(Some(movie_item(movie)));
        }
        Ok(self
            .shows
            .read()
            .iter()
            .find(|s| s.id == item_id)
            .map(show_item))
    }

    async fn find_movies(&self, query: &MediaQuery<'_>) -> BackendResult<Vec<MediaItem>> {
        self.begin("find_movies").await?;

        Ok(self
            .movies
            .read()
            .iter()
            .filter(|m| same_media(query, &m.title, m.original_title.as_deref(), m.year, m.tmdb_id))
            .map(movie_item)
            .collect())
    }

    async fn find_tv_episodes(
        &self,
        query: Option<&MediaQuery<'_>>,
        item_id: Option<&str>,
    ) -> BackendResult<Option<TvEpisodes>> {
        self.begin("find_tv_episodes").await?;

        Ok(self.find_show(query, item_id).map(|show| TvEpisodes {
            item_id: Some(show.id),
            seasons: show.episodes.into_iter().collect(),
        }))
    }

    async fn get_media_counts(&self) -> BackendResult<Option<MediaCounts>> {
        self.begin("get_media_counts").await?;

        if !self.config.report_counts {
            return Ok(None);
        }
        let shows = self.shows.read();
        let episode_count: usize = shows
            .iter()
            .map(|s| s.episodes.iter().copied().collect::<SeasonMap>().episode_count())
            .sum();
        Ok(Some(MediaCounts {
            movie_count: self.movies.read().len() as u64,
            tv_count: shows.len() as u64,
            episode_count: episode_count as u64,
            user_count: self.config.users,
        }))
    }

    async fn get_resume_list(&self, count: usize) -> BackendResult<Vec<PlayItem>> {
        self.begin("get_resume_list").await?;
        Ok(self.config.resume.iter().take(count).cloned().collect())
    }

    async fn get_latest_list(&self, count: usize) -> BackendResult<Vec<PlayItem>> {
        self.begin("get_latest_list").await?;
        Ok(self.config.latest.iter().take(count).cloned().collect())
    }

    async fn get_play_url(&self, item_id: &str) -> BackendResult<Option<String>> {
        self.begin("get_play_url").await?;

        let known = self.movies.read().iter().any(|m| m.id == item_id)
            || self.shows.read().iter().any(|s| s.id == item_id);
        Ok(known.then(|| format!("{}/web/play/{}", self.config.base_url, item_id)))
    }

    fn decode_webhook(&self, payload: &WebhookPayload) -> BackendResult<Option<WebhookEvent>> {
        let raw: &[u8] = if !payload.body.is_empty() {
            payload.body.as_ref()
        } else if let Some(form) = payload.form.get("payload") {
            form.as_bytes()
        } else {
            return Ok(None);
        };

        let body: MockWebhookBody =
            serde_json::from_slice(raw).map_err(|e| BackendError::Parse(e.to_string()))?;
        if body
            .channel
            .as_deref()
            .is_some_and(|c| c != self.config.webhook_channel)
        {
            return Ok(None);
        }

        let kind = WebhookEventKind::from(body.event.as_str());
        let title = body.title.unwrap_or_else(|| kind.to_string());
        let mut event = WebhookEvent::new(kind, self.server_type.clone(), title);
        event.text = body.text;
        event.image = body.image;
        event.item_type = body.item_type;
        event.item_name = body.item_name;
        event.item_id = body.item_id;
        event.user_name = body.user_name;
        event.device_name = body.device_name;
        event.client = body.client;
        Ok(Some(event))
    }
}

impl std::fmt::Debug for MockMediaServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockMediaServer")
            .field("name", &self.name)
            .field("server_type", &self.server_type)
            .field("connected", &self.connected.load(Ordering::SeqCst))
            .finish()
    }
}
