//! Mock backend configuration
//!
//! Read from the opaque `config` table of a `[[servers]]` entry with
//! `type = "mock"`.

use mediagate_core::{LibraryKind, PlayItem};
use serde::Deserialize;

/// Catalog and behaviour of one mock server
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MockServerConfig {
    /// Whether the server starts reachable
    pub connected: bool,
    /// Delay added to every call (milliseconds)
    pub latency_ms: u64,
    /// Make every reconnect attempt fail
    pub reconnect_fails: bool,
    /// Only webhooks addressed to this channel are accepted
    pub webhook_channel: String,
    pub libraries: Vec<MockLibrary>,
    pub movies: Vec<MockMovie>,
    pub shows: Vec<MockShow>,
    pub users: u64,
    /// Whether `get_media_counts` reports anything
    pub report_counts: bool,
    pub resume: Vec<PlayItem>,
    pub latest: Vec<PlayItem>,
    /// Prefix for generated play URLs
    pub base_url: String,
}

impl Default for MockServerConfig {
    fn default() -> Self {
        Self {
            connected: true,
            latency_ms: 0,
            reconnect_fails: false,
            webhook_channel: "mock".to_string(),
            libraries: Vec::new(),
            movies: Vec::new(),
            shows: Vec::new(),
            users: 0,
            report_counts: true,
            resume: Vec::new(),
            latest: Vec::new(),
            base_url: "http://mock.local".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MockLibrary {
    pub id: String,
    pub name: String,
    pub kind: LibraryKind,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MockMovie {
    pub id: String,
    pub title: String,
    pub original_title: Option<String>,
    pub year: Option<u16>,
    pub tmdb_id: Option<u64>,
    /// Library the movie belongs to
    pub library: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MockShow {
    pub id: String,
    pub title: String,
    pub original_title: Option<String>,
    pub year: Option<u16>,
    pub tmdb_id: Option<u64>,
    pub library: String,
    /// `(season, episode)` pairs; duplicates are allowed
    pub episodes: Vec<(u32, u32)>,
}
