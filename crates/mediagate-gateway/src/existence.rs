//! Existence resolution - does a media item already exist, and where
//!
//! Instances are queried in configuration order and the first positive
//! answer wins; answers are never merged across instances. Inactive
//! instances are skipped without a backend call.

use std::sync::Arc;

use mediagate_core::{ExistMediaInfo, MediaInfo, MediaType};
use tracing::{debug, info};

use crate::config::FallbackMode;
use crate::instance::ServerInstance;
use crate::race;
use crate::registry::InstanceRegistry;

/// Resolves media existence across all registered instances
pub struct ExistenceResolver<'a> {
    registry: &'a InstanceRegistry,
    fallback: FallbackMode,
}

impl<'a> ExistenceResolver<'a> {
    pub fn new(registry: &'a InstanceRegistry, fallback: FallbackMode) -> Self {
        Self { registry, fallback }
    }

    /// Find the first instance that holds `media`.
    ///
    /// `item_id` is a backend-native id; for movies it is tried before any
    /// title matching, for shows it is handed to the backend's episode lookup.
    pub async fn resolve(&self, media: &MediaInfo, item_id: Option<&str>) -> Option<ExistMediaInfo> {
        let instances = self.registry.list_all();
        let registry = self.registry;

        let found = race::first_in_order(&instances, self.fallback, move |instance| async move {
            if !instance.is_active() {
                debug!(server = %instance.name(), "Skipping inactive media server");
                return None;
            }

            let exist = match media.media_type {
                MediaType::Movie => find_movie(&instance, media, item_id).await,
                MediaType::Tv => find_show(&instance, media, item_id).await,
            }?;

            // The instance may have been replaced while we were waiting on it
            if !registry.is_current(&instance) {
                debug!(server = %instance.name(), "Discarding answer from retired instance");
                return None;
            }
            Some(exist)
        })
        .await;

        if found.is_none() {
            debug!(media = %media.title_year(), "Not found on any media server");
        }
        found.map(|(_, exist)| exist)
    }
}

async fn find_movie(
    instance: &Arc<ServerInstance>,
    media: &MediaInfo,
    item_id: Option<&str>,
) -> Option<ExistMediaInfo> {
    if let Some(item_id) = item_id {
        let item = instance
            .call("get_item_info", |b| async move { b.get_item_info(item_id).await })
            .await
            .flatten();
        if let Some(movie) = item {
            info!(server = %instance.name(), item_id = %movie.item_id, "Found {} by item id", movie.title);
            return Some(ExistMediaInfo::movie(instance.name(), movie.item_id));
        }
        // A lost connection or timeout ends this instance's turn
        if !instance.is_active() {
            debug!(server = %instance.name(), "Item id lookup failed, skipping title search");
            return None;
        }
    }

    let query = media.query();
    let movies = instance
        .call("find_movies", |b| async move { b.find_movies(&query).await })
        .await
        .unwrap_or_default();

    match movies.into_iter().next() {
        Some(movie) => {
            info!(server = %instance.name(), item_id = %movie.item_id, "Found {}", media.title_year());
            Some(ExistMediaInfo::movie(instance.name(), movie.item_id))
        }
        None => {
            info!(server = %instance.name(), "{} is not in this library", media.title_year());
            None
        }
    }
}

async fn find_show(
    instance: &Arc<ServerInstance>,
    media: &MediaInfo,
    item_id: Option<&str>,
) -> Option<ExistMediaInfo> {
    let query = media.query();
    let show = instance
        .call("find_tv_episodes", |b| async move {
            b.find_tv_episodes(Some(&query), item_id).await
        })
        .await
        .flatten();

    match show {
        Some(tv) if !tv.seasons.is_empty() => {
            info!(
                server = %instance.name(),
                episodes = tv.seasons.episode_count(),
                "Found {}",
                media.title_year()
            );
            Some(ExistMediaInfo::tv(instance.name(), tv.item_id, tv.seasons))
        }
        _ => {
            info!(server = %instance.name(), "{} is not in this library", media.title_year());
            None
        }
    }
}
