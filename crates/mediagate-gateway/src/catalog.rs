//! Library catalog - single-instance passthroughs addressed by name
//!
//! Every operation first resolves the instance by name. An unknown name
//! returns `None` (or an empty list) without any backend call.

use std::sync::Arc;

use futures::stream::BoxStream;
use mediagate_core::{LibraryDescriptor, MediaItem, PlayItem, SeasonInfo};
use tracing::debug;

use crate::registry::InstanceRegistry;

/// Number of entries callers usually request from resume and latest lists
pub const DEFAULT_LIST_COUNT: usize = 20;

/// Read-only library access for one named instance at a time
pub struct LibraryCatalog<'a> {
    registry: &'a Arc<InstanceRegistry>,
    page_size: usize,
}

impl<'a> LibraryCatalog<'a> {
    pub fn new(registry: &'a Arc<InstanceRegistry>, page_size: usize) -> Self {
        Self {
            registry,
            page_size: page_size.max(1),
        }
    }

    /// Libraries of `server`, stamped with the instance name and sync flag
    pub async fn librarys(&self, server: &str, include_hidden: bool) -> Option<Vec<LibraryDescriptor>> {
        let instance = self.registry.get(server)?;
        let mut libraries = instance
            .call("list_libraries", |b| async move { b.list_libraries(include_hidden).await })
            .await
            .unwrap_or_default();

        for library in &mut libraries {
            library.server = instance.name().to_string();
            library.synced = instance.config().is_synced(&library.id);
        }
        Some(libraries)
    }

    /// Lazily stream up to `limit` items of a library, starting at `start_index`.
    ///
    /// Items are fetched page by page as the stream is polled. The instance
    /// is looked up again for every page, so a replacement registered under
    /// the same name serves the remaining pages. The stream ends early on a
    /// short page, a failed page request or once the name is unregistered;
    /// re-invoke with a new `start_index` to resume.
    pub fn items(
        &self,
        server: &str,
        library_id: &str,
        start_index: usize,
        limit: usize,
    ) -> Option<BoxStream<'static, MediaItem>> {
        if !self.registry.contains(server) {
            return None;
        }
        let registry = Arc::clone(self.registry);
        let server = server.to_string();
        let library_id = library_id.to_string();
        let page_size = self.page_size;

        let stream = async_stream::stream! {
            let mut offset = start_index;
            let mut remaining = limit;

            while remaining > 0 {
                let Some(instance) = registry.get(&server) else {
                    debug!(server = %server, "Media server unregistered, ending item stream");
                    break;
                };
                let want = remaining.min(page_size);
                let lib = library_id.clone();
                let page = instance
                    .call("list_items", |b| async move { b.list_items(&lib, offset, want).await })
                    .await;
                let Some(page) = page else {
                    debug!(server = %server, offset, "Item page request failed, ending stream");
                    break;
                };

                let fetched = page.len();
                for item in page.into_iter().take(remaining) {
                    remaining -= 1;
                    yield item;
                }
                if fetched < want {
                    break;
                }
                offset += fetched;
            }
        };
        Some(Box::pin(stream))
    }

    pub async fn item_info(&self, server: &str, item_id: &str) -> Option<MediaItem> {
        let instance = self.registry.get(server)?;
        instance
            .call("get_item_info", |b| async move { b.get_item_info(item_id).await })
            .await
            .flatten()
    }

    /// Seasons of a show; `Some(vec![])` when the instance has no episodes for it
    pub async fn tv_episodes(&self, server: &str, item_id: &str) -> Option<Vec<SeasonInfo>> {
        let instance = self.registry.get(server)?;
        let show = instance
            .call("find_tv_episodes", |b| async move {
                b.find_tv_episodes(None, Some(item_id)).await
            })
            .await
            .flatten();

        Some(
            show.map(|tv| SeasonInfo::from_season_map(&tv.seasons))
                .unwrap_or_default(),
        )
    }

    /// Items with playback in progress; empty for an unknown instance
    pub async fn resume_list(&self, server: &str, count: usize) -> Vec<PlayItem> {
        let Some(instance) = self.registry.get(server) else {
            return Vec::new();
        };
        instance
            .call("get_resume_list", |b| async move { b.get_resume_list(count).await })
            .await
            .unwrap_or_default()
    }

    /// Most recently added items; empty for an unknown instance
    pub async fn latest_list(&self, server: &str, count: usize) -> Vec<PlayItem> {
        let Some(instance) = self.registry.get(server) else {
            return Vec::new();
        };
        instance
            .call("get_latest_list", |b| async move { b.get_latest_list(count).await })
            .await
            .unwrap_or_default()
    }

    pub async fn play_url(&self, server: &str, item_id: &str) -> Option<String> {
        let instance = self.registry.get(server)?;
        instance
            .call("get_play_url", |b| async move { b.get_play_url(item_id).await })
            .await
            .flatten()
    }
}
