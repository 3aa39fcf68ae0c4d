//! Media count aggregation across instances

use futures::future::join_all;
use mediagate_core::Statistic;
use tracing::debug;

use crate::registry::InstanceRegistry;

/// Collects per-instance media counts
pub struct StatisticsAggregator<'a> {
    registry: &'a InstanceRegistry,
}

impl<'a> StatisticsAggregator<'a> {
    pub fn new(registry: &'a InstanceRegistry) -> Self {
        Self { registry }
    }

    /// Counts of one named instance, or of every active instance.
    ///
    /// An unknown name yields an empty list. Instances that report no counts
    /// are left out without affecting the others.
    pub async fn statistics(&self, server: Option<&str>) -> Vec<Statistic> {
        let instances = match server {
            Some(name) => match self.registry.get(name) {
                Some(instance) => vec![instance],
                None => return Vec::new(),
            },
            None => self
                .registry
                .list_all()
                .into_iter()
                .filter(|instance| instance.is_active())
                .collect(),
        };

        let counts = join_all(instances.iter().map(|instance| async move {
            let counts = instance
                .call("get_media_counts", |b| async move { b.get_media_counts().await })
                .await
                .flatten();
            if counts.is_none() {
                debug!(server = %instance.name(), "No media counts reported");
            }
            counts.map(|c| Statistic::new(instance.name(), c))
        }))
        .await;

        counts.into_iter().flatten().collect()
    }
}
