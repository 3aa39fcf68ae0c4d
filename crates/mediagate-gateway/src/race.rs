//! Priority-ordered fallback over instances
//!
//! Both dispatch modes select the earliest instance in configuration order
//! that yields a result, never the fastest one. In concurrent mode every probe
//! starts at once, but a result is only accepted when every higher-priority
//! probe has settled with no result; remaining probes are dropped as soon as
//! a winner is accepted.

use std::future::Future;
use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};

use crate::config::FallbackMode;
use crate::instance::ServerInstance;

/// Return the first instance (in slice order) whose probe yields `Some`
pub(crate) async fn first_in_order<T, F, Fut>(
    instances: &[Arc<ServerInstance>],
    mode: FallbackMode,
    probe: F,
) -> Option<(Arc<ServerInstance>, T)>
where
    F: Fn(Arc<ServerInstance>) -> Fut,
    Fut: Future<Output = Option<T>>,
{
    match mode {
        FallbackMode::Sequential => {
            for instance in instances {
                if let Some(value) = probe(instance.clone()).await {
                    return Some((instance.clone(), value));
                }
            }
            None
        }
        FallbackMode::Concurrent => {
            let mut pending: FuturesUnordered<_> = instances
                .iter()
                .enumerate()
                .map(|(idx, instance)| {
                    let fut = probe(instance.clone());
                    async move { (idx, fut.await) }
                })
                .collect();

            // settled[i] is None until probe i completes
            let mut settled: Vec<Option<Option<T>>> = instances.iter().map(|_| None).collect();
            let mut next = 0;

            while let Some((idx, outcome)) = pending.next().await {
                settled[idx] = Some(outcome);

                while next < settled.len() {
                    match settled[next].take() {
                        None => break,
                        Some(Some(value)) => return Some((instances[next].clone(), value)),
                        Some(None) => next += 1,
                    }
                }
            }
            None
        }
    }
}
