//! Background reconnect sweep

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::gateway::MediaGateway;

/// Handle to a running sweep task; the task stops when the handle is dropped
#[derive(Debug)]
pub struct SweepHandle {
    handle: JoinHandle<()>,
}

impl SweepHandle {
    /// Stop the sweep loop
    pub fn stop(self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for SweepHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Shortest interval the sweep will run at
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Run [`MediaGateway::periodic_reconnect_sweep`] every `interval`.
///
/// The first sweep happens one full interval after spawning. Intervals below
/// [`MIN_SWEEP_INTERVAL`] are raised to it.
pub fn spawn_reconnect_sweep(gateway: Arc<MediaGateway>, interval: Duration) -> SweepHandle {
    let interval = if interval < MIN_SWEEP_INTERVAL {
        warn!(
            requested_ms = interval.as_millis() as u64,
            "Reconnect sweep interval too short, using {}s",
            MIN_SWEEP_INTERVAL.as_secs()
        );
        MIN_SWEEP_INTERVAL
    } else {
        interval
    };

    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            gateway.periodic_reconnect_sweep().await;
        }
    });

    debug!(interval_secs = interval.as_secs(), "Reconnect sweep started");
    SweepHandle { handle }
}
