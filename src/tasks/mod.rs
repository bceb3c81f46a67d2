//! Background tasks
//!
//! Ephemeral instances expire on the naming server unless they keep
//! sending heartbeats, so a task beats for every registered instance.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::discovery::{Instance, Registry};

/// Configuration for the heartbeat task
#[derive(Debug, Clone)]
pub struct HeartbeatConfig {
    /// How often to beat
    pub interval: Duration,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
        }
    }
}

/// Start a background task that beats for each instance until aborted.
///
/// The first beat goes out one interval after start, registration itself
/// counts as the initial liveness signal.
pub fn spawn_heartbeat_task(
    registry: Arc<dyn Registry>,
    instances: Vec<Instance>,
    config: HeartbeatConfig,
) -> tokio::task::JoinHandle<()> {
    info!(
        interval_ms = config.interval.as_millis() as u64,
        instances = instances.len(),
        "Starting heartbeat background task"
    );

    tokio::spawn(async move {
        let mut tick = interval_at(Instant::now() + config.interval, config.interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tick.tick().await;

            for instance in &instances {
                match registry.send_beat(instance).await {
                    Ok(()) => {
                        crate::metrics::record_registry_operation("beat", true);
                        debug!(ip = %instance.ip, port = instance.port, "Heartbeat sent");
                    }
                    Err(e) => {
                        crate::metrics::record_registry_operation("beat", false);
                        warn!(ip = %instance.ip, port = instance.port, error = %e, "Heartbeat failed");
                    }
                }
            }
        }
    })
}
