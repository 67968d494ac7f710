//! Heartbeat scheduler — the global tick driving all probes.
//!
//! A single task owns the cadence: on every tick it probes the whole
//! fleet concurrently, waits for the fanout to settle, then applies
//! the outcomes in one pass under the registry write lock. Ticks
//! never overlap; a tick that would fire while the previous one is
//! still settling is skipped, not queued.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use nodewarden_registry::NodeRegistry;

use crate::probe::probe;
use crate::revive;

/// Periodic prober for every record in a registry.
pub struct Heartbeat {
    registry: NodeRegistry,
    interval: Duration,
    tolerance: u32,
}

impl Heartbeat {
    pub fn new(registry: NodeRegistry, interval: Duration, tolerance: u32) -> Self {
        Self {
            registry,
            interval,
            tolerance,
        }
    }

    /// Run the tick loop until the shutdown signal flips.
    ///
    /// Shutdown is checked at every tick boundary and raced against
    /// the in-flight fanout; probes abandoned mid-tick never have
    /// their outcomes applied.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            interval_ms = self.interval.as_millis() as u64,
            tolerance = self.tolerance,
            "heartbeat scheduler started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    tokio::select! {
                        _ = self.tick() => {}
                        _ = shutdown.changed() => {
                            debug!("heartbeat interrupted mid-tick");
                            break;
                        }
                    }
                }
                _ = shutdown.changed() => break,
            }
        }

        info!("heartbeat scheduler stopped");
    }

    /// One tick: concurrent fanout, barrier, apply, revival dispatch.
    async fn tick(&self) {
        let targets = self.registry.probe_targets().await;
        if targets.is_empty() {
            return;
        }

        let mut handles = Vec::with_capacity(targets.len());
        for (idx, address) in targets {
            let timeout = self.interval;
            handles.push(tokio::spawn(async move {
                (idx, probe(&address, timeout).await)
            }));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok((idx, outcome)) => outcomes.push((idx, outcome.is_ok())),
                Err(e) => error!(error = %e, "probe task join error"),
            }
        }

        let revivals = self.registry.apply_outcomes(&outcomes, self.tolerance).await;
        for spec in revivals {
            warn!(
                address = %spec.address,
                cmd = %spec.revive_cmd,
                args = %spec.revive_args,
                "dispatching revival"
            );
            revive::dispatch(&spec);
        }
    }
}
