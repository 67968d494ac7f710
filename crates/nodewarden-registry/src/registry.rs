//! NodeRegistry — shared, insertion-ordered set of monitored nodes.
//!
//! The record vector is the monitor's only shared mutable state. It
//! sits behind one `RwLock`: the control surface takes read-side
//! snapshots, the heartbeat apply phase and `/add` take the write
//! lock only for the duration of the mutation. Probe IO never runs
//! under the lock. Records are never removed, so the indices handed
//! out by `probe_targets` stay valid across an `/add` that lands
//! mid-tick.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::types::{NodeRecord, NodeSpec, StatusEntry};

/// Thread-safe handle to the record set.
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    records: Arc<RwLock<Vec<NodeRecord>>>,
}

impl NodeRegistry {
    /// Build a registry from the specs loaded out of the config store.
    pub fn from_specs(specs: Vec<NodeSpec>) -> Self {
        let records = specs.into_iter().map(NodeRecord::new).collect();
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Instantaneous public view, in insertion order.
    pub async fn snapshot(&self) -> Vec<StatusEntry> {
        self.records.read().await.iter().map(NodeRecord::status).collect()
    }

    /// The `(index, address)` pairs to probe this tick.
    ///
    /// Nodes added after this call join the next tick.
    pub async fn probe_targets(&self) -> Vec<(usize, String)> {
        self.records
            .read()
            .await
            .iter()
            .enumerate()
            .map(|(idx, record)| (idx, record.spec.address.clone()))
            .collect()
    }

    /// Apply one tick's probe outcomes under the write lock.
    ///
    /// `outcomes` pairs a `probe_targets` index with whether the probe
    /// succeeded. Returns the specs whose failure streak just crossed
    /// the tolerance and need a revival dispatched.
    pub async fn apply_outcomes(&self, outcomes: &[(usize, bool)], tolerance: u32) -> Vec<NodeSpec> {
        let mut records = self.records.write().await;
        let mut revive = Vec::new();
        for &(idx, ok) in outcomes {
            if let Some(record) = records.get_mut(idx) {
                if record.record_outcome(ok, tolerance) {
                    revive.push(record.spec.clone());
                }
            }
        }
        revive
    }

    /// Append one node at runtime. The caller must have durably
    /// appended the spec to the config store first.
    pub async fn push(&self, spec: NodeSpec) {
        debug!(address = %spec.address, "node joined registry");
        self.records.write().await.push(NodeRecord::new(spec));
    }
}
