//! nodewarden-health — liveness probing, heartbeat, revival.
//!
//! One heartbeat task drives the whole fleet: every interval it fans
//! out one JSON-RPC probe per monitored node, waits for the fanout to
//! settle, applies the outcomes to the registry in a single pass, and
//! dispatches revival commands for nodes whose failure streak just
//! crossed the tolerance.
//!
//! # Architecture
//!
//! ```text
//! Heartbeat::run(shutdown)
//!   └── tick (never overlapping, skipped not queued)
//!       ├── probe() × N concurrent, each bounded by one interval
//!       ├── NodeRegistry::apply_outcomes() under the write lock
//!       └── revive::dispatch() fire-and-forget
//! ```

pub mod probe;
pub mod revive;
pub mod scheduler;

pub use probe::{probe, ProbeOutcome};
pub use scheduler::Heartbeat;
