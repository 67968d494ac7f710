//! nodewarden-monitor — monitor lifecycle and port-range discovery.
//!
//! `Monitor` owns everything a running instance needs: the loaded
//! registry, the control server, and the heartbeat task, all wired to
//! one shutdown signal. `discovery` lets sibling tooling on the same
//! host find a running monitor (or a free control port) by walking
//! the well-known port range.

pub mod discovery;
pub mod monitor;

pub use discovery::{first_available_port, scan_for_monitor, DiscoveryError};
pub use monitor::{Monitor, MonitorError, MonitorParams};
