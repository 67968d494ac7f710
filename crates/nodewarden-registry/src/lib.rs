//! nodewarden-registry — node records and durable configuration.
//!
//! Holds the in-memory set of monitored nodes, the per-node
//! consecutive-failure state machine, and the append-only
//! line-delimited JSON config store that the record set is loaded
//! from and extended into.
//!
//! # Architecture
//!
//! ```text
//! NodeRegistry (Arc<RwLock<Vec<NodeRecord>>>)
//!   ├── probe_targets() → read-side snapshot for the heartbeat
//!   ├── apply_outcomes() → failure counters, revival decisions
//!   ├── push() → runtime /add extension
//!   └── snapshot() → StatusEntry view for the control surface
//! ConfigStore (*.jl file)
//!   ├── load() → Vec<NodeSpec>, fatal on malformed lines
//!   └── append() → one JSON line per record, open-append-write-close
//! ```

pub mod config;
pub mod error;
pub mod registry;
pub mod types;

pub use config::ConfigStore;
pub use error::{RegistryError, RegistryResult};
pub use registry::NodeRegistry;
pub use types::{NodeRecord, NodeSpec, StatusEntry};
