//! Monitor lifecycle.
//!
//! `start(port)` wires the subsystems in dependency order: load the
//! config store (fatal on malformed records), bind the control
//! listener, then spawn the server and the heartbeat on a shared
//! shutdown channel. Nothing is spawned until every fallible step has
//! succeeded, so a failed start leaves no task behind. `stop()` is
//! idempotent: the first call flips the channel and waits for both
//! tasks to drain; later calls are no-ops.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use nodewarden_api::{build_router, ApiState};
use nodewarden_health::Heartbeat;
use nodewarden_registry::{ConfigStore, NodeRegistry, RegistryError};

/// Construction parameters for a monitor instance.
#[derive(Debug, Clone)]
pub struct MonitorParams {
    /// Period between fanout probes, in milliseconds. Must be >= 1.
    pub heartbeat_interval_ms: u64,
    /// Consecutive failures that trigger revival. Must be >= 1.
    pub failure_tolerance: u32,
    /// Path to the line-delimited JSON node list.
    pub config_path: PathBuf,
}

/// Errors surfaced by the monitor lifecycle.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("heartbeat interval must be at least 1ms")]
    InvalidInterval,

    #[error("failure tolerance must be at least 1")]
    InvalidTolerance,

    #[error("monitor already running on port {0}")]
    AlreadyRunning(u16),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("bind 127.0.0.1:{port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },
}

/// Handles owned by a started monitor.
struct Running {
    port: u16,
    shutdown_tx: watch::Sender<bool>,
    server: JoinHandle<()>,
    heartbeat: JoinHandle<()>,
}

/// One monitor instance. Owns its record set between `start` and
/// `stop`.
pub struct Monitor {
    params: MonitorParams,
    store: ConfigStore,
    registry: NodeRegistry,
    running: Option<Running>,
}

impl Monitor {
    /// Validate parameters and build an idle monitor. No IO happens
    /// here; the config file is first touched by `start`.
    pub fn new(params: MonitorParams) -> Result<Self, MonitorError> {
        if params.heartbeat_interval_ms == 0 {
            return Err(MonitorError::InvalidInterval);
        }
        if params.failure_tolerance == 0 {
            return Err(MonitorError::InvalidTolerance);
        }
        let store = ConfigStore::new(&params.config_path);
        Ok(Self {
            params,
            store,
            registry: NodeRegistry::default(),
            running: None,
        })
    }

    /// Load the node list and start the control server and heartbeat.
    ///
    /// Pass port 0 to bind an ephemeral port; `control_port` reports
    /// the bound one. Returns once both subsystems accept work.
    pub async fn start(&mut self, port: u16) -> Result<(), MonitorError> {
        if let Some(running) = &self.running {
            return Err(MonitorError::AlreadyRunning(running.port));
        }

        let specs = self.store.load()?;
        info!(count = specs.len(), config = ?self.params.config_path, "node list loaded");
        self.registry = NodeRegistry::from_specs(specs);

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .map_err(|source| MonitorError::Bind { port, source })?;
        let bound_port = listener
            .local_addr()
            .map_err(|source| MonitorError::Bind { port, source })?
            .port();

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let router = build_router(ApiState {
            registry: self.registry.clone(),
            store: self.store.clone(),
        });
        let mut server_shutdown = shutdown_rx.clone();
        let server = tokio::spawn(async move {
            let serve = axum::serve(listener, router).with_graceful_shutdown(async move {
                let _ = server_shutdown.changed().await;
            });
            if let Err(e) = serve.await {
                error!(error = %e, "control server error");
            }
        });

        let heartbeat = Heartbeat::new(
            self.registry.clone(),
            Duration::from_millis(self.params.heartbeat_interval_ms),
            self.params.failure_tolerance,
        );
        let heartbeat = tokio::spawn(heartbeat.run(shutdown_rx));

        self.running = Some(Running {
            port: bound_port,
            shutdown_tx,
            server,
            heartbeat,
        });
        info!(port = bound_port, "monitor started");
        Ok(())
    }

    /// Stop the monitor. Idempotent; after the first call returns the
    /// listener is closed and the heartbeat has drained.
    pub async fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            debug!("stop on idle monitor");
            return;
        };

        let _ = running.shutdown_tx.send(true);
        let _ = running.heartbeat.await;
        let _ = running.server.await;
        info!(port = running.port, "monitor stopped");
    }

    /// The bound control port while running.
    pub fn control_port(&self) -> Option<u16> {
        self.running.as_ref().map(|r| r.port)
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Handle to the live record set (shared with the control server
    /// and the heartbeat).
    pub fn registry(&self) -> NodeRegistry {
        self.registry.clone()
    }

    /// Handle to the durable node list.
    pub fn store(&self) -> ConfigStore {
        self.store.clone()
    }
}
