//! nodewarden-api — HTTP control surface for a running monitor.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/status` | Current records as a JSON array, insertion order |
//! | POST | `/add` | Admit nodes at runtime (all-or-nothing validation) |
//!
//! Unknown routes get the router's default 404. The server carries no
//! authentication; it is bound to loopback by the monitor lifecycle.

pub mod handlers;

use axum::routing::{get, post};
use axum::Router;

use nodewarden_registry::{ConfigStore, NodeRegistry};

/// Shared state for the control handlers.
#[derive(Clone)]
pub struct ApiState {
    pub registry: NodeRegistry,
    pub store: ConfigStore,
}

/// Build the control router.
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/status", get(handlers::status))
        .route("/add", post(handlers::add))
        .with_state(state)
}
