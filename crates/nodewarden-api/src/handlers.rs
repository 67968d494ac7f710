//! Control surface handlers.
//!
//! `/status` serves a consistent snapshot; `/add` validates the whole
//! batch before touching anything, then appends each record to the
//! config store before extending the in-memory set, so the file and
//! the registry never disagree about an admitted node.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tracing::{error, info};

use nodewarden_registry::NodeSpec;

use crate::ApiState;

/// Body of `POST /add`, echoed back on success.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct AddRequest {
    pub nodes: Vec<NodeSpec>,
}

#[derive(serde::Serialize)]
struct ErrorBody {
    error: String,
}

fn error_response(msg: String, status: StatusCode) -> axum::response::Response {
    (status, Json(ErrorBody { error: msg })).into_response()
}

/// GET /status
pub async fn status(State(state): State<ApiState>) -> impl IntoResponse {
    Json(state.registry.snapshot().await)
}

/// POST /add
pub async fn add(
    State(state): State<ApiState>,
    Json(req): Json<AddRequest>,
) -> impl IntoResponse {
    // All-or-nothing: reject the whole batch before any append.
    for spec in &req.nodes {
        if let Err(e) = spec.validate() {
            return error_response(e.to_string(), StatusCode::BAD_REQUEST);
        }
    }

    let mut added = Vec::with_capacity(req.nodes.len());
    for spec in req.nodes {
        // Durable first; the record joins the registry only once its
        // line is on disk. Earlier entries of a failing batch stay.
        if let Err(e) = state.store.append(&spec) {
            error!(address = %spec.address, error = %e, "config append failed");
            return error_response(
                format!("failed to persist {}: {e}", spec.address),
                StatusCode::INTERNAL_SERVER_ERROR,
            );
        }
        state.registry.push(spec.clone()).await;
        added.push(spec);
    }

    if !added.is_empty() {
        info!(count = added.len(), "nodes added via control surface");
    }
    Json(AddRequest { nodes: added }).into_response()
}
