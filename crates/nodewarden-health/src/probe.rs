//! JSON-RPC liveness probe.
//!
//! One probe is a `net_version` POST against the node's endpoint.
//! The monitor is content-agnostic past "did it answer": a 2xx
//! response whose body parses as JSON counts as alive, everything
//! else (including a timeout) counts as one failure.

use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;
use tracing::debug;

/// The fixed liveness request body.
const LIVENESS_REQUEST: &str = r#"{"jsonrpc":"2.0","method":"net_version","params":[],"id":1}"#;

/// Result of a single liveness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// 2xx response with a parseable JSON body.
    Ok,
    /// Transport error, non-2xx, malformed body, or timeout.
    Fail,
}

impl ProbeOutcome {
    pub fn is_ok(self) -> bool {
        self == ProbeOutcome::Ok
    }
}

/// Probe one node address, bounded by `timeout` (one heartbeat
/// interval). Never blocks past the bound; a probe still pending at
/// the deadline counts as a failure.
pub async fn probe(address: &str, timeout: Duration) -> ProbeOutcome {
    let uri = format!("http://{address}/");

    let result = tokio::time::timeout(timeout, async {
        let stream = match TcpStream::connect(address).await {
            Ok(s) => s,
            Err(e) => {
                debug!(error = %e, %uri, "probe connection failed");
                return ProbeOutcome::Fail;
            }
        };

        let io = TokioIo::new(stream);
        let (mut sender, conn) = match hyper::client::conn::http1::handshake(io).await {
            Ok(pair) => pair,
            Err(e) => {
                debug!(error = %e, %uri, "probe handshake failed");
                return ProbeOutcome::Fail;
            }
        };

        // Drive the connection in the background.
        tokio::spawn(async move {
            let _ = conn.await;
        });

        let req = http::Request::builder()
            .method("POST")
            .uri(&uri)
            .header("host", address)
            .header("content-type", "application/json")
            .body(Full::new(Bytes::from_static(LIVENESS_REQUEST.as_bytes())))
            .unwrap();

        let resp = match sender.send_request(req).await {
            Ok(resp) => resp,
            Err(e) => {
                debug!(error = %e, %uri, "probe request failed");
                return ProbeOutcome::Fail;
            }
        };

        if !resp.status().is_success() {
            debug!(status = %resp.status(), %uri, "probe non-2xx");
            return ProbeOutcome::Fail;
        }

        let body = match resp.into_body().collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                debug!(error = %e, %uri, "probe body read failed");
                return ProbeOutcome::Fail;
            }
        };

        match serde_json::from_slice::<serde_json::Value>(&body) {
            Ok(_) => ProbeOutcome::Ok,
            Err(e) => {
                debug!(error = %e, %uri, "probe body is not JSON");
                ProbeOutcome::Fail
            }
        }
    })
    .await;

    match result {
        Ok(outcome) => outcome,
        Err(_) => {
            debug!(%uri, "probe timed out");
            ProbeOutcome::Fail
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    async fn spawn_mock(response: impl IntoResponse + Clone + Send + Sync + 'static) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = axum::Router::new().fallback(move || {
            let response = response.clone();
            async move { response }
        });
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("127.0.0.1:{}", addr.port())
    }

    #[tokio::test]
    async fn probe_to_closed_port_fails() {
        let outcome = probe("127.0.0.1:1", Duration::from_millis(200)).await;
        assert_eq!(outcome, ProbeOutcome::Fail);
    }

    #[tokio::test]
    async fn probe_accepts_json_response() {
        let addr = spawn_mock(r#"{"jsonrpc":"2.0","id":1,"result":"3"}"#).await;
        let outcome = probe(&addr, Duration::from_secs(1)).await;
        assert_eq!(outcome, ProbeOutcome::Ok);
    }

    #[tokio::test]
    async fn probe_rejects_non_json_body() {
        let addr = spawn_mock("not json at all").await;
        let outcome = probe(&addr, Duration::from_secs(1)).await;
        assert_eq!(outcome, ProbeOutcome::Fail);
    }

    #[tokio::test]
    async fn probe_rejects_server_error() {
        let addr = spawn_mock((
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"error":"boom"}"#,
        ))
        .await;
        let outcome = probe(&addr, Duration::from_secs(1)).await;
        assert_eq!(outcome, ProbeOutcome::Fail);
    }
}
