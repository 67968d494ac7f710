//! Port-range discovery.
//!
//! Monitors bind their control surface somewhere in a well-known
//! loopback port range. Clients on the same host locate a running
//! monitor by walking the range and asking each port for `/status`;
//! a new monitor picks its port by finding the first one nothing is
//! bound to.

use std::time::Duration;

use http_body_util::{BodyExt, Empty};
use hyper_util::rt::TokioIo;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tracing::debug;

use nodewarden_registry::StatusEntry;

/// First port of the well-known control range.
pub const SCAN_PORT_START: u16 = 9545;
/// One past the last port of the range.
pub const SCAN_PORT_END: u16 = 9644;

/// Per-port wait while scanning.
const SCAN_TIMEOUT: Duration = Duration::from_millis(250);

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("no running monitor found in the control port range")]
    NotFound,

    #[error("every port in the control port range is occupied")]
    NoFreePort,
}

/// Walk the range looking for a live monitor.
///
/// The first port that answers `GET /status` with a 2xx and a body
/// decoding as the status array wins.
pub async fn scan_for_monitor() -> Result<u16, DiscoveryError> {
    for port in SCAN_PORT_START..SCAN_PORT_END {
        if fetch_status(port).await.is_some() {
            debug!(port, "monitor discovered");
            return Ok(port);
        }
    }
    Err(DiscoveryError::NotFound)
}

/// The first port in the range with no TCP listener bound, tested by
/// binding and immediately releasing.
pub async fn first_available_port() -> Result<u16, DiscoveryError> {
    for port in SCAN_PORT_START..SCAN_PORT_END {
        if TcpListener::bind(("127.0.0.1", port)).await.is_ok() {
            return Ok(port);
        }
    }
    Err(DiscoveryError::NoFreePort)
}

/// Ask one loopback port for its status array. `None` means whatever
/// is listening there (if anything) is not a monitor.
pub async fn fetch_status(port: u16) -> Option<Vec<StatusEntry>> {
    let address = format!("127.0.0.1:{port}");
    let uri = format!("http://{address}/status");

    let result = tokio::time::timeout(SCAN_TIMEOUT, async {
        let stream = TcpStream::connect(&address).await.ok()?;
        let io = TokioIo::new(stream);
        let (mut sender, conn) = hyper::client::conn::http1::handshake(io).await.ok()?;

        tokio::spawn(async move {
            let _ = conn.await;
        });

        let req = http::Request::builder()
            .method("GET")
            .uri(&uri)
            .header("host", &address)
            .body(Empty::<bytes::Bytes>::new())
            .unwrap();

        let resp = sender.send_request(req).await.ok()?;
        if !resp.status().is_success() {
            return None;
        }
        let body = resp.into_body().collect().await.ok()?.to_bytes();
        serde_json::from_slice::<Vec<StatusEntry>>(&body).ok()
    })
    .await;

    result.ok().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_is_well_formed() {
        assert!(SCAN_PORT_START < SCAN_PORT_END);
    }

    #[tokio::test]
    async fn fetch_status_on_closed_port_is_none() {
        // Port 1 is never a monitor.
        let stream = TcpStream::connect("127.0.0.1:1").await;
        assert!(stream.is_err());
        assert!(fetch_status(1).await.is_none());
    }

    #[tokio::test]
    async fn fetch_status_rejects_non_monitor_listener() {
        // A listener that accepts and says nothing decodeable.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let app = axum::Router::new().fallback(|| async { "hello" });
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        assert!(fetch_status(port).await.is_none());
    }
}
