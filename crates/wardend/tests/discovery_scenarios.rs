//! Discovery against a real monitor in the well-known port range.
//!
//! Kept in one test so the range is touched by a single sequence:
//! scan-empty, allocate, start, scan-found.

use nodewarden_monitor::{discovery, Monitor, MonitorParams};

#[tokio::test]
async fn scan_finds_a_monitor_in_the_control_range() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("nodes.jl");
    std::fs::write(&config_path, "").unwrap();

    // Nothing running yet.
    assert!(discovery::scan_for_monitor().await.is_err());

    let port = discovery::first_available_port().await.unwrap();
    assert!((discovery::SCAN_PORT_START..discovery::SCAN_PORT_END).contains(&port));

    let mut monitor = Monitor::new(MonitorParams {
        heartbeat_interval_ms: 1000,
        failure_tolerance: 5,
        config_path,
    })
    .unwrap();
    monitor.start(port).await.unwrap();

    assert_eq!(discovery::scan_for_monitor().await.unwrap(), port);

    monitor.stop().await;
    assert!(discovery::scan_for_monitor().await.is_err());
}
