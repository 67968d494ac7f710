//! Revival dispatch.
//!
//! Runs the record's revival command with its argument string as one
//! argv element. Dispatch is fire-and-forget: the heartbeat never
//! waits for the command, and a spawn failure only gets logged — the
//! streak still counts as revived, so a broken command cannot turn
//! into a retry storm.

use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, error, warn};

use nodewarden_registry::NodeSpec;

/// Spawn the revival command for one node. Must be called from within
/// a tokio runtime; the child is detached and its output drained by a
/// background task.
pub fn dispatch(spec: &NodeSpec) {
    let child = Command::new(&spec.revive_cmd)
        .arg(&spec.revive_args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn();

    let child = match child {
        Ok(child) => child,
        Err(e) => {
            error!(
                address = %spec.address,
                cmd = %spec.revive_cmd,
                error = %e,
                "revival command failed to spawn"
            );
            return;
        }
    };

    debug!(address = %spec.address, cmd = %spec.revive_cmd, "revival command spawned");

    let address = spec.address.clone();
    tokio::spawn(async move {
        match child.wait_with_output().await {
            Ok(output) => debug!(
                %address,
                code = ?output.status.code(),
                stdout = %String::from_utf8_lossy(&output.stdout).trim_end(),
                stderr = %String::from_utf8_lossy(&output.stderr).trim_end(),
                "revival command finished"
            ),
            Err(e) => warn!(%address, error = %e, "revival command wait failed"),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(cmd: &str, args: &str) -> NodeSpec {
        NodeSpec {
            address: "localhost:8545".to_string(),
            revive_cmd: cmd.to_string(),
            revive_args: args.to_string(),
        }
    }

    #[tokio::test]
    async fn dispatch_runs_the_command() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("server1");

        dispatch(&spec("touch", marker.to_str().unwrap()));

        for _ in 0..50 {
            if marker.exists() {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        panic!("revival command never ran");
    }

    #[tokio::test]
    async fn dispatch_passes_args_as_a_single_word() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("name with spaces");

        // `touch` receives the whole string as one path.
        dispatch(&spec("touch", marker.to_str().unwrap()));

        for _ in 0..50 {
            if marker.exists() {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        panic!("revival command never ran");
    }

    #[tokio::test]
    async fn dispatch_survives_missing_executable() {
        // Only logs; no panic, no error surfaced.
        dispatch(&spec("definitely-not-a-real-binary-9f3a", "x"));
    }
}
