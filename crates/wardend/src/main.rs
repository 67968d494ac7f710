//! wardend — the node liveness monitor daemon.
//!
//! # Usage
//!
//! ```text
//! wardend run --config nodes.jl [--port 9545] [--heartbeat-ms 1000] [--tolerance 5]
//! wardend scan
//! wardend free-port
//! ```
//!
//! `run` starts a monitor and blocks until Ctrl-C. Without `--port`
//! the daemon takes the first free port in the well-known control
//! range so that `wardend scan` (and peer tooling) can find it.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use nodewarden_monitor::{discovery, Monitor, MonitorParams};

#[derive(Parser)]
#[command(name = "wardend", about = "Blockchain node liveness monitor")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the monitor daemon until interrupted.
    Run {
        /// Path to the line-delimited JSON node list.
        #[arg(long)]
        config: PathBuf,

        /// Control port; defaults to the first free port in the
        /// discovery range.
        #[arg(long)]
        port: Option<u16>,

        /// Heartbeat interval in milliseconds.
        #[arg(long, default_value = "1000")]
        heartbeat_ms: u64,

        /// Consecutive probe failures before revival.
        #[arg(long, default_value = "5")]
        tolerance: u32,
    },

    /// Locate a running monitor on this host.
    Scan,

    /// Print the first free port in the control range.
    FreePort,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,wardend=debug,nodewarden=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            config,
            port,
            heartbeat_ms,
            tolerance,
        } => run(config, port, heartbeat_ms, tolerance).await,
        Command::Scan => {
            let port = discovery::scan_for_monitor().await?;
            println!("{port}");
            Ok(())
        }
        Command::FreePort => {
            let port = discovery::first_available_port().await?;
            println!("{port}");
            Ok(())
        }
    }
}

async fn run(
    config: PathBuf,
    port: Option<u16>,
    heartbeat_ms: u64,
    tolerance: u32,
) -> anyhow::Result<()> {
    let port = match port {
        Some(port) => port,
        None => discovery::first_available_port().await?,
    };

    let mut monitor = Monitor::new(MonitorParams {
        heartbeat_interval_ms: heartbeat_ms,
        failure_tolerance: tolerance,
        config_path: config,
    })?;

    monitor.start(port).await?;
    info!(port, "wardend running; Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");

    monitor.stop().await;
    info!("wardend stopped");
    Ok(())
}
