//! Background daemon serving the clipboard history.
//!
//! Capture clients (browser bridges, clipboard watchers, the CLI itself)
//! send requests over a Unix socket and get the resulting history back.
//!
//! # Architecture
//!
//! - **Writer**: owns the history store and applies operations one at a
//!   time, in arrival order
//! - **Server**: decodes socket requests and hands them to the writer
//! - **State**: PID file, socket path and log file locations
//!
//! Start it with `copycache daemon start`; `copycache daemon stop` asks it
//! to shut down over the socket.

pub mod protocol;
pub mod server;
pub mod state;
pub mod writer;

use anyhow::{bail, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, oneshot, RwLock};
use tracing_appender::non_blocking::WorkerGuard;

use crate::config::Config;
use crate::history::HistoryStore;
use crate::storage::SqliteStore;

pub use protocol::{Request, Response, ValidationError};
pub use server::{send_request, send_request_sync, Dispatcher};
pub use state::{DaemonState, DaemonStats};
pub use writer::WriterHandle;

/// Runs the daemon in the foreground until Ctrl+C or a `STOP` request.
///
/// Refuses to start when another daemon owns the PID file. The PID file and
/// socket are removed on the way out.
pub async fn run_daemon() -> Result<()> {
    let state = DaemonState::new()?;
    if state.is_running() {
        bail!(
            "Daemon is already running (PID {})",
            state.get_pid().unwrap_or(0)
        );
    }

    let _guard = setup_logging(&state.log_file);

    let config = Config::load()?;
    let store = HistoryStore::new(SqliteStore::open_default()?, config.history);

    let pid = std::process::id();
    state.write_pid(pid)?;
    tracing::info!(
        pid,
        capacity = config.history.capacity,
        "copycache daemon started"
    );

    let (writer, writer_task) = writer::spawn(store);
    let (stop_tx, stop_rx) = oneshot::channel();
    let dispatcher = Arc::new(Dispatcher::new(
        writer,
        Arc::new(RwLock::new(DaemonStats::default())),
        Some(Config::config_path()?),
        Some(stop_tx),
    ));

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let socket_path = state.socket_path.clone();
    let server_task = tokio::spawn(async move {
        if let Err(e) = server::run_server(&socket_path, dispatcher, shutdown_rx).await {
            tracing::error!("IPC server error: {}", e);
        }
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => tracing::info!("Received Ctrl+C, shutting down"),
        _ = stop_rx => tracing::info!("Received stop request, shutting down"),
    }

    let _ = shutdown_tx.send(());
    // The stop request's own response is still being written
    tokio::time::sleep(Duration::from_millis(100)).await;
    server_task.abort();
    writer_task.abort();

    state.cleanup()?;
    tracing::info!("Daemon stopped");
    Ok(())
}

/// Sends daemon logs to `log_file`.
///
/// The returned guard flushes buffered lines when dropped and must live as
/// long as the daemon.
fn setup_logging(log_file: &Path) -> WorkerGuard {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let dir = log_file.parent().unwrap_or(Path::new("."));
    let name = log_file.file_name().unwrap_or_default();
    let (non_blocking, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "copycache=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .try_init();

    guard
}
