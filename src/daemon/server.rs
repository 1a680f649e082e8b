//! Unix socket IPC server for daemon communication.
//!
//! Accepts one [`Request`] per connection, dispatches it and writes back a
//! single [`Response`]. History requests are forwarded to the
//! single-writer queue so they apply in arrival order.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{oneshot, RwLock};

use super::protocol::{parse_request, Request, Response};
use super::state::DaemonStats;
use super::writer::WriterHandle;
use crate::capture;
use crate::config::Config;
use crate::history::{Outcome, Status};
use crate::storage::{NewEntry, StorageError};

/// Routes decoded requests to the history writer and daemon controls.
pub struct Dispatcher {
    writer: WriterHandle,
    stats: Arc<RwLock<DaemonStats>>,
    config_path: Option<PathBuf>,
    shutdown_tx: std::sync::Mutex<Option<oneshot::Sender<()>>>,
}

impl Dispatcher {
    /// Creates a dispatcher.
    ///
    /// `config_path` is re-read on every capture so blacklist edits take
    /// effect without restarting the daemon; `None` disables the blacklist.
    pub fn new(
        writer: WriterHandle,
        stats: Arc<RwLock<DaemonStats>>,
        config_path: Option<PathBuf>,
        shutdown_tx: Option<oneshot::Sender<()>>,
    ) -> Self {
        Self {
            writer,
            stats,
            config_path,
            shutdown_tx: std::sync::Mutex::new(shutdown_tx),
        }
    }

    /// Handles one request.
    pub async fn handle(&self, request: Request) -> Response {
        self.stats.write().await.requests_handled += 1;

        match request {
            Request::SaveEntry { payload } => self.save(payload).await,
            Request::DeleteEntry { payload } => {
                self.history_response(self.writer.delete(payload.id).await).await
            }
            Request::TogglePin { payload } => {
                self.history_response(self.writer.toggle_pin(payload.id).await).await
            }
            Request::ClearHistory => {
                self.history_response(self.writer.clear_unpinned().await).await
            }
            Request::GetHistory => self.history_response(self.writer.get_all().await).await,
            Request::Ping => Response::Pong,
            Request::Status => {
                let stats = self.stats.read().await;
                let uptime = chrono::Utc::now()
                    .signed_duration_since(stats.started_at)
                    .num_seconds()
                    .max(0) as u64;
                Response::Status {
                    running: true,
                    pid: std::process::id(),
                    uptime_seconds: uptime,
                }
            }
            Request::Stats => Response::Stats(self.stats.read().await.clone()),
            Request::Stop => {
                let sender = match self.shutdown_tx.lock() {
                    Ok(mut guard) => guard.take(),
                    Err(e) => {
                        tracing::warn!("Shutdown handle poisoned: {}", e);
                        None
                    }
                };
                if let Some(tx) = sender {
                    let _ = tx.send(());
                }
                Response::Stopping
            }
        }
    }

    async fn save(&self, payload: NewEntry) -> Response {
        let blacklist = match self.blacklist() {
            Ok(list) => list,
            Err(e) => {
                tracing::warn!("Could not load config, ignoring blacklist: {:#}", e);
                Vec::new()
            }
        };

        if let Err(skip) = capture::check(&payload, &blacklist) {
            tracing::debug!("Skipping capture: {}", skip);
            self.stats.write().await.captures_skipped += 1;
            return self.history_response(self.writer.get_all().await).await;
        }

        let result = self.writer.insert(payload).await;
        if let Ok(outcome) = &result {
            let mut stats = self.stats.write().await;
            match outcome.status {
                Status::Mutated => stats.entries_captured += 1,
                Status::Unchanged => stats.captures_skipped += 1,
            }
        }
        self.history_response(result).await
    }

    fn blacklist(&self) -> Result<Vec<String>> {
        match &self.config_path {
            Some(path) => Ok(Config::load_from_path(path)?.blacklist),
            None => Ok(Vec::new()),
        }
    }

    async fn history_response(&self, result: Result<Outcome, StorageError>) -> Response {
        match result {
            Ok(outcome) => Response::History {
                status: outcome.status,
                entries: outcome.history,
            },
            Err(e) => {
                self.stats.write().await.errors += 1;
                Response::Error {
                    error: e.to_string(),
                }
            }
        }
    }
}

/// Runs the IPC server on the given Unix socket path.
///
/// The server listens for incoming connections and processes requests
/// until a shutdown signal is received.
///
/// # Errors
///
/// Returns an error if the socket cannot be created or bound.
pub async fn run_server(
    socket_path: &Path,
    dispatcher: Arc<Dispatcher>,
    mut shutdown_rx: tokio::sync::broadcast::Receiver<()>,
) -> Result<()> {
    // A socket left by a crashed daemon blocks bind
    if socket_path.exists() {
        std::fs::remove_file(socket_path).context("Failed to remove existing socket file")?;
    }

    let listener = UnixListener::bind(socket_path).context("Failed to bind Unix socket")?;

    tracing::info!("IPC server listening on {:?}", socket_path);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, _addr)) => {
                        let dispatcher = dispatcher.clone();
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(stream, dispatcher).await {
                                tracing::warn!("Error handling IPC connection: {}", e);
                            }
                        });
                    }
                    Err(e) => {
                        tracing::warn!("Failed to accept connection: {}", e);
                    }
                }
            }
            _ = shutdown_rx.recv() => {
                tracing::info!("IPC server shutting down");
                break;
            }
        }
    }

    Ok(())
}

/// Largest request line accepted, in bytes.
pub const MAX_REQUEST_BYTES: u64 = 8 * 1024 * 1024;

/// How long a client gets to send its request line.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Reads one request line of at most `limit` bytes.
///
/// A line cut off by the limit comes back without its newline and fails to
/// parse, so the client still gets an error response.
async fn read_request<R>(reader: R, limit: u64, timeout: Duration) -> Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader.take(limit));
    let mut line = String::new();

    tokio::time::timeout(timeout, reader.read_line(&mut line))
        .await
        .context("Timed out waiting for request")?
        .context("Failed to read from socket")?;

    Ok(line)
}

/// Handles a single client connection.
async fn handle_connection(stream: UnixStream, dispatcher: Arc<Dispatcher>) -> Result<()> {
    let (reader, mut writer) = stream.into_split();

    // One request per connection
    let line = read_request(reader, MAX_REQUEST_BYTES, REQUEST_TIMEOUT).await?;

    let response = match parse_request(&line) {
        Ok(request) => {
            tracing::debug!("Received request: {:?}", request);
            dispatcher.handle(request).await
        }
        Err(e) => {
            tracing::warn!("Rejected request: {}", e);
            Response::Error {
                error: e.to_string(),
            }
        }
    };

    write_line(&mut writer, &response).await
}

/// Writes `message` as one line of JSON.
async fn write_line<W, T>(writer: &mut W, message: &T) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: serde::Serialize,
{
    let mut json = serde_json::to_string(message).context("Failed to serialize message")?;
    json.push('\n');
    writer
        .write_all(json.as_bytes())
        .await
        .context("Failed to write to socket")?;
    writer.flush().await.context("Failed to flush socket")?;
    Ok(())
}

/// Sends a request to the daemon and returns the response.
///
/// # Errors
///
/// Returns an error if the connection fails, the request cannot be sent,
/// or the response cannot be read or parsed.
pub async fn send_request(socket_path: &Path, request: &Request) -> Result<Response> {
    let stream = UnixStream::connect(socket_path)
        .await
        .context("Failed to connect to daemon socket")?;

    let (reader, mut writer) = stream.into_split();

    write_line(&mut writer, request).await?;

    let mut reader = BufReader::new(reader);
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .await
        .context("Failed to read response")?;

    let response: Response =
        serde_json::from_str(line.trim()).context("Failed to parse response")?;

    Ok(response)
}

/// Synchronous wrapper for sending a request to the daemon.
///
/// Creates a temporary tokio runtime. Use this from non-async contexts
/// like CLI commands.
pub fn send_request_sync(socket_path: &Path, request: &Request) -> Result<Response> {
    let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    rt.block_on(send_request(socket_path, request))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daemon::writer;
    use crate::history::{HistoryConfig, HistoryStore};
    use crate::storage::MemoryStore;
    use tempfile::tempdir;

    fn dispatcher_with(config_path: Option<PathBuf>) -> (Dispatcher, oneshot::Receiver<()>) {
        let store = HistoryStore::new(MemoryStore::new(), HistoryConfig::default());
        let (handle, _join) = writer::spawn(store);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let dispatcher = Dispatcher::new(
            handle,
            Arc::new(RwLock::new(DaemonStats::default())),
            config_path,
            Some(shutdown_tx),
        );
        (dispatcher, shutdown_rx)
    }

    fn entries(response: Response) -> crate::storage::History {
        match response {
            Response::History { entries, .. } => entries,
            other => panic!("Expected History response, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_save_then_get() {
        let (dispatcher, _rx) = dispatcher_with(None);

        dispatcher
            .handle(Request::save(NewEntry::text("hello")))
            .await;
        let history = entries(dispatcher.handle(Request::GetHistory).await);

        assert_eq!(history.len(), 1);
        assert_eq!(history[0].content, "hello");
    }

    #[tokio::test]
    async fn test_empty_capture_is_skipped() {
        let (dispatcher, _rx) = dispatcher_with(None);

        let response = dispatcher.handle(Request::save(NewEntry::text("  "))).await;

        match response {
            Response::History { status, entries } => {
                assert_eq!(status, Status::Unchanged);
                assert!(entries.is_empty());
            }
            other => panic!("Expected History response, got {other:?}"),
        }
        assert_eq!(dispatcher.stats.read().await.captures_skipped, 1);
    }

    #[tokio::test]
    async fn test_blacklisted_source_is_skipped() {
        let dir = tempdir().expect("Failed to create temp dir");
        let config_path = dir.path().join("config.yaml");
        let mut config = Config::default();
        config.add_to_blacklist("*.bank.com");
        config.save_to_path(&config_path).expect("Failed to save config");

        let (dispatcher, _rx) = dispatcher_with(Some(config_path));

        let blocked = NewEntry {
            source: Some("https://login.bank.com/".to_string()),
            ..NewEntry::text("account 1234")
        };
        let allowed = NewEntry {
            source: Some("https://docs.rs/".to_string()),
            ..NewEntry::text("cargo add")
        };

        dispatcher.handle(Request::save(blocked)).await;
        let history = entries(dispatcher.handle(Request::save(allowed)).await);

        assert_eq!(history.len(), 1);
        assert_eq!(history[0].content, "cargo add");
    }

    #[tokio::test]
    async fn test_capture_refused_by_full_pins_counts_as_skipped() {
        let store = HistoryStore::new(
            MemoryStore::new(),
            HistoryConfig {
                capacity: 1,
                merge_duplicates: true,
            },
        );
        let (handle, _join) = writer::spawn(store);
        let dispatcher = Dispatcher::new(
            handle,
            Arc::new(RwLock::new(DaemonStats::default())),
            None,
            None,
        );

        let history = entries(dispatcher.handle(Request::save(NewEntry::text("a"))).await);
        dispatcher.handle(Request::toggle_pin(history[0].id)).await;

        match dispatcher.handle(Request::save(NewEntry::text("b"))).await {
            Response::History { status, entries } => {
                assert_eq!(status, Status::Unchanged);
                assert_eq!(entries[0].content, "a");
            }
            other => panic!("Expected History response, got {other:?}"),
        }

        let stats = dispatcher.stats.read().await;
        assert_eq!(stats.entries_captured, 1);
        assert_eq!(stats.captures_skipped, 1);
    }

    #[tokio::test]
    async fn test_toggle_and_delete_unknown_ids() {
        let (dispatcher, _rx) = dispatcher_with(None);
        dispatcher.handle(Request::save(NewEntry::text("a"))).await;

        let unknown = uuid::Uuid::new_v4();
        for request in [Request::toggle_pin(unknown), Request::delete(unknown)] {
            match dispatcher.handle(request).await {
                Response::History { status, entries } => {
                    assert_eq!(status, Status::Unchanged);
                    assert_eq!(entries.len(), 1);
                }
                other => panic!("Expected History response, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_stop_signals_shutdown() {
        let (dispatcher, rx) = dispatcher_with(None);

        assert!(matches!(
            dispatcher.handle(Request::Stop).await,
            Response::Stopping
        ));
        rx.await.expect("shutdown should be signalled");

        // A second stop has nothing left to signal but still answers.
        assert!(matches!(
            dispatcher.handle(Request::Stop).await,
            Response::Stopping
        ));
    }

    #[tokio::test]
    async fn test_server_client_communication() {
        let dir = tempdir().expect("Failed to create temp dir");
        let socket_path = dir.path().join("test.sock");

        let (dispatcher, _stop_rx) = dispatcher_with(None);
        let dispatcher = Arc::new(dispatcher);
        let (broadcast_tx, broadcast_rx) = tokio::sync::broadcast::channel(1);

        let socket_path_clone = socket_path.clone();
        let server_handle = tokio::spawn(async move {
            run_server(&socket_path_clone, dispatcher, broadcast_rx).await
        });

        // Give server time to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        let response = send_request(&socket_path, &Request::Ping)
            .await
            .expect("Failed to send ping");
        assert!(matches!(response, Response::Pong));

        let response = send_request(&socket_path, &Request::save(NewEntry::text("over the wire")))
            .await
            .expect("Failed to send save");
        let history = entries(response);
        assert_eq!(history[0].content, "over the wire");

        // Raw garbage gets an error response rather than a dropped connection
        let stream = UnixStream::connect(&socket_path)
            .await
            .expect("Failed to connect");
        let (reader, mut writer) = stream.into_split();
        writer
            .write_all(b"{\"type\":\"NOPE\"}\n")
            .await
            .expect("Failed to write");
        let mut line = String::new();
        BufReader::new(reader)
            .read_line(&mut line)
            .await
            .expect("Failed to read");
        let response: Response = serde_json::from_str(line.trim()).expect("Failed to parse");
        assert!(matches!(response, Response::Error { .. }));

        let _ = broadcast_tx.send(());
        let _ = tokio::time::timeout(tokio::time::Duration::from_secs(1), server_handle).await;
    }

    #[tokio::test]
    async fn test_read_request_stops_at_limit() {
        let (mut client, server) = tokio::io::duplex(256);
        client
            .write_all(&[b'x'; 64])
            .await
            .expect("Failed to write");

        // The client stays connected and never sends a newline
        let line = read_request(server, 16, Duration::from_secs(1))
            .await
            .expect("Read should end at the limit");

        assert_eq!(line.len(), 16);
        assert!(parse_request(&line).is_err());
        drop(client);
    }

    #[tokio::test]
    async fn test_read_request_times_out_on_silent_client() {
        let (client, server) = tokio::io::duplex(256);

        let err = read_request(server, MAX_REQUEST_BYTES, Duration::from_millis(50))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Timed out"));
        drop(client);
    }

    #[tokio::test]
    async fn test_read_request_returns_one_line() {
        let (mut client, server) = tokio::io::duplex(256);
        client
            .write_all(b"{\"type\":\"PING\"}\n{\"type\":\"STOP\"}\n")
            .await
            .expect("Failed to write");

        let line = read_request(server, MAX_REQUEST_BYTES, Duration::from_secs(1))
            .await
            .expect("Failed to read");

        assert!(matches!(parse_request(&line), Ok(Request::Ping)));
    }
}
