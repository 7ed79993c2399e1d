//! Host bridge server.
//!
//! Listens on a Unix domain socket. Each line received is a `HostEvent`;
//! the server dispatches its descriptor to the event bus and answers with a
//! `ListenerReply`. Connections are served concurrently, each on its own
//! task; within a connection events are handled in order.

use crate::gateway::protocol::{HostEvent, ListenerReply};
use crate::listener::EventBus;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;

pub struct GatewayServer {
    socket_path: PathBuf,
    bus: Arc<EventBus>,
}

impl GatewayServer {
    pub fn new(socket_path: impl AsRef<Path>, bus: EventBus) -> Self {
        Self {
            socket_path: socket_path.as_ref().to_path_buf(),
            bus: Arc::new(bus),
        }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Start serving. Runs until the task is dropped or binding fails.
    pub async fn run(&self) -> Result<()> {
        // Remove a stale socket from a previous run
        if self.socket_path.exists() {
            std::fs::remove_file(&self.socket_path).with_context(|| {
                format!("Failed to remove stale socket: {}", self.socket_path.display())
            })?;
        }

        let listener = UnixListener::bind(&self.socket_path)
            .with_context(|| format!("Failed to bind socket: {}", self.socket_path.display()))?;

        tracing::info!("Bridge listening on {}", self.socket_path.display());

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    let bus = self.bus.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, bus).await {
                            tracing::error!("Connection handler error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    tracing::error!("Failed to accept connection: {}", e);
                }
            }
        }
    }
}

/// Recover the event id from a line that is JSON but not a valid event,
/// so the host can still correlate the error reply.
fn salvage_event_id(line: &str) -> String {
    serde_json::from_str::<serde_json::Value>(line)
        .ok()
        .and_then(|v| v.get("event_id")?.as_str().map(str::to_string))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Serve one host connection until it closes.
async fn handle_connection(stream: tokio::net::UnixStream, bus: Arc<EventBus>) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        let reply = match serde_json::from_str::<HostEvent>(line.trim()) {
            Ok(event) => {
                let dispatch = bus.dispatch(&event.details);
                tracing::debug!(
                    "event {} reached {} listener(s)",
                    event.event_id,
                    dispatch.invoked
                );
                ListenerReply::from_dispatch(event.event_id, dispatch)
            }
            Err(e) => {
                tracing::warn!("Rejected host event: {}", e);
                ListenerReply::invalid(
                    salvage_event_id(line.trim()),
                    format!("Invalid event JSON: {}", e),
                )
            }
        };

        let json = serde_json::to_string(&reply)?;
        writer.write_all(json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }

    Ok(())
}
