//! Host bridge client.
//!
//! Used by host-side shims that forward intercepted requests, and by the
//! integration tests.

use crate::gateway::protocol::{HostEvent, ListenerReply};
use crate::request::RequestDescriptor;
use anyhow::{Context, Result};
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Environment variable naming the bridge socket.
pub const SOCKET_ENV: &str = "HTTPSWATCH_SOCKET";

pub struct GatewayClient {
    socket_path: PathBuf,
}

impl GatewayClient {
    pub fn new(socket_path: impl AsRef<Path>) -> Self {
        Self {
            socket_path: socket_path.as_ref().to_path_buf(),
        }
    }

    /// Create a client from the HTTPSWATCH_SOCKET environment variable.
    pub fn from_env() -> Result<Self> {
        let socket_path = std::env::var(SOCKET_ENV).with_context(|| {
            format!("{} is not set. Is `httpswatch serve` running?", SOCKET_ENV)
        })?;
        Ok(Self::new(socket_path))
    }

    /// Send one event and wait for its reply.
    /// Each call opens a new connection.
    pub fn send(&self, event: &HostEvent) -> Result<ListenerReply> {
        let mut stream = UnixStream::connect(&self.socket_path).with_context(|| {
            format!(
                "Failed to connect to httpswatch bridge at {}",
                self.socket_path.display()
            )
        })?;

        let json = serde_json::to_string(event)?;
        stream.write_all(json.as_bytes())?;
        stream.write_all(b"\n")?;
        stream.flush()?;

        let mut reader = BufReader::new(stream);
        let mut reply_line = String::new();
        reader.read_line(&mut reply_line)?;

        serde_json::from_str(reply_line.trim()).context("Failed to parse bridge reply")
    }

    /// Forward a descriptor under a fresh event id.
    pub fn forward(&self, details: RequestDescriptor) -> Result<ListenerReply> {
        let event = HostEvent {
            event_id: Uuid::new_v4().to_string(),
            details,
        };
        self.send(&event)
    }

    /// Convenience: forward a bare URL.
    pub fn observe(&self, url: &str) -> Result<ListenerReply> {
        self.forward(RequestDescriptor::new(url))
    }
}
