//! Where observation lines go.
//!
//! Implementations can be the tracing subscriber, a plain stream, or an
//! in-memory buffer for tests.

use std::io::Write;
use std::sync::Mutex;

/// Receives one line per classified request.
pub trait LogSink: Send + Sync {
    fn emit(&self, line: &str);
}

/// Emits through `tracing` at info level.
pub struct TracingSink;

impl LogSink for TracingSink {
    fn emit(&self, line: &str) {
        tracing::info!("{}", line);
    }
}

/// Writes each line to stdout.
pub struct StdoutSink;

impl LogSink for StdoutSink {
    fn emit(&self, line: &str) {
        let mut out = std::io::stdout().lock();
        // A closed pipe shouldn't take the observer down with it
        let _ = writeln!(out, "{}", line);
    }
}

/// Writes each line to stderr (the hook binary keeps stdout for the host).
pub struct StderrSink;

impl LogSink for StderrSink {
    fn emit(&self, line: &str) {
        let mut err = std::io::stderr().lock();
        let _ = writeln!(err, "{}", line);
    }
}

/// Collects lines in memory, in emission order.
#[derive(Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far.
    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl LogSink for MemorySink {
    fn emit(&self, line: &str) {
        match self.lines.lock() {
            Ok(mut lines) => lines.push(line.to_string()),
            Err(poisoned) => poisoned.into_inner().push(line.to_string()),
        }
    }
}
