//! Observation log writer — append-only JSONL files.
//!
//! Writes to `~/.httpswatch/logs/{session_id}.jsonl` (or a configured
//! directory), one JSON object per line, flushed after every write.

use crate::audit::types::LogEntry;
use anyhow::{bail, Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only logger for one session.
pub struct AuditLogger {
    log_path: PathBuf,
    file: File,
    entry_count: usize,
}

impl AuditLogger {
    /// Create a logger for a session in the default log directory.
    pub fn new(session_id: &str) -> Result<Self> {
        let log_dir = Self::log_directory()?;
        Self::in_dir(&log_dir, session_id)
    }

    /// Create a logger for a session in `dir`, creating it if needed.
    pub fn in_dir(dir: impl AsRef<Path>, session_id: &str) -> Result<Self> {
        validate_session_id(session_id)?;
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
        Self::with_path(dir.join(format!("{}.jsonl", session_id)))
    }

    /// Create a logger writing to a specific file.
    pub fn with_path(path: impl AsRef<Path>) -> Result<Self> {
        let log_path = path.as_ref().to_path_buf();
        if let Some(parent) = log_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

        Ok(Self {
            log_path,
            file,
            entry_count: 0,
        })
    }

    /// Append one entry and flush.
    pub fn log(&mut self, entry: &LogEntry) -> Result<()> {
        let json = serde_json::to_string(entry).context("Failed to serialize log entry")?;
        writeln!(self.file, "{}", json).context("Failed to write log entry")?;
        self.file.flush().context("Failed to flush log file")?;
        self.entry_count += 1;
        Ok(())
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Number of entries written by this logger.
    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    /// The default log directory (~/.httpswatch/logs/).
    pub fn log_directory() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".httpswatch").join("logs"))
    }
}

/// Session ids name a file inside the log directory, so they must be a
/// single plain path component.
pub fn validate_session_id(session_id: &str) -> Result<()> {
    if session_id.is_empty()
        || session_id == "."
        || session_id == ".."
        || session_id.contains(['/', '\\', '\0'])
    {
        bail!("Invalid session id '{}': must be a plain file name", session_id);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::ParseMode;
    use chrono::Utc;
    use tempfile::TempDir;

    fn entry(url: &str, domain: &str) -> LogEntry {
        LogEntry {
            timestamp: Utc::now(),
            session_id: "test-session".to_string(),
            request_id: None,
            url: url.to_string(),
            domain: domain.to_string(),
            requires_https: true,
            classifier: "always-https".to_string(),
            parse_mode: ParseMode::Naive,
            message: Some(format!("Domain {} requires HTTPS", domain)),
            error: None,
            eval_duration_us: Some(3),
        }
    }

    #[test]
    fn test_write_and_read_back() {
        let tmp = TempDir::new().unwrap();
        let mut logger = AuditLogger::in_dir(tmp.path(), "test-session").unwrap();
        logger.log(&entry("http://example.com/", "example.com")).unwrap();
        assert_eq!(logger.entry_count(), 1);
        assert_eq!(logger.log_path(), tmp.path().join("test-session.jsonl"));

        let content = fs::read_to_string(logger.log_path()).unwrap();
        let parsed: LogEntry = serde_json::from_str(content.trim()).unwrap();
        assert_eq!(parsed.domain, "example.com");
        assert_eq!(parsed.parse_mode, ParseMode::Naive);
    }

    #[test]
    fn test_append_only_across_loggers() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested/dir/s.jsonl");

        let mut first = AuditLogger::with_path(&path).unwrap();
        first.log(&entry("http://a.example/", "a.example")).unwrap();
        drop(first);

        let mut second = AuditLogger::with_path(&path).unwrap();
        second.log(&entry("http://b.example/", "b.example")).unwrap();
        second.log(&entry("http://c.example/", "c.example")).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim().lines().count(), 3);
    }

    #[test]
    fn test_session_id_cannot_leave_log_dir() {
        let tmp = TempDir::new().unwrap();
        let logs = tmp.path().join("logs");
        for bad in ["../escaped", "a/b", "a\\b", "..", ".", ""] {
            assert!(
                AuditLogger::in_dir(&logs, bad).is_err(),
                "{:?} should be rejected",
                bad
            );
        }
        assert!(!tmp.path().join("escaped.jsonl").exists());

        let logger = AuditLogger::in_dir(&logs, "hook-2024.01").unwrap();
        assert_eq!(logger.log_path(), logs.join("hook-2024.01.jsonl"));
    }
}
