//! Observation log reader — filter, summarize and display sessions.

use crate::audit::logger::validate_session_id;
use crate::audit::types::*;
use anyhow::{Context, Result};
use colored::Colorize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Reads and queries observation log files.
pub struct AuditReader {
    log_dir: PathBuf,
}

impl AuditReader {
    /// Create a reader using the default log directory.
    pub fn new() -> Result<Self> {
        let log_dir = crate::audit::logger::AuditLogger::log_directory()?;
        Ok(Self { log_dir })
    }

    /// Create a reader for a specific directory.
    pub fn with_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            log_dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Read all entries from a session log file.
    pub fn read_session(&self, session_id: &str) -> Result<Vec<LogEntry>> {
        validate_session_id(session_id)?;
        let path = self.log_dir.join(format!("{}.jsonl", session_id));
        self.read_file(&path)
    }

    fn read_file(&self, path: &Path) -> Result<Vec<LogEntry>> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read log file: {}", path.display()))?;

        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                serde_json::from_str(line)
                    .with_context(|| format!("Failed to parse log entry at line {}", i + 1))
            })
            .collect()
    }

    /// Read entries from the most recently modified session.
    pub fn read_latest_session(&self) -> Result<Vec<LogEntry>> {
        match self.find_latest_session()? {
            Some(path) => self.read_file(&path),
            None => Ok(Vec::new()),
        }
    }

    fn find_latest_session(&self) -> Result<Option<PathBuf>> {
        if !self.log_dir.exists() {
            return Ok(None);
        }

        let mut entries: Vec<PathBuf> = fs::read_dir(&self.log_dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|e| e == "jsonl"))
            .collect();

        // Most recent first
        entries.sort_by(|a, b| {
            let a_time = fs::metadata(a).and_then(|m| m.modified()).ok();
            let b_time = fs::metadata(b).and_then(|m| m.modified()).ok();
            b_time.cmp(&a_time)
        });

        Ok(entries.into_iter().next())
    }

    /// List all session IDs, sorted.
    pub fn list_sessions(&self) -> Result<Vec<String>> {
        if !self.log_dir.exists() {
            return Ok(Vec::new());
        }

        let mut sessions: Vec<String> = fs::read_dir(&self.log_dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "jsonl"))
            .filter_map(|p| p.file_stem().map(|s| s.to_string_lossy().to_string()))
            .collect();

        sessions.sort();
        Ok(sessions)
    }

    /// Filter entries. With a limit, the most recent matches are kept,
    /// still in log order.
    pub fn filter_entries(entries: &[LogEntry], filter: &LogFilter) -> Vec<LogEntry> {
        let matched: Vec<LogEntry> = entries
            .iter()
            .filter(|e| {
                if let Some(ref needle) = filter.domain {
                    if !e.domain.contains(needle.as_str()) {
                        return false;
                    }
                }
                if filter.flagged_only && !e.requires_https {
                    return false;
                }
                if filter.malformed_only && !e.is_malformed() {
                    return false;
                }
                true
            })
            .cloned()
            .collect();

        match filter.limit {
            Some(limit) if matched.len() > limit => matched[matched.len() - limit..].to_vec(),
            _ => matched,
        }
    }

    /// Summarize a set of entries.
    pub fn summarize(entries: &[LogEntry]) -> SessionSummary {
        let mut summary = SessionSummary::default();

        if let Some(first) = entries.first() {
            summary.session_id = first.session_id.clone();
            summary.start_time = Some(first.timestamp);
        }
        if let Some(last) = entries.last() {
            summary.end_time = Some(last.timestamp);
        }

        let mut domains = HashSet::new();
        summary.total_requests = entries.len();
        for entry in entries {
            if entry.requires_https {
                summary.flagged += 1;
            }
            if entry.is_malformed() {
                summary.malformed += 1;
            } else {
                domains.insert(entry.domain.as_str());
            }
        }
        summary.unique_domains = domains.len();

        summary
    }

    /// Pretty-print an entry for the terminal.
    pub fn format_entry(entry: &LogEntry) -> String {
        let timestamp = entry.timestamp.format("%H:%M:%S").to_string();

        if let Some(ref error) = entry.error {
            return format!(
                "[{}] {} {} ({})",
                timestamp.dimmed(),
                "MALFORMED".red(),
                entry.url,
                error.dimmed()
            );
        }

        let verdict = if entry.requires_https {
            "HTTPS".yellow().to_string()
        } else {
            "OK".green().to_string()
        };

        format!(
            "[{}] {} {} -> {}",
            timestamp.dimmed(),
            verdict,
            entry.domain.bold(),
            entry.url.dimmed()
        )
    }
}
