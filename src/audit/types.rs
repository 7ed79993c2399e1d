//! Types for the observation log.
//!
//! One entry per observed request, whether or not a line was emitted.

use crate::request::ParseMode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single entry in the observation log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// When the request was observed
    pub timestamp: DateTime<Utc>,

    /// Session identifier (UUID per CLI run or bridge server)
    pub session_id: String,

    /// Host-assigned request id, when the host supplied one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    /// The request URL as delivered
    pub url: String,

    /// The domain as rendered in the log line ("undefined" for a missing
    /// token, empty when strict parsing failed)
    pub domain: String,

    /// Classifier verdict
    pub requires_https: bool,

    /// Which classifier decided
    pub classifier: String,

    pub parse_mode: ParseMode,

    /// The emitted line, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Why the URL could not be observed (strict mode only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// How long observation took (microseconds)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eval_duration_us: Option<u64>,
}

impl LogEntry {
    pub fn is_malformed(&self) -> bool {
        self.error.is_some()
    }
}

/// Summary statistics for a session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub total_requests: usize,
    /// Requests the classifier flagged as requiring HTTPS
    pub flagged: usize,
    /// Requests whose URL could not be parsed
    pub malformed: usize,
    pub unique_domains: usize,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl SessionSummary {
    pub fn one_line(&self) -> String {
        format!(
            "{} requests | {} flagged | {} malformed | {} domains",
            self.total_requests, self.flagged, self.malformed, self.unique_domains
        )
    }
}

/// Filter criteria for querying the log.
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    /// Keep entries whose domain contains this substring
    pub domain: Option<String>,
    pub flagged_only: bool,
    pub malformed_only: bool,
    /// Keep at most this many of the most recent entries
    pub limit: Option<usize>,
}
