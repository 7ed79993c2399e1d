//! Configuration for httpswatch.
//!
//! Loaded from `.httpswatch.yaml`, found by walking up from the working
//! directory. Without a file, `Config::default()` applies: naive parsing,
//! `http://*/*`, blocking registration, observation log on.

pub mod defaults;
pub mod parser;

use crate::request::ParseMode;
use std::path::PathBuf;

/// File name searched for when discovering configuration.
pub const CONFIG_FILE_NAME: &str = ".httpswatch.yaml";

/// Fully validated configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Configuration name (e.g., "default-v1")
    pub name: String,

    pub description: Option<String>,

    /// How domains are derived from URLs.
    pub parse_mode: ParseMode,

    /// Match patterns selecting which requests reach the observer.
    pub urls: Vec<String>,

    /// Optional resource-type restriction.
    pub types: Option<Vec<String>>,

    /// Register the listener with blocking capability.
    pub blocking: bool,

    pub audit: AuditConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuditConfig {
    pub enabled: bool,
    /// Log directory override. `None` means `~/.httpswatch/logs`.
    pub dir: Option<PathBuf>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: "default-v1".to_string(),
            description: None,
            parse_mode: ParseMode::Naive,
            urls: vec![defaults::DEFAULT_URL_PATTERN.to_string()],
            types: None,
            blocking: true,
            audit: AuditConfig::default(),
        }
    }
}

impl Config {
    /// One-line description for status output.
    pub fn describe(&self) -> String {
        let mut desc = format!("{} mode, filters: {}", self.parse_mode, self.urls.join(", "));
        if let Some(ref types) = self.types {
            desc.push_str(&format!(", types: {}", types.join(",")));
        }
        if self.blocking {
            desc.push_str(", blocking");
        }
        desc
    }
}
