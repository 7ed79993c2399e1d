//! YAML configuration parser.
//!
//! # Example configuration file:
//! ```yaml
//! name: my-watch
//! parse_mode: strict
//! urls: ["http://*/*", "ws://*/*"]
//! types: main_frame
//! blocking: true
//! audit:
//!   enabled: true
//!   dir: ~/logs/httpswatch
//! ```

use crate::config::{AuditConfig, Config, CONFIG_FILE_NAME};
use crate::listener::PatternSet;
use crate::request::ParseMode;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Raw YAML representation before validation.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    parse_mode: Option<String>,
    #[serde(default)]
    urls: Option<StringOrVec>,
    #[serde(default)]
    types: Option<StringOrVec>,
    #[serde(default)]
    blocking: Option<bool>,
    #[serde(default)]
    audit: Option<RawAudit>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAudit {
    #[serde(default)]
    enabled: Option<bool>,
    #[serde(default)]
    dir: Option<String>,
}

/// Lets list fields be written as a single string:
/// ```yaml
/// urls: "http://*/*"              # single string — works
/// urls: ["http://*/*", "ws://*/*"] # list — also works
/// ```
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StringOrVec {
    Single(String),
    Multiple(Vec<String>),
}

impl StringOrVec {
    fn into_vec(self) -> Vec<String> {
        match self {
            StringOrVec::Single(s) => vec![s],
            StringOrVec::Multiple(v) => v,
        }
    }
}

/// Parse a configuration file.
pub fn parse_config_file(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse a YAML configuration string.
pub fn parse_config_str(yaml: &str) -> Result<Config> {
    let raw: RawConfig =
        serde_yaml::from_str(yaml).context("Invalid YAML syntax in config file")?;

    if raw.name.trim().is_empty() {
        bail!("Config must have a non-empty 'name'");
    }

    let parse_mode = match raw.parse_mode {
        Some(ref s) => ParseMode::from_str_loose(s)
            .with_context(|| format!("Unknown parse_mode '{}' (expected naive or strict)", s))?,
        None => ParseMode::default(),
    };

    let defaults = Config::default();

    let urls = match raw.urls {
        Some(u) => u.into_vec(),
        None => defaults.urls,
    };
    if urls.is_empty() {
        bail!("Config must list at least one URL pattern under 'urls'");
    }
    // Compile once here so a bad pattern fails at load time
    PatternSet::new(&urls).context("Invalid URL pattern")?;

    let types = raw.types.map(StringOrVec::into_vec);
    if let Some(ref t) = types {
        if t.is_empty() {
            bail!("'types' must not be an empty list (omit it to match every type)");
        }
    }

    let audit = match raw.audit {
        Some(a) => AuditConfig {
            enabled: a.enabled.unwrap_or(true),
            dir: a.dir.map(|d| expand_home(&d)),
        },
        None => AuditConfig::default(),
    };

    Ok(Config {
        name: raw.name,
        description: raw.description,
        parse_mode,
        urls,
        types,
        blocking: raw.blocking.unwrap_or(defaults.blocking),
        audit,
    })
}

/// Find the config file walking up from `start`.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.exists() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}

/// Load configuration for `start`: the nearest config file, or the defaults.
/// Returns the path that was loaded alongside the config.
pub fn load_config(start: &Path) -> Result<(Config, Option<PathBuf>)> {
    match find_config(start) {
        Some(path) => {
            let config = parse_config_file(&path)?;
            Ok((config, Some(path)))
        }
        None => Ok((Config::default(), None)),
    }
}

/// Expand a leading `~/` to the home directory.
fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_minimal_config() {
        let config = parse_config_str("name: mini\n").unwrap();
        assert_eq!(config.name, "mini");
        assert_eq!(config.parse_mode, ParseMode::Naive);
        assert_eq!(config.urls, vec!["http://*/*"]);
        assert!(config.blocking);
        assert!(config.audit.enabled);
    }

    #[test]
    fn test_full_config() {
        let yaml = r#"
name: full
parse_mode: strict
urls: ["http://*/*", "ws://*/*"]
types: main_frame
blocking: false
audit:
  enabled: false
  dir: /var/log/httpswatch
"#;
        let config = parse_config_str(yaml).unwrap();
        assert_eq!(config.parse_mode, ParseMode::Strict);
        assert_eq!(config.urls.len(), 2);
        assert_eq!(config.types, Some(vec!["main_frame".to_string()]));
        assert!(!config.blocking);
        assert!(!config.audit.enabled);
        assert_eq!(config.audit.dir, Some(PathBuf::from("/var/log/httpswatch")));
    }

    #[test]
    fn test_rejects_unknown_mode() {
        let err = parse_config_str("name: x\nparse_mode: fuzzy\n").unwrap_err();
        assert!(format!("{:#}", err).contains("fuzzy"));
    }

    #[test]
    fn test_rejects_bad_pattern() {
        assert!(parse_config_str("name: x\nurls: \"gopher://*/*\"\n").is_err());
    }

    #[test]
    fn test_rejects_pattern_with_port() {
        let err = parse_config_str("name: x\nurls: \"http://localhost:3000/*\"\n").unwrap_err();
        assert!(format!("{:#}", err).contains("port"));
    }

    #[test]
    fn test_rejects_empty_name_and_urls() {
        assert!(parse_config_str("name: \"  \"\n").is_err());
        assert!(parse_config_str("name: x\nurls: []\n").is_err());
    }

    #[test]
    fn test_rejects_unknown_fields() {
        assert!(parse_config_str("name: x\nallow_list: [example.com]\n").is_err());
    }

    #[test]
    fn test_find_config_walks_up() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("a/b/c");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(tmp.path().join(CONFIG_FILE_NAME), "name: found\n").unwrap();

        let found = find_config(&nested).unwrap();
        assert_eq!(found, tmp.path().join(CONFIG_FILE_NAME));

        let (config, path) = load_config(&nested).unwrap();
        assert_eq!(config.name, "found");
        assert!(path.is_some());
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/abs/path"), PathBuf::from("/abs/path"));
        assert_eq!(expand_home("~user/logs"), PathBuf::from("~user/logs"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/logs"), home.join("logs"));
            assert_eq!(expand_home("~"), home);
        }
    }
}
