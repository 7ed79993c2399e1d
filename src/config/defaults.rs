//! Built-in configuration templates.
//!
//! `default` mirrors the historical behavior: split-based domain extraction
//! that never fails. `strict` parses every URL and rejects malformed ones.

/// Filter the observer is registered with unless configured otherwise.
pub const DEFAULT_URL_PATTERN: &str = "http://*/*";

pub const DEFAULT_YAML: &str = r#"name: default-v1
description: Flag every plain-HTTP request, split-based domain extraction
parse_mode: naive
urls: "http://*/*"
blocking: true
audit:
  enabled: true
"#;

pub const STRICT_YAML: &str = r#"name: strict-v1
description: Flag every plain-HTTP request, malformed URLs are rejected
parse_mode: strict
urls:
  - "http://*/*"
  - "ws://*/*"
blocking: true
audit:
  enabled: true
"#;

/// Look up a template by name.
pub fn get_template(name: &str) -> Option<&'static str> {
    match name.to_lowercase().trim() {
        "default" | "default-v1" | "naive" => Some(DEFAULT_YAML),
        "strict" | "strict-v1" => Some(STRICT_YAML),
        _ => None,
    }
}

/// Names accepted by `get_template`.
pub fn available_templates() -> &'static [&'static str] {
    &["default", "strict"]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parser::parse_config_str;
    use crate::request::ParseMode;

    #[test]
    fn test_templates_parse() {
        for name in available_templates() {
            let yaml = get_template(name).unwrap();
            parse_config_str(yaml).unwrap_or_else(|e| panic!("{} failed: {:#}", name, e));
        }
    }

    #[test]
    fn test_default_template_matches_default_config() {
        let parsed = parse_config_str(DEFAULT_YAML).unwrap();
        let default = crate::config::Config::default();
        assert_eq!(parsed.parse_mode, default.parse_mode);
        assert_eq!(parsed.urls, default.urls);
        assert_eq!(parsed.blocking, default.blocking);
    }

    #[test]
    fn test_strict_template() {
        let parsed = parse_config_str(STRICT_YAML).unwrap();
        assert_eq!(parsed.parse_mode, ParseMode::Strict);
        assert_eq!(parsed.urls.len(), 2);
    }

    #[test]
    fn test_unknown_template() {
        assert!(get_template("paranoid").is_none());
    }
}
