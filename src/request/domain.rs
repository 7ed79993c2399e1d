//! Domain extraction from request URLs.
//!
//! Two modes:
//! - `Naive` splits the URL on `/` and takes the third piece. Whatever sits
//!   there (port, credentials, nothing at all) becomes the domain.
//! - `Strict` runs the URL through a real parser and yields the bare host,
//!   failing loudly on anything it can't make sense of.

use crate::request::target::{parse_target, TargetError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the observer derives a domain from a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseMode {
    /// Split on `/`, take index 2. Never fails.
    #[default]
    Naive,
    /// Full URL parse. Malformed input is an error.
    Strict,
}

impl fmt::Display for ParseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseMode::Naive => write!(f, "naive"),
            ParseMode::Strict => write!(f, "strict"),
        }
    }
}

impl ParseMode {
    /// Parse a mode from a config value. Accepts a few aliases.
    pub fn from_str_loose(s: &str) -> Option<ParseMode> {
        match s.to_lowercase().trim() {
            "naive" | "split" | "legacy" => Some(ParseMode::Naive),
            "strict" | "url" | "parsed" => Some(ParseMode::Strict),
            _ => None,
        }
    }
}

/// The domain derived from one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DomainToken {
    /// A token was found (possibly empty, possibly with a port attached).
    Present(String),
    /// The URL had fewer than three `/`-separated pieces.
    Missing,
}

impl DomainToken {
    /// The token as handed to the classifier. `Missing` becomes "".
    pub fn as_str(&self) -> &str {
        match self {
            DomainToken::Present(s) => s.as_str(),
            DomainToken::Missing => "",
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, DomainToken::Missing)
    }
}

/// Renders the token the way it appears in log lines: a missing token is
/// written literally as `undefined`.
impl fmt::Display for DomainToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainToken::Present(s) => write!(f, "{}", s),
            DomainToken::Missing => write!(f, "undefined"),
        }
    }
}

/// Take the third `/`-separated piece of `url`.
pub fn naive_domain(url: &str) -> DomainToken {
    match url.split('/').nth(2) {
        Some(token) => DomainToken::Present(token.to_string()),
        None => DomainToken::Missing,
    }
}

/// Derive the domain of `url` according to `mode`.
pub fn extract_domain(url: &str, mode: ParseMode) -> Result<DomainToken, TargetError> {
    match mode {
        ParseMode::Naive => Ok(naive_domain(url)),
        ParseMode::Strict => parse_target(url).map(|t| DomainToken::Present(t.host)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_naive_domain() {
        assert_eq!(
            naive_domain("http://example.com/path"),
            DomainToken::Present("example.com".to_string())
        );
        assert_eq!(
            naive_domain("https://secure.example.org/a/b"),
            DomainToken::Present("secure.example.org".to_string())
        );
        // Three pieces: "http:", "", "example.com"
        assert_eq!(
            naive_domain("http://example.com"),
            DomainToken::Present("example.com".to_string())
        );
    }

    #[test]
    fn test_naive_keeps_port_and_credentials() {
        assert_eq!(
            naive_domain("http://localhost:3000/api").as_str(),
            "localhost:3000"
        );
        assert_eq!(
            naive_domain("http://user:pw@example.com/").as_str(),
            "user:pw@example.com"
        );
    }

    #[test]
    fn test_naive_degenerate_inputs() {
        assert_eq!(naive_domain("example.com"), DomainToken::Missing);
        assert_eq!(naive_domain("http:/example.com"), DomainToken::Missing);
        assert_eq!(naive_domain(""), DomainToken::Missing);
        assert_eq!(naive_domain("http:///path"), DomainToken::Present(String::new()));
    }

    #[test]
    fn test_missing_renders_undefined() {
        assert_eq!(DomainToken::Missing.to_string(), "undefined");
        assert_eq!(DomainToken::Missing.as_str(), "");
        assert!(DomainToken::Missing.is_missing());
    }

    #[test]
    fn test_strict_strips_port() {
        let token = extract_domain("http://localhost:3000/api", ParseMode::Strict).unwrap();
        assert_eq!(token.as_str(), "localhost");
    }

    #[test]
    fn test_strict_rejects_garbage() {
        assert!(extract_domain("example.com", ParseMode::Strict).is_err());
        assert!(extract_domain("", ParseMode::Strict).is_err());
    }

    #[test]
    fn test_parse_mode_aliases() {
        assert_eq!(ParseMode::from_str_loose("Naive"), Some(ParseMode::Naive));
        assert_eq!(ParseMode::from_str_loose(" legacy "), Some(ParseMode::Naive));
        assert_eq!(ParseMode::from_str_loose("strict"), Some(ParseMode::Strict));
        assert_eq!(ParseMode::from_str_loose("fuzzy"), None);
    }
}
