//! URL match patterns — the filter syntax hosts use to pick which requests
//! reach a listener.
//!
//! Grammar: `<all_urls>` or `<scheme>://<host><path>`.
//! - scheme: `*` (http or https), or one of http, https, ws, wss, ftp, file
//! - host: `*`, `*.<suffix>`, or an exact host (empty only for file URLs)
//! - path: starts with `/`; `*` matches any run of characters
//!
//! Path globs are compiled once when the pattern is parsed.

use globset::{GlobBuilder, GlobMatcher};
use std::fmt;
use std::path::Path;
use thiserror::Error;
use url::Url;

const ALL_URLS: &str = "<all_urls>";
const KNOWN_SCHEMES: &[&str] = &["http", "https", "ws", "wss", "ftp", "file"];

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("pattern '{0}' is missing '://'")]
    MissingSeparator(String),

    #[error("pattern '{pattern}' has unsupported scheme '{scheme}'")]
    UnsupportedScheme { pattern: String, scheme: String },

    #[error("pattern '{0}' has an invalid host")]
    InvalidHost(String),

    #[error("pattern '{0}' names a port; match patterns select hosts, not ports")]
    PortNotAllowed(String),

    #[error("pattern '{0}' has an empty host")]
    EmptyHost(String),

    #[error("pattern '{0}' is missing a path")]
    MissingPath(String),

    #[error("pattern '{pattern}' has an invalid path glob: {source}")]
    InvalidPath {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SchemeMatch {
    /// `*` — http and https only.
    Web,
    Exact(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum HostMatch {
    Any,
    /// `*.example.com` — example.com itself and every subdomain.
    Suffix(String),
    Exact(String),
}

#[derive(Debug, Clone)]
enum Matcher {
    AllUrls,
    Parts {
        scheme: SchemeMatch,
        host: HostMatch,
        path: GlobMatcher,
    },
}

/// A compiled match pattern.
#[derive(Debug, Clone)]
pub struct MatchPattern {
    raw: String,
    matcher: Matcher,
}

impl MatchPattern {
    /// Parse and compile a pattern string.
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let raw = pattern.trim().to_string();
        if raw == ALL_URLS {
            return Ok(Self {
                raw,
                matcher: Matcher::AllUrls,
            });
        }

        let (scheme_part, rest) = raw
            .split_once("://")
            .ok_or_else(|| PatternError::MissingSeparator(raw.clone()))?;

        let scheme = match scheme_part {
            "*" => SchemeMatch::Web,
            s if KNOWN_SCHEMES.contains(&s) => SchemeMatch::Exact(s.to_string()),
            s => {
                return Err(PatternError::UnsupportedScheme {
                    pattern: raw.clone(),
                    scheme: s.to_string(),
                })
            }
        };

        let slash = rest
            .find('/')
            .ok_or_else(|| PatternError::MissingPath(raw.clone()))?;
        let (host_part, path_part) = rest.split_at(slash);

        let host = if host_part == "*" {
            HostMatch::Any
        } else if let Some(suffix) = host_part.strip_prefix("*.") {
            if suffix.is_empty() || suffix.contains('*') {
                return Err(PatternError::InvalidHost(raw.clone()));
            }
            HostMatch::Suffix(normalize_host(&raw, suffix)?)
        } else if host_part.contains('*') {
            return Err(PatternError::InvalidHost(raw.clone()));
        } else if host_part.is_empty() {
            if scheme != SchemeMatch::Exact("file".to_string()) {
                return Err(PatternError::EmptyHost(raw.clone()));
            }
            HostMatch::Exact(String::new())
        } else {
            HostMatch::Exact(normalize_host(&raw, host_part)?)
        };

        let path = compile_path(path_part).map_err(|source| PatternError::InvalidPath {
            pattern: raw.clone(),
            source,
        })?;

        Ok(Self {
            raw,
            matcher: Matcher::Parts { scheme, host, path },
        })
    }

    /// Returns true if `url` is selected by this pattern.
    /// URLs that don't parse never match.
    pub fn matches(&self, url: &str) -> bool {
        let parsed = match Url::parse(url) {
            Ok(u) => u,
            Err(_) => return false,
        };

        match &self.matcher {
            Matcher::AllUrls => KNOWN_SCHEMES.contains(&parsed.scheme()),
            Matcher::Parts { scheme, host, path } => {
                let scheme_ok = match scheme {
                    SchemeMatch::Web => matches!(parsed.scheme(), "http" | "https"),
                    SchemeMatch::Exact(s) => parsed.scheme() == s,
                };
                if !scheme_ok {
                    return false;
                }

                let url_host = parsed.host_str().unwrap_or("").to_lowercase();
                let host_ok = match host {
                    HostMatch::Any => true,
                    HostMatch::Suffix(suffix) => {
                        url_host == *suffix || url_host.ends_with(&format!(".{}", suffix))
                    }
                    HostMatch::Exact(h) => url_host == *h,
                };
                if !host_ok {
                    return false;
                }

                let mut full_path = parsed.path().to_string();
                if let Some(query) = parsed.query() {
                    full_path.push('?');
                    full_path.push_str(query);
                }
                path.is_match(Path::new(&full_path))
            }
        }
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for MatchPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Bring a pattern host into the form `Url::host_str` reports: lowercase,
/// punycode for non-ASCII labels, brackets kept on IPv6 literals.
fn normalize_host(pattern: &str, host: &str) -> Result<String, PatternError> {
    if host.contains('@') || host.contains('/') {
        return Err(PatternError::InvalidHost(pattern.to_string()));
    }
    let port_suffix = match host.strip_prefix('[') {
        Some(v6) => v6.split_once(']').map_or("", |(_, rest)| rest),
        None => host,
    };
    if port_suffix.contains(':') {
        return Err(PatternError::PortNotAllowed(pattern.to_string()));
    }

    let parsed = Url::parse(&format!("http://{}/", host))
        .map_err(|_| PatternError::InvalidHost(pattern.to_string()))?;
    match parsed.host_str() {
        Some(h) if !h.is_empty() => Ok(h.to_string()),
        _ => Err(PatternError::InvalidHost(pattern.to_string())),
    }
}

/// Compile a match-pattern path into a glob where only `*` is special.
fn compile_path(path: &str) -> Result<GlobMatcher, globset::Error> {
    let escaped: Vec<String> = path.split('*').map(globset::escape).collect();
    let glob = GlobBuilder::new(&escaped.join("*"))
        .literal_separator(false)
        .backslash_escape(true)
        .build()?;
    Ok(glob.compile_matcher())
}

/// A set of patterns; matches when any member matches.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<MatchPattern>,
}

impl PatternSet {
    /// Compile a list of pattern strings. Fails on the first bad pattern.
    pub fn new(patterns: &[String]) -> Result<Self, PatternError> {
        let compiled = patterns
            .iter()
            .map(|p| MatchPattern::parse(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns: compiled })
    }

    pub fn matches(&self, url: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(url))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn pattern_strings(&self) -> Vec<&str> {
        self.patterns.iter().map(|p| p.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_wildcard() {
        let p = MatchPattern::parse("http://*/*").unwrap();
        assert!(p.matches("http://example.com/path"));
        assert!(p.matches("http://example.com"));
        assert!(p.matches("http://localhost:3000/api?x=1"));
        assert!(!p.matches("https://example.com/path"));
        assert!(!p.matches("ftp://example.com/file"));
        assert!(!p.matches("example.com"));
    }

    #[test]
    fn test_any_web_scheme() {
        let p = MatchPattern::parse("*://*/*").unwrap();
        assert!(p.matches("http://a.example/"));
        assert!(p.matches("https://a.example/"));
        assert!(!p.matches("ws://a.example/"));
    }

    #[test]
    fn test_subdomain_host() {
        let p = MatchPattern::parse("https://*.example.org/*").unwrap();
        assert!(p.matches("https://example.org/"));
        assert!(p.matches("https://secure.example.org/a/b"));
        assert!(p.matches("https://deep.secure.example.org/"));
        assert!(!p.matches("https://badexample.org/"));
    }

    #[test]
    fn test_path_glob() {
        let p = MatchPattern::parse("http://example.com/api/*").unwrap();
        assert!(p.matches("http://example.com/api/v1/users"));
        assert!(!p.matches("http://example.com/static/app.js"));

        // Glob metacharacters other than * are literal
        let p = MatchPattern::parse("http://example.com/[a]?").unwrap();
        assert!(p.matches("http://example.com/[a]?"));
        assert!(!p.matches("http://example.com/a"));
    }

    #[test]
    fn test_all_urls() {
        let p = MatchPattern::parse("<all_urls>").unwrap();
        assert!(p.matches("http://example.com/"));
        assert!(p.matches("wss://example.com/socket"));
        assert!(!p.matches("data:text/plain,hi"));
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(matches!(
            MatchPattern::parse("example.com/*"),
            Err(PatternError::MissingSeparator(_))
        ));
        assert!(matches!(
            MatchPattern::parse("gopher://*/*"),
            Err(PatternError::UnsupportedScheme { .. })
        ));
        assert!(matches!(
            MatchPattern::parse("http://ex*mple.com/*"),
            Err(PatternError::InvalidHost(_))
        ));
        assert!(matches!(
            MatchPattern::parse("http://*"),
            Err(PatternError::MissingPath(_))
        ));
        assert!(matches!(
            MatchPattern::parse("http:///*"),
            Err(PatternError::EmptyHost(_))
        ));
    }

    #[test]
    fn test_host_with_port_rejected() {
        assert!(matches!(
            MatchPattern::parse("http://localhost:3000/*"),
            Err(PatternError::PortNotAllowed(_))
        ));
        assert!(matches!(
            MatchPattern::parse("http://*.example.com:8080/*"),
            Err(PatternError::PortNotAllowed(_))
        ));
        assert!(matches!(
            MatchPattern::parse("http://[::1]:8080/*"),
            Err(PatternError::PortNotAllowed(_))
        ));

        // A portless pattern still selects requests on any port
        let p = MatchPattern::parse("http://localhost/*").unwrap();
        assert!(p.matches("http://localhost:3000/api"));
    }

    #[test]
    fn test_host_normalized_like_urls() {
        let p = MatchPattern::parse("http://ümlaut.example/*").unwrap();
        assert!(p.matches("http://ümlaut.example/x"));

        let p = MatchPattern::parse("https://*.BÜCHER.example/*").unwrap();
        assert!(p.matches("https://shop.bücher.example/"));

        let p = MatchPattern::parse("http://[::1]/*").unwrap();
        assert!(p.matches("http://[::1]:8080/status"));

        assert!(matches!(
            MatchPattern::parse("http://user@example.com/*"),
            Err(PatternError::InvalidHost(_))
        ));
    }

    #[test]
    fn test_pattern_set() {
        let set = PatternSet::new(&["http://*/*".to_string(), "ws://*/*".to_string()]).unwrap();
        assert!(set.matches("http://example.com/"));
        assert!(set.matches("ws://example.com/chat"));
        assert!(!set.matches("https://example.com/"));
        assert_eq!(set.pattern_strings(), vec!["http://*/*", "ws://*/*"]);
    }
}
