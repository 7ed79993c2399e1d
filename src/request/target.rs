//! Strict URL parsing into a structured request target.

use thiserror::Error;
use url::Url;

/// The pieces of a request URL that matter for classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub scheme: String,
    /// Host without port or credentials. IPv6 hosts keep their brackets.
    pub host: String,
    /// Explicit port only; `None` when the URL relies on the scheme default.
    pub port: Option<u16>,
    pub path: String,
}

#[derive(Debug, Error)]
pub enum TargetError {
    #[error("malformed URL '{url}': {source}")]
    Malformed {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("URL '{url}' has no host")]
    MissingHost { url: String },
}

/// Parse `url` into a `Target`.
pub fn parse_target(url: &str) -> Result<Target, TargetError> {
    let parsed = Url::parse(url).map_err(|source| TargetError::Malformed {
        url: url.to_string(),
        source,
    })?;

    let host = match parsed.host_str() {
        Some(h) if !h.is_empty() => h.to_string(),
        _ => {
            return Err(TargetError::MissingHost {
                url: url.to_string(),
            })
        }
    };

    Ok(Target {
        scheme: parsed.scheme().to_string(),
        host,
        port: parsed.port(),
        path: parsed.path().to_string(),
    })
}
