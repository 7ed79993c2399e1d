//! Domain classifier — decides whether a domain requires HTTPS.
//!
//! The classifier is deliberately a trait with a single constant
//! implementation. The observer only ever sees `&dyn Classifier`, so a
//! real policy can replace `AlwaysHttps` without touching the observer.

/// Decides whether traffic to a domain should be treated as requiring
/// secure transport.
///
/// The domain is passed through exactly as the observer derived it: it may
/// be empty, carry a port, or be outright garbage.
pub trait Classifier: Send + Sync {
    /// Returns true when requests to `domain` must use HTTPS.
    fn requires_https(&self, domain: &str) -> bool;

    /// Stable identifier recorded in the observation log.
    fn name(&self) -> &str;
}

/// The current classifier: every domain requires HTTPS.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysHttps;

impl Classifier for AlwaysHttps {
    fn requires_https(&self, _domain: &str) -> bool {
        true
    }

    fn name(&self) -> &str {
        "always-https"
    }
}

/// Classify a domain with the default classifier.
pub fn requires_https(domain: &str) -> bool {
    AlwaysHttps.requires_https(domain)
}
