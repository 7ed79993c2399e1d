//! The request observer.
//!
//! `observe` is the pure part: derive a domain, ask the classifier, and
//! decide on the log line. `RequestObserver` wraps it with the side effects
//! (emitting the line, appending to the observation log) and exposes the
//! callback shape hosts expect from a blocking listener.
//!
//! The callback never returns a blocking response. The listener is
//! registered with blocking capability, but no redirect or cancel decision
//! is ever made here.

use crate::audit::{AuditLogger, LogEntry};
use crate::classifier::{AlwaysHttps, Classifier};
use crate::config::Config;
use crate::request::{
    extract_domain, BlockingResponse, DomainToken, ParseMode, RequestDescriptor, TargetError,
};
use anyhow::Result;
use chrono::Utc;
use std::sync::{Arc, Mutex};

use super::sink::LogSink;

/// What observing one request amounts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedEffect {
    pub domain: DomainToken,
    pub requires_https: bool,
    /// The line to emit, present only when the classifier said yes.
    pub message: Option<String>,
}

/// Format the observation line for a domain.
pub fn log_line(domain: &DomainToken) -> String {
    format!("Domain {} requires HTTPS", domain)
}

/// Observe one request without side effects.
///
/// In naive mode this never fails. In strict mode a URL the parser rejects
/// comes back as `TargetError`.
pub fn observe(
    details: &RequestDescriptor,
    classifier: &dyn Classifier,
    mode: ParseMode,
) -> Result<ObservedEffect, TargetError> {
    let domain = extract_domain(&details.url, mode)?;
    let requires_https = classifier.requires_https(domain.as_str());
    let message = requires_https.then(|| log_line(&domain));
    Ok(ObservedEffect {
        domain,
        requires_https,
        message,
    })
}

/// Observation log attached to an observer.
struct AuditTrail {
    logger: Mutex<AuditLogger>,
    session_id: String,
}

/// Observer with its side effects wired in. Cheap to share behind an `Arc`.
pub struct RequestObserver {
    classifier: Arc<dyn Classifier>,
    mode: ParseMode,
    sink: Arc<dyn LogSink>,
    audit: Option<AuditTrail>,
}

impl RequestObserver {
    pub fn new(classifier: Arc<dyn Classifier>, sink: Arc<dyn LogSink>) -> Self {
        Self {
            classifier,
            mode: ParseMode::default(),
            sink,
            audit: None,
        }
    }

    /// Build the observer a configuration describes: default classifier,
    /// configured parse mode, and an observation log for `session_id` when
    /// one is given and the log is enabled.
    pub fn from_config(
        config: &Config,
        sink: Arc<dyn LogSink>,
        session_id: Option<&str>,
    ) -> Result<Self> {
        let mut observer = Self::new(Arc::new(AlwaysHttps), sink).with_mode(config.parse_mode);

        if let Some(session_id) = session_id.filter(|_| config.audit.enabled) {
            let logger = match config.audit.dir {
                Some(ref dir) => AuditLogger::in_dir(dir, session_id)?,
                None => AuditLogger::new(session_id)?,
            };
            observer = observer.with_audit(logger, session_id);
        }

        Ok(observer)
    }

    pub fn with_mode(mut self, mode: ParseMode) -> Self {
        self.mode = mode;
        self
    }

    /// Record every observation to `logger` under `session_id`.
    pub fn with_audit(mut self, logger: AuditLogger, session_id: impl Into<String>) -> Self {
        self.audit = Some(AuditTrail {
            logger: Mutex::new(logger),
            session_id: session_id.into(),
        });
        self
    }

    pub fn mode(&self) -> ParseMode {
        self.mode
    }

    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    /// The listener callback. Always returns `None`.
    pub fn handle(&self, details: &RequestDescriptor) -> Option<BlockingResponse> {
        let _ = self.process(details);
        None
    }

    /// Observe `details`, emit the line if any, and record the outcome.
    pub fn process(&self, details: &RequestDescriptor) -> Result<ObservedEffect, TargetError> {
        let start = std::time::Instant::now();
        let result = observe(details, self.classifier.as_ref(), self.mode);
        let eval_us = start.elapsed().as_micros() as u64;

        match &result {
            Ok(effect) => {
                tracing::debug!(
                    url = %details.url,
                    domain = %effect.domain,
                    requires_https = effect.requires_https,
                    "observed request"
                );
                if let Some(ref line) = effect.message {
                    self.sink.emit(line);
                }
            }
            Err(e) => {
                tracing::warn!("Skipping request: {}", e);
            }
        }

        self.record(details, &result, eval_us);
        result
    }

    /// Append to the observation log (best-effort).
    fn record(
        &self,
        details: &RequestDescriptor,
        result: &Result<ObservedEffect, TargetError>,
        eval_us: u64,
    ) {
        let trail = match &self.audit {
            Some(t) => t,
            None => return,
        };

        let (domain, requires_https, message, error) = match result {
            Ok(effect) => (
                effect.domain.to_string(),
                effect.requires_https,
                effect.message.clone(),
                None,
            ),
            Err(e) => (String::new(), false, None, Some(e.to_string())),
        };

        let entry = LogEntry {
            timestamp: Utc::now(),
            session_id: trail.session_id.clone(),
            request_id: details.request_id.clone(),
            url: details.url.clone(),
            domain,
            requires_https,
            classifier: self.classifier.name().to_string(),
            parse_mode: self.mode,
            message,
            error,
            eval_duration_us: Some(eval_us),
        };

        let mut logger = match trail.logger.lock() {
            Ok(l) => l,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = logger.log(&entry) {
            tracing::warn!("Failed to write observation log: {:#}", e);
        }
    }
}
