//! `httpswatch observe` — run URLs through the request observer.
//!
//! URLs come from the command line, or one per stdin line when none are
//! given. A stdin line may also be a JSON request descriptor. Requests the
//! configured filters don't select are skipped, exactly as the host would
//! never deliver them.

use crate::config::Config;
use crate::listener::{register, EventBus, RequestObserver, StdoutSink};
use crate::request::{ParseMode, RequestDescriptor};
use anyhow::{Context, Result};
use std::io::BufRead;
use std::sync::Arc;

pub struct ObserveOptions {
    pub urls: Vec<String>,
    pub strict: bool,
    /// Skip the observation log for this run
    pub no_log: bool,
}

/// Counts for one `observe` run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ObserveStats {
    pub delivered: usize,
    pub skipped: usize,
}

/// Run the `httpswatch observe` command.
pub fn run_observe(mut config: Config, options: ObserveOptions) -> Result<ObserveStats> {
    if options.strict {
        config.parse_mode = ParseMode::Strict;
    }

    let session_id = uuid::Uuid::new_v4().to_string();
    let session = (!options.no_log).then_some(session_id.as_str());
    let observer = RequestObserver::from_config(&config, Arc::new(StdoutSink), session)
        .context("Failed to set up request observer")?;

    let mut bus = EventBus::new();
    register(&mut bus, Arc::new(observer), &config)?;

    let mut stats = ObserveStats::default();
    if options.urls.is_empty() {
        let stdin = std::io::stdin();
        for (i, line) in stdin.lock().lines().enumerate() {
            let line = line.context("Failed to read stdin")?;
            if line.trim().is_empty() {
                continue;
            }
            let details = RequestDescriptor::from_line(&line)
                .with_context(|| format!("Invalid request descriptor on line {}", i + 1))?;
            deliver(&bus, &details, &mut stats);
        }
    } else {
        for url in &options.urls {
            deliver(&bus, &RequestDescriptor::new(url.as_str()), &mut stats);
        }
    }

    tracing::debug!(
        "observe finished: {} delivered, {} skipped (session {})",
        stats.delivered,
        stats.skipped,
        session_id
    );
    Ok(stats)
}

fn deliver(bus: &EventBus, details: &RequestDescriptor, stats: &mut ObserveStats) {
    let outcome = bus.dispatch(details);
    if outcome.invoked == 0 {
        tracing::debug!("{} is outside the configured filters", details.url);
        stats.skipped += 1;
    } else {
        stats.delivered += 1;
    }
}
