//! httpswatch-hook — one-shot request hook.
//!
//! The host runs this once per intercepted request with the request
//! descriptor as JSON on stdin:
//! {
//!   "requestId": "4711",
//!   "url": "http://example.com/index.html",
//!   "method": "GET",
//!   "type": "main_frame"
//! }
//!
//! The observation line goes to stderr. Stdout stays empty: the hook never
//! hands the host a blocking decision. Every path exits 0, so a broken
//! config or a bad descriptor never holds up the request.

use httpswatch::config::parser;
use httpswatch::listener::{register, EventBus, RequestObserver, StderrSink};
use httpswatch::request::RequestDescriptor;
use std::io::Read;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("httpswatch=warn")),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let mut input = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut input) {
        eprintln!("[httpswatch] Failed to read stdin: {}", e);
        process::exit(0);
    }

    let details: RequestDescriptor = match serde_json::from_str(input.trim()) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("[httpswatch] Failed to parse request descriptor: {}", e);
            process::exit(0);
        }
    };

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let config = match parser::load_config(&cwd) {
        Ok((config, _)) => config,
        Err(e) => {
            eprintln!("[httpswatch] Failed to load config: {:#}", e);
            process::exit(0);
        }
    };

    let session_id =
        std::env::var("HTTPSWATCH_SESSION").unwrap_or_else(|_| "httpswatch-hook".to_string());

    // Observation log is best-effort: fall back to no log rather than exit
    let observer = RequestObserver::from_config(&config, Arc::new(StderrSink), Some(&session_id))
        .or_else(|e| {
            tracing::warn!("Observation log unavailable: {:#}", e);
            RequestObserver::from_config(&config, Arc::new(StderrSink), None)
        });
    let observer = match observer {
        Ok(o) => o,
        Err(e) => {
            eprintln!("[httpswatch] Failed to set up observer: {:#}", e);
            process::exit(0);
        }
    };

    let mut bus = EventBus::new();
    if let Err(e) = register(&mut bus, Arc::new(observer), &config) {
        eprintln!("[httpswatch] Failed to register observer: {:#}", e);
        process::exit(0);
    }

    let outcome = bus.dispatch(&details);
    if outcome.invoked == 0 {
        tracing::debug!("{} is outside the configured filters", details.url);
    }

    process::exit(0);
}
