//! httpswatch — request observer that flags domains requiring HTTPS.
//!
//! The library exposes the classifier, the request observer and its
//! registration glue, the host bridge and the observation log. The binary
//! entrypoints are `main.rs` (CLI) and `hook/main.rs` (one-shot host hook).

pub mod audit;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod gateway;
pub mod listener;
pub mod request;
