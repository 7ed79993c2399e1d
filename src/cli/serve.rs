//! `httpswatch serve` — run the host bridge.

use crate::config::Config;
use crate::gateway::GatewayServer;
use crate::listener::{register, EventBus, RequestObserver, TracingSink};
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

/// Run the bridge until interrupted.
pub async fn run_serve(config: Config, socket_path: PathBuf) -> Result<()> {
    let session_id = uuid::Uuid::new_v4().to_string();
    let observer = RequestObserver::from_config(&config, Arc::new(TracingSink), Some(&session_id))
        .context("Failed to set up request observer")?;

    let mut bus = EventBus::new();
    register(&mut bus, Arc::new(observer), &config)?;

    let server = GatewayServer::new(&socket_path, bus);

    println!();
    println!(
        "  {} Bridge listening on {}",
        "●".green(),
        socket_path.display().to_string().cyan()
    );
    println!("  Session: {}", session_id.dimmed());
    println!("  Config:  {}", config.describe().dimmed());
    println!();

    tokio::select! {
        result = server.run() => result,
        _ = tokio::signal::ctrl_c() => {
            let _ = std::fs::remove_file(&socket_path);
            println!();
            println!("  {} Bridge stopped.", "■".dimmed());
            Ok(())
        }
    }
}
