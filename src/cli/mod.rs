//! Subcommand implementations for the `httpswatch` binary.

pub mod init;
pub mod log;
pub mod observe;
pub mod serve;

use crate::audit::AuditReader;
use crate::config::{parser, Config};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Load the configuration a command should run with: an explicit path if
/// given, otherwise the nearest `.httpswatch.yaml`, otherwise the defaults.
pub fn resolve_config(explicit: Option<&Path>) -> Result<(Config, Option<PathBuf>)> {
    match explicit {
        Some(path) => {
            let config = parser::parse_config_file(path)?;
            Ok((config, Some(path.to_path_buf())))
        }
        None => {
            let cwd = std::env::current_dir().context("Failed to get current directory")?;
            parser::load_config(&cwd)
        }
    }
}

/// Reader over the log directory `config` writes to.
pub fn reader_for(config: &Config) -> Result<AuditReader> {
    match config.audit.dir {
        Some(ref dir) => Ok(AuditReader::with_dir(dir)),
        None => AuditReader::new(),
    }
}
