//! `httpswatch log` — browse the observation log.

use crate::audit::{AuditReader, LogFilter};
use crate::config::Config;
use anyhow::{Context, Result};
use colored::Colorize;

pub struct LogOptions<'a> {
    pub session: Option<&'a str>,
    pub domain: Option<&'a str>,
    pub flagged: bool,
    pub malformed: bool,
    pub limit: Option<usize>,
    pub summary: bool,
}

/// Run the `httpswatch log` command.
pub fn run_log(config: &Config, options: LogOptions<'_>) -> Result<()> {
    let reader = super::reader_for(config).context("Failed to initialize log reader")?;

    let entries = if let Some(sid) = options.session {
        reader
            .read_session(sid)
            .with_context(|| format!("Failed to read session: {}", sid))?
    } else {
        let entries = reader.read_latest_session()?;
        if entries.is_empty() {
            println!();
            println!("  {} No observation logs found.", "ℹ".blue());
            println!("  Observe some requests first:");
            println!("    {}", "httpswatch observe http://example.com/".dimmed());
            println!();
            return Ok(());
        }
        entries
    };

    let summary = AuditReader::summarize(&entries);

    if options.summary {
        println!();
        println!("  Session: {}", summary.session_id.cyan());
        println!();
        println!(
            "  {} requests | {} flagged | {} malformed | {} domains",
            summary.total_requests.to_string().bold(),
            summary.flagged.to_string().yellow().bold(),
            summary.malformed.to_string().red().bold(),
            summary.unique_domains.to_string().bold(),
        );
        if let (Some(start), Some(end)) = (summary.start_time, summary.end_time) {
            println!("  Duration: {}", format_duration((end - start).num_seconds()));
        }
        println!();
        return Ok(());
    }

    let filter = LogFilter {
        domain: options.domain.map(str::to_string),
        flagged_only: options.flagged,
        malformed_only: options.malformed,
        limit: options.limit,
    };
    let filtered = AuditReader::filter_entries(&entries, &filter);

    println!();
    println!("  Session: {}", summary.session_id.cyan());
    println!();
    for entry in &filtered {
        println!("  {}", AuditReader::format_entry(entry));
    }
    println!();
    println!(
        "  {} {}",
        "─".repeat(40).dimmed(),
        summary.one_line().dimmed()
    );
    println!();

    Ok(())
}

/// List available sessions.
pub fn run_log_list(config: &Config) -> Result<()> {
    let reader = super::reader_for(config)?;
    let sessions = reader.list_sessions()?;

    if sessions.is_empty() {
        println!();
        println!("  {} No sessions found in {}", "ℹ".blue(), reader.log_dir().display());
        println!();
        return Ok(());
    }

    println!();
    println!("  Available sessions:");
    println!();
    for session in &sessions {
        println!("  • {}", session);
    }
    println!();
    println!("  View a session: {}", "httpswatch log --session <id>".dimmed());
    println!();

    Ok(())
}

fn format_duration(seconds: i64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(42), "42s");
        assert_eq!(format_duration(125), "2m 5s");
        assert_eq!(format_duration(7260), "2h 1m");
    }
}
