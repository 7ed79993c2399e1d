//! httpswatch — flags plain-HTTP requests to domains that require HTTPS.
//!
//! Quick start:
//!   httpswatch observe http://example.com/   # prints: Domain example.com requires HTTPS
//!   httpswatch serve                         # run the host bridge
//!   httpswatch log                           # see what was observed
//!
//! For more info: httpswatch --help

use clap::{Parser, Subcommand};
use colored::Colorize;
use httpswatch::classifier::{AlwaysHttps, Classifier};
use httpswatch::cli;
use httpswatch::config::{parser, Config};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "httpswatch",
    version,
    about = "Flag plain-HTTP requests to domains that require HTTPS",
    long_about = "httpswatch observes intercepted requests, works out which domain\n\
                  each one targets, and logs the ones whose domain requires HTTPS.\n\n\
                  Quick start:\n  \
                  httpswatch observe <URL>...   # observe URLs directly\n  \
                  httpswatch serve              # accept requests from a host bridge\n  \
                  httpswatch log                # see what was observed"
)]
struct Cli {
    /// Config file (default: nearest .httpswatch.yaml, else built-in defaults)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Observe URLs (arguments, or one per stdin line)
    Observe {
        /// URLs to observe. Reads stdin when omitted.
        urls: Vec<String>,

        /// Parse URLs strictly, rejecting malformed ones
        #[arg(long)]
        strict: bool,

        /// Don't write to the observation log
        #[arg(long)]
        no_log: bool,
    },

    /// Ask the classifier about a domain
    Classify {
        domain: String,
    },

    /// Accept requests from a host over a Unix socket
    Serve {
        #[arg(
            short,
            long,
            env = "HTTPSWATCH_SOCKET",
            default_value = "/tmp/httpswatch.sock"
        )]
        socket: PathBuf,
    },

    /// See what was observed
    Log {
        #[arg(short, long, help = "Session ID to view")]
        session: Option<String>,

        #[arg(short, long, help = "Only entries whose domain contains this")]
        domain: Option<String>,

        #[arg(long, help = "Only requests classified as requiring HTTPS")]
        flagged: bool,

        #[arg(long, help = "Only URLs that failed to parse")]
        malformed: bool,

        #[arg(short, long, help = "Max entries to show (most recent)")]
        limit: Option<usize>,

        #[arg(long, help = "Show only the session summary")]
        summary: bool,

        #[arg(long, help = "List all recorded sessions")]
        list: bool,
    },

    /// Validate a config file
    Check {
        #[arg(default_value = ".httpswatch.yaml")]
        path: PathBuf,
    },

    /// Write a starter config file
    Init {
        #[arg(short, long, default_value = "default")]
        template: String,
        #[arg(short, long)]
        output: Option<String>,
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // The bridge reports through tracing; everything else stays quiet
    // unless RUST_LOG says otherwise.
    let default_directive = match cli.command {
        Some(Commands::Serve { .. }) => "httpswatch=info",
        _ => "httpswatch=warn",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive)),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let result = run(cli).await;

    if let Err(e) = result {
        eprintln!();
        eprintln!("  {} {}", "✗".red().bold(), e);
        for cause in e.chain().skip(1) {
            eprintln!("  {} {}", "caused by:".dimmed(), cause);
        }
        eprintln!();
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        None => {
            let (config, path) = cli::resolve_config(cli.config.as_deref())?;
            show_status(&config, path.as_deref())
        }

        Some(Commands::Observe {
            urls,
            strict,
            no_log,
        }) => {
            let (config, _) = cli::resolve_config(cli.config.as_deref())?;
            cli::observe::run_observe(
                config,
                cli::observe::ObserveOptions {
                    urls,
                    strict,
                    no_log,
                },
            )?;
            Ok(())
        }

        Some(Commands::Classify { domain }) => {
            let classifier = AlwaysHttps;
            let verdict = if classifier.requires_https(&domain) {
                "requires HTTPS".yellow()
            } else {
                "does not require HTTPS".green()
            };
            println!("{} {} ({})", domain, verdict, classifier.name().dimmed());
            Ok(())
        }

        Some(Commands::Serve { socket }) => {
            let (config, _) = cli::resolve_config(cli.config.as_deref())?;
            cli::serve::run_serve(config, socket).await
        }

        Some(Commands::Log {
            session,
            domain,
            flagged,
            malformed,
            limit,
            summary,
            list,
        }) => {
            let (config, _) = cli::resolve_config(cli.config.as_deref())?;
            if list {
                cli::log::run_log_list(&config)
            } else {
                cli::log::run_log(
                    &config,
                    cli::log::LogOptions {
                        session: session.as_deref(),
                        domain: domain.as_deref(),
                        flagged,
                        malformed,
                        limit,
                        summary,
                    },
                )
            }
        }

        Some(Commands::Check { path }) => run_check(&path),

        Some(Commands::Init {
            template,
            output,
            force,
        }) => {
            cli::init::run_init(&template, output.as_deref(), force)?;
            Ok(())
        }
    }
}

/// No subcommand: show which config is active and the last session.
fn show_status(config: &Config, path: Option<&Path>) -> anyhow::Result<()> {
    println!();
    println!("  {}", "httpswatch".bold());
    println!("  {}", "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".dimmed());
    println!();
    println!("  Config: {} ({})", config.name.cyan(), config.describe());
    match path {
        Some(p) => println!("  File:   {}", p.display().to_string().dimmed()),
        None => println!("  File:   {}", "none (built-in defaults)".dimmed()),
    }

    if let Ok(reader) = cli::reader_for(config) {
        if let Ok(entries) = reader.read_latest_session() {
            if !entries.is_empty() {
                let summary = httpswatch::audit::AuditReader::summarize(&entries);
                println!();
                println!("  Last session: {}", summary.one_line());
            }
        }
    }

    println!();
    println!("  {}", "Commands:".dimmed());
    println!("    {}   observe URLs", "httpswatch observe".bold());
    println!("    {}     run the host bridge", "httpswatch serve".bold());
    println!("    {}       see what was observed", "httpswatch log".bold());
    println!("    {}      write a starter config", "httpswatch init".bold());
    println!();

    Ok(())
}

/// Run the `httpswatch check` command.
fn run_check(path: &Path) -> anyhow::Result<()> {
    let config = parser::parse_config_file(path)?;

    println!();
    println!("  {} Config is valid!", "✓".green().bold());
    println!("  Name:    {}", config.name.cyan());
    if let Some(ref description) = config.description {
        println!("  About:   {}", description);
    }
    println!("  Mode:    {}", config.parse_mode);
    println!("  Filters: {}", config.urls.join(", "));
    if let Some(ref types) = config.types {
        println!("  Types:   {}", types.join(", "));
    }
    println!("  Blocking registration: {}", config.blocking);
    println!(
        "  Observation log: {}",
        if config.audit.enabled { "on" } else { "off" }
    );
    if config.blocking {
        println!();
        println!(
            "  {} The listener registers as blocking but never returns a decision.",
            "ℹ".blue()
        );
    }
    println!();

    Ok(())
}
