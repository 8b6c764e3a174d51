//! qmon - Live query monitoring tool for Presto-compatible coordinators

mod client;
mod display;
mod formatting;
mod models;
mod tui;

use std::io::{self, Write};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen},
};

use client::CoordinatorClient;
use models::{Config, QueryInfo};
use tui::app::filter::{query_matches, ErrorTypeFilter, StateFilter};
use tui::app::sort::sort_and_limit;
use tui::app::ViewCriteria;

#[derive(Parser)]
#[command(name = "qmon")]
#[command(about = "Live query monitoring tool for Presto-compatible coordinators", long_about = None)]
#[command(version)]
struct Cli {
    /// Coordinator base URL (overrides config file and QMON_SERVER)
    #[arg(short, long, value_name = "URL", global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List current queries once (or repeatedly with --watch)
    Queries {
        /// Include finished and failed queries, not just active/queued ones
        #[arg(short, long)]
        all: bool,

        /// Search term matched against user, source, query id, resource
        /// group, state, and query text
        #[arg(short = 'f', long, value_name = "TERM")]
        search: Option<String>,

        /// Maximum number of queries to show (0 = unlimited)
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,

        /// Watch mode: refresh every N seconds
        #[arg(short, long, value_name = "SECONDS", default_value = "0")]
        watch: f64,
    },

    /// Launch interactive TUI mode (default)
    #[command(alias = "ui")]
    Tui,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging();

    let (mut config, warnings) = Config::load();
    for warning in &warnings {
        eprintln!("Warning: {}", warning);
    }

    if let Some(server) = cli.server {
        config.server.url = server;
    }

    match cli.command {
        Some(Commands::Queries {
            all,
            search,
            limit,
            watch,
        }) => {
            let rt = tokio::runtime::Runtime::new()?;
            let client = CoordinatorClient::new(
                &config.server.url,
                Duration::from_millis(config.server.request_timeout_ms),
            )?;

            if watch > 0.0 {
                watch_loop(watch, || {
                    handle_queries_command(&rt, &client, all, search.as_deref(), limit)
                })?;
            } else {
                let output = handle_queries_command(&rt, &client, all, search.as_deref(), limit)?;
                println!("{}", output);
            }
        }
        Some(Commands::Tui) | None => {
            tui::run(config)?;
        }
    }

    Ok(())
}

/// Fetch one snapshot and render it through the same filter/sort engines the
/// TUI uses.
fn handle_queries_command(
    rt: &tokio::runtime::Runtime,
    client: &CoordinatorClient,
    all: bool,
    search: Option<&str>,
    limit: usize,
) -> Result<String> {
    let queries = rt
        .block_on(client.fetch_queries())
        .with_context(|| format!("fetching queries from {}", client.base_url()))?;

    let mut criteria = ViewCriteria {
        max_queries: limit,
        ..ViewCriteria::default()
    };
    if all {
        criteria.state_filters = StateFilter::ALL.to_vec();
        criteria.error_type_filters = ErrorTypeFilter::ALL.to_vec();
    }
    if let Some(term) = search {
        criteria.search = term.to_string();
    }

    let mut matched: Vec<QueryInfo> = queries
        .iter()
        .filter(|query| query_matches(query, &criteria))
        .cloned()
        .collect();
    sort_and_limit(
        &mut matched,
        criteria.sort_type,
        criteria.sort_order,
        criteria.max_queries,
    );

    Ok(display::render_queries_list(&matched, queries.len()))
}

/// Initialize file logging when QMON_LOG is set.
///
/// The TUI owns the terminal, so logs can only go to a file. RUST_LOG
/// controls the filter; the default captures qmon's own debug output.
fn init_logging() {
    let Ok(path) = std::env::var("QMON_LOG") else {
        return;
    };
    if path.is_empty() {
        return;
    }

    let file = match std::fs::OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Warning: could not open log file {}: {}", path, e);
            return;
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("qmon=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Arc::new(file))
        .with_ansi(false)
        .init();
}

/// Watch loop that repeatedly executes a command with flicker-free updates
fn watch_loop<F>(interval: f64, command: F) -> Result<()>
where
    F: Fn() -> Result<String>,
{
    // Set up Ctrl+C handler
    let running = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        r.store(false, std::sync::atomic::Ordering::SeqCst);
    })?;

    // Enter alternate screen buffer and hide cursor for clean display
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, Hide)?;

    let cleanup = || -> Result<()> {
        let mut stdout = io::stdout();
        execute!(stdout, Show, LeaveAlternateScreen)?;
        Ok(())
    };

    let result = (|| -> Result<()> {
        while running.load(std::sync::atomic::Ordering::SeqCst) {
            let now = chrono::Local::now();
            let timestamp = now.format("%Y-%m-%d %H:%M:%S");

            let output = match command() {
                Ok(s) => s,
                Err(e) => format!("Error: {}", e),
            };

            let screen_content = format!(
                "{}\n\nLast updated: {} | Refreshing every {}s | Press Ctrl+C to exit",
                output, timestamp, interval
            );

            // Write everything at once with synchronized update (DEC private mode)
            // so the terminal does not render a partially drawn frame
            write!(stdout, "\x1B[?2026h")?;
            write!(stdout, "\x1B[H{}\x1B[J", screen_content)?;
            write!(stdout, "\x1B[?2026l")?;
            stdout.flush()?;

            thread::sleep(Duration::from_secs_f64(interval));
        }
        Ok(())
    })();

    // Always clean up terminal state
    cleanup()?;

    println!("Watch mode stopped.");

    result
}
