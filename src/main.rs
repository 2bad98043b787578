//! QuakeTracker - live earthquake map and statistics from USGS feeds.
//!
//! A single-binary reimagining of the classic feed-map-chart dashboard:
//! fetch a USGS summary window, normalize it, aggregate it, and project it
//! onto a terminal or a web dashboard.

use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;

mod aggregate;
mod charts;
mod cli;
mod client;
mod errors;
mod map_view;
mod models;
mod normalize;
mod output;
mod server;
mod store;

use cli::{Cli, Command};
use client::UsgsClient;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Command::Events(args) => cmd_events(args),
        Command::Stats(args) => cmd_stats(args),
        Command::Serve(args) => cmd_serve(args),
    }
}

/// Initialize tracing subscriber.
fn init_tracing(verbose: bool, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Execute the `events` command - one-shot fetch of recent earthquakes.
fn cmd_events(args: cli::EventsArgs) -> Result<()> {
    let client = UsgsClient::new().context("failed to create USGS client")?;

    let feed = client
        .fetch_feed(args.window)
        .context("failed to fetch earthquake feed")?;

    let mut events = normalize::normalize(&feed);

    // Most recent first, bounded
    events.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
    events.truncate(args.limit);

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    output::write_events(&mut handle, &events, args.format)?;

    Ok(())
}

/// Execute the `stats` command - fetch, aggregate, and print a report.
fn cmd_stats(args: cli::StatsArgs) -> Result<()> {
    let client = UsgsClient::new().context("failed to create USGS client")?;

    let feed = client
        .fetch_feed(args.window)
        .context("failed to fetch earthquake feed")?;

    let events = normalize::normalize(&feed);

    let report = output::StatsReport {
        window: args.window,
        stats: aggregate::summarize(&events),
        magnitude_buckets: aggregate::bucket_by_magnitude(&events),
        hourly: aggregate::bucket_by_hour(&events),
        top: aggregate::top_n(&events, args.top),
    };

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    output::write_stats(&mut handle, &report, args.format)?;

    Ok(())
}

/// Execute the `serve` command - start the web dashboard.
fn cmd_serve(args: cli::ServeArgs) -> Result<()> {
    let poll_interval = args.poll_interval.max(30);
    if poll_interval != args.poll_interval {
        tracing::warn!("poll interval clamped to minimum of 30 seconds");
    }

    let config = server::ServerConfig {
        port: args.port,
        host: args.host.clone(),
        window: args.window,
        poll_interval,
    };

    let url = format!("http://{}:{}", args.host, args.port);
    println!("\x1b[1m⛰️ QuakeTracker Dashboard\x1b[0m");
    println!("\x1b[2m───────────────────────────────────────\x1b[0m");
    println!("  Local:   \x1b[96m{url}\x1b[0m");
    println!("  Window:  {}", args.window.label());
    println!("  Poll:    {poll_interval}s");
    println!("\x1b[2m───────────────────────────────────────\x1b[0m");
    println!("\x1b[2mPress Ctrl+C to stop\x1b[0m\n");

    // Open browser if requested (using xdg-open/open command)
    if args.open {
        #[cfg(target_os = "linux")]
        let _ = std::process::Command::new("xdg-open").arg(&url).spawn();
        #[cfg(target_os = "macos")]
        let _ = std::process::Command::new("open").arg(&url).spawn();
        #[cfg(target_os = "windows")]
        let _ = std::process::Command::new("cmd").args(["/c", "start", &url]).spawn();
    }

    // Run the async server on tokio runtime
    tokio::runtime::Runtime::new()
        .context("failed to create tokio runtime")?
        .block_on(server::run_server(config))
}
