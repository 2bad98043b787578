//! Command-line interface definitions.
//!
//! Uses clap derive API for argument parsing.

use clap::{Parser, Subcommand};

use crate::client::FeedWindow;
use crate::output::Format;

/// Live earthquake map and statistics from USGS feeds.
#[derive(Parser, Debug)]
#[command(name = "quaketracker")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose debug logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    pub quiet: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List recent earthquakes (one-shot fetch and exit)
    Events(EventsArgs),

    /// Print summary statistics for a feed window
    Stats(StatsArgs),

    /// Start the web dashboard (map, stats, about)
    Serve(ServeArgs),
}

/// Arguments for the `events` command.
#[derive(Parser, Debug)]
pub struct EventsArgs {
    /// Feed window: hour, day, week, month
    #[arg(long, default_value = "day", value_parser = parse_window)]
    pub window: FeedWindow,

    /// Maximum number of events to show
    #[arg(long, short = 'n', default_value = "50")]
    pub limit: usize,

    /// Output format
    #[arg(long, short = 'f', default_value = "human", value_parser = parse_format)]
    pub format: Format,
}

/// Arguments for the `stats` command.
#[derive(Parser, Debug)]
pub struct StatsArgs {
    /// Feed window: hour, day, week, month
    #[arg(long, default_value = "day", value_parser = parse_window)]
    pub window: FeedWindow,

    /// How many of the strongest events to rank
    #[arg(long, default_value = "10")]
    pub top: usize,

    /// Output format
    #[arg(long, short = 'f', default_value = "human", value_parser = parse_format)]
    pub format: Format,
}

/// Arguments for the `serve` command.
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, short = 'p', default_value = "8080")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Initial feed window: hour, day, week, month
    #[arg(long, default_value = "day", value_parser = parse_window)]
    pub window: FeedWindow,

    /// Poll interval in seconds (minimum 30)
    #[arg(long, default_value = "60")]
    pub poll_interval: u64,

    /// Open browser automatically
    #[arg(long)]
    pub open: bool,
}

/// Parse a feed window from string.
fn parse_window(s: &str) -> Result<FeedWindow, String> {
    s.parse()
}

/// Parse an output format from string.
fn parse_format(s: &str) -> Result<Format, String> {
    s.parse()
}
