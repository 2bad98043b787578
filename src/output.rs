//! Terminal output for events and statistics.
//!
//! Supports human-readable (with colors), JSON, and NDJSON formats.

use std::io::{self, Write};

use serde::Serialize;

use crate::aggregate::{HourlyBucket, MagnitudeBand, MagnitudeBucket, SummaryStats};
use crate::client::FeedWindow;
use crate::normalize::NormalizedEvent;

// ANSI color codes
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

// Band colors, ascending severity
const WHITE: &str = "\x1b[97m";
const GREEN: &str = "\x1b[92m";
const CYAN: &str = "\x1b[96m";
const YELLOW: &str = "\x1b[93m";
const RED: &str = "\x1b[91m";

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Human-readable terminal output (default)
    #[default]
    Human,
    /// JSON array
    Json,
    /// Newline-delimited JSON (one object per line)
    Ndjson,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            "ndjson" => Ok(Self::Ndjson),
            _ => Err(format!("unknown format: {s} (expected: human, json, ndjson)")),
        }
    }
}

/// Terminal color for a magnitude band.
const fn band_color(band: MagnitudeBand) -> &'static str {
    match band {
        MagnitudeBand::Minor => WHITE,
        MagnitudeBand::Light => GREEN,
        MagnitudeBand::Moderate => CYAN,
        MagnitudeBand::Strong => YELLOW,
        MagnitudeBand::Major => RED,
    }
}

/// Short severity word for the human event line.
const fn band_word(band: MagnitudeBand) -> &'static str {
    match band {
        MagnitudeBand::Minor => "MINOR",
        MagnitudeBand::Light => "LIGHT",
        MagnitudeBand::Moderate => "MODERATE",
        MagnitudeBand::Strong => "STRONG",
        MagnitudeBand::Major => "MAJOR",
    }
}

/// Write events in human-readable format, color-coded by magnitude band.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_human<W: Write>(writer: &mut W, events: &[NormalizedEvent]) -> io::Result<()> {
    for event in events {
        let time = event.occurred_at.format("%Y-%m-%d %H:%M:%S");

        let (mag_str, color, word) = match event.magnitude {
            Some(m) => {
                let band = MagnitudeBand::classify(m);
                (format!("{m:.1}"), band_color(band), band_word(band))
            }
            None => ("?".to_string(), WHITE, "UNRATED"),
        };

        writeln!(
            writer,
            "{color}{BOLD}M{mag_str}{RESET} │ \
             {color}{word:8}{RESET} │ \
             {time} UTC │ \
             {DIM}{:>7.2}°, {:>8.2}°{RESET} │ \
             {}",
            event.latitude, event.longitude, event.place
        )?;
    }
    Ok(())
}

/// Write events as a JSON array.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json<W: Write>(writer: &mut W, events: &[NormalizedEvent]) -> io::Result<()> {
    let json = serde_json::to_string_pretty(events)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{json}")
}

/// Write events as newline-delimited JSON.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_ndjson<W: Write>(writer: &mut W, events: &[NormalizedEvent]) -> io::Result<()> {
    for event in events {
        let json = serde_json::to_string(event)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        writeln!(writer, "{json}")?;
    }
    Ok(())
}

/// Write events in the specified format.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_events<W: Write>(
    writer: &mut W,
    events: &[NormalizedEvent],
    format: Format,
) -> io::Result<()> {
    match format {
        Format::Human => write_human(writer, events),
        Format::Json => write_json(writer, events),
        Format::Ndjson => write_ndjson(writer, events),
    }
}

/// Full statistics report for one window, as printed by `stats` and
/// served by the JSON API.
#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    pub window: FeedWindow,
    pub stats: SummaryStats,
    pub magnitude_buckets: Vec<MagnitudeBucket>,
    pub hourly: Vec<HourlyBucket>,
    pub top: Vec<NormalizedEvent>,
}

/// Write a statistics report in the specified format. NDJSON is not
/// meaningful for a single report and falls back to compact JSON.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_stats<W: Write>(writer: &mut W, report: &StatsReport, format: Format) -> io::Result<()> {
    match format {
        Format::Human => write_stats_human(writer, report),
        Format::Json => {
            let json = serde_json::to_string_pretty(report)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            writeln!(writer, "{json}")
        }
        Format::Ndjson => {
            let json = serde_json::to_string(report)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            writeln!(writer, "{json}")
        }
    }
}

fn write_stats_human<W: Write>(writer: &mut W, report: &StatsReport) -> io::Result<()> {
    writeln!(
        writer,
        "{BOLD}Earthquake statistics: {}{RESET}",
        report.window.label()
    )?;
    writeln!(
        writer,
        "  total {BOLD}{}{RESET} │ avg magnitude {BOLD}{:.2}{RESET} │ strongest {BOLD}{:.1}{RESET}",
        report.stats.total, report.stats.average_magnitude, report.stats.max_magnitude
    )?;

    writeln!(writer, "\n{BOLD}By magnitude{RESET}")?;
    let band_max = report
        .magnitude_buckets
        .iter()
        .map(|b| b.count)
        .max()
        .unwrap_or(0);
    for (bucket, band) in report.magnitude_buckets.iter().zip(MagnitudeBand::ALL) {
        let bar = proportional_bar(bucket.count, band_max, 30);
        writeln!(
            writer,
            "  {}{:16}{RESET} {:>5}  {DIM}{bar}{RESET}",
            band_color(band),
            bucket.label,
            bucket.count
        )?;
    }

    if !report.hourly.is_empty() {
        writeln!(writer, "\n{BOLD}By hour (UTC){RESET}")?;
        let hour_max = report.hourly.iter().map(|b| b.count).max().unwrap_or(0);
        for bucket in &report.hourly {
            let bar = proportional_bar(bucket.count, hour_max, 30);
            writeln!(
                writer,
                "  {:>2}:00 {:>5}  {DIM}{bar}{RESET}",
                bucket.hour, bucket.count
            )?;
        }
    }

    if !report.top.is_empty() {
        writeln!(writer, "\n{BOLD}Strongest events{RESET}")?;
        write_human(writer, &report.top)?;
    }

    Ok(())
}

/// Bar of `width` cells scaled to `count / max`; at least one cell for a
/// nonzero count.
fn proportional_bar(count: usize, max: usize, width: usize) -> String {
    if count == 0 || max == 0 {
        return String::new();
    }
    let cells = (count * width).div_ceil(max).clamp(1, width);
    "█".repeat(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn event(mag: Option<f64>) -> NormalizedEvent {
        NormalizedEvent {
            id: "nc1".to_string(),
            place: "near Parkfield, CA".to_string(),
            magnitude: mag,
            latitude: 35.9,
            longitude: -120.4,
            occurred_at: Utc
                .with_ymd_and_hms(2026, 8, 1, 7, 45, 0)
                .single()
                .expect("valid test timestamp"),
        }
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("human".parse::<Format>().unwrap(), Format::Human);
        assert_eq!("json".parse::<Format>().unwrap(), Format::Json);
        assert_eq!("ndjson".parse::<Format>().unwrap(), Format::Ndjson);
        assert!("invalid".parse::<Format>().is_err());
    }

    #[test]
    fn test_ndjson_one_line_per_event() {
        let mut buf = Vec::new();
        write_ndjson(&mut buf, &[event(Some(2.1)), event(None)]).expect("write failed");
        let text = String::from_utf8(buf).expect("utf8");
        assert_eq!(text.lines().count(), 2);
        assert!(text.lines().next().expect("line").contains("\"magnitude\":2.1"));
    }

    #[test]
    fn test_human_handles_null_magnitude() {
        let mut buf = Vec::new();
        write_human(&mut buf, &[event(None)]).expect("write failed");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.contains("M?"));
        assert!(text.contains("UNRATED"));
    }

    #[test]
    fn test_proportional_bar_bounds() {
        assert_eq!(proportional_bar(0, 10, 30), "");
        assert_eq!(proportional_bar(10, 10, 30).chars().count(), 30);
        // Small nonzero counts still render one cell
        assert_eq!(proportional_bar(1, 1000, 30).chars().count(), 1);
    }
}
