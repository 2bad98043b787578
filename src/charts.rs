//! Chart view adapter.
//!
//! Three independent pure mappings from aggregator outputs to chart-ready
//! series. No stateful logic; the dashboard consumes these as JSON.

use serde::Serialize;

use crate::aggregate::{HourlyBucket, MagnitudeBand, MagnitudeBucket};
use crate::normalize::NormalizedEvent;

/// One bar of the strongest-events chart.
#[derive(Debug, Clone, Serialize)]
pub struct BarPoint {
    pub name: String,
    pub magnitude: f64,
}

/// One slice of the magnitude-distribution pie.
#[derive(Debug, Clone, Serialize)]
pub struct PieSlice {
    pub label: &'static str,
    pub count: usize,
    pub color: &'static str,
}

/// One point of the quakes-by-hour line.
#[derive(Debug, Clone, Serialize)]
pub struct LinePoint {
    pub hour: String,
    pub count: usize,
}

/// Bar series from a top-N ranking. Bar names use the leading place
/// segment so axis labels stay short.
#[must_use]
pub fn top_magnitude_bars(top: &[NormalizedEvent]) -> Vec<BarPoint> {
    top.iter()
        .map(|event| BarPoint {
            name: event.short_place().to_string(),
            magnitude: event.magnitude.unwrap_or(0.0),
        })
        .collect()
}

/// Pie series from the magnitude histogram, one fixed color per band index.
#[must_use]
pub fn magnitude_pie(buckets: &[MagnitudeBucket]) -> Vec<PieSlice> {
    buckets
        .iter()
        .zip(MagnitudeBand::ALL)
        .map(|(bucket, band)| PieSlice {
            label: bucket.label,
            count: bucket.count,
            color: band.chart_color(),
        })
        .collect()
}

/// Line series from the hourly histogram, ascending by hour, labeled
/// "H:00".
#[must_use]
pub fn hourly_line(hourly: &[HourlyBucket]) -> Vec<LinePoint> {
    let mut sorted: Vec<&HourlyBucket> = hourly.iter().collect();
    sorted.sort_by_key(|b| b.hour);

    sorted
        .into_iter()
        .map(|bucket| LinePoint {
            hour: format!("{}:00", bucket.hour),
            count: bucket.count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{bucket_by_magnitude, top_n};
    use chrono::{TimeZone, Utc};

    fn event(place: &str, mag: Option<f64>) -> NormalizedEvent {
        NormalizedEvent {
            id: place.to_string(),
            place: place.to_string(),
            magnitude: mag,
            latitude: 0.0,
            longitude: 0.0,
            occurred_at: Utc
                .with_ymd_and_hms(2026, 8, 1, 6, 0, 0)
                .single()
                .expect("valid test timestamp"),
        }
    }

    #[test]
    fn test_bar_series_uses_short_place() {
        let events = vec![event("10 km S of Sand Point, Alaska", Some(6.2))];
        let bars = top_magnitude_bars(&top_n(&events, 10));
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].name, "10 km S of Sand Point");
        assert!((bars[0].magnitude - 6.2).abs() < 1e-9);
    }

    #[test]
    fn test_pie_colors_fixed_per_band() {
        let events = vec![event("a", Some(2.0)), event("b", Some(7.5))];
        let pie = magnitude_pie(&bucket_by_magnitude(&events));
        assert_eq!(pie.len(), 5);
        assert_eq!(pie[0].color, "#22c55e");
        assert_eq!(pie[4].color, "#7c3aed");
        assert_eq!(pie[0].count, 1);
        assert_eq!(pie[4].count, 1);
    }

    #[test]
    fn test_line_sorted_ascending_with_labels() {
        let hourly = vec![
            HourlyBucket { hour: 14, count: 3 },
            HourlyBucket { hour: 2, count: 1 },
        ];
        let line = hourly_line(&hourly);
        assert_eq!(line[0].hour, "2:00");
        assert_eq!(line[0].count, 1);
        assert_eq!(line[1].hour, "14:00");
        assert_eq!(line[1].count, 3);
    }

    #[test]
    fn test_empty_inputs_yield_empty_series() {
        assert!(top_magnitude_bars(&[]).is_empty());
        assert!(hourly_line(&[]).is_empty());
        // Pie keeps the full legend even with nothing to count
        assert_eq!(magnitude_pie(&bucket_by_magnitude(&[])).len(), 5);
    }
}
