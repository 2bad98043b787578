//! Summary statistics over normalized events.
//!
//! Pure functions: each refresh recomputes every aggregate from scratch,
//! nothing here holds state. Null-magnitude events count toward `total`
//! but are excluded from all magnitude math.

use chrono::Timelike;
use serde::Serialize;

use crate::normalize::NormalizedEvent;

/// Severity scale for magnitudes, shared by the histogram, the pie chart,
/// and terminal colorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagnitudeBand {
    /// mag < 3
    Minor,
    /// 3 <= mag < 5
    Light,
    /// 5 <= mag < 6
    Moderate,
    /// 6 <= mag < 7
    Strong,
    /// mag >= 7
    Major,
}

impl MagnitudeBand {
    /// All bands in ascending severity order. Bucket output and chart
    /// colors index into this.
    pub const ALL: [Self; 5] = [
        Self::Minor,
        Self::Light,
        Self::Moderate,
        Self::Strong,
        Self::Major,
    ];

    /// Classify a magnitude. Intervals are half-open: a value exactly on
    /// a boundary belongs to the higher band (3.0 is Light, 7.0 is Major).
    #[must_use]
    pub fn classify(mag: f64) -> Self {
        match mag {
            m if m >= 7.0 => Self::Major,
            m if m >= 6.0 => Self::Strong,
            m if m >= 5.0 => Self::Moderate,
            m if m >= 3.0 => Self::Light,
            _ => Self::Minor,
        }
    }

    /// Display label, matching the dashboard legend.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Minor => "Minor (<3)",
            Self::Light => "Light (3-4.9)",
            Self::Moderate => "Moderate (5-5.9)",
            Self::Strong => "Strong (6-6.9)",
            Self::Major => "Major (≥7)",
        }
    }

    /// Inclusive lower bound of the band.
    #[must_use]
    pub const fn lower_bound(self) -> f64 {
        match self {
            Self::Minor => f64::NEG_INFINITY,
            Self::Light => 3.0,
            Self::Moderate => 5.0,
            Self::Strong => 6.0,
            Self::Major => 7.0,
        }
    }

    /// Exclusive upper bound; `None` for the unbounded top band.
    #[must_use]
    pub const fn upper_bound(self) -> Option<f64> {
        match self {
            Self::Minor => Some(3.0),
            Self::Light => Some(5.0),
            Self::Moderate => Some(6.0),
            Self::Strong => Some(7.0),
            Self::Major => None,
        }
    }

    /// Fixed chart color per band.
    #[must_use]
    pub const fn chart_color(self) -> &'static str {
        match self {
            Self::Minor => "#22c55e",
            Self::Light => "#3b82f6",
            Self::Moderate => "#f59e0b",
            Self::Strong => "#ef4444",
            Self::Major => "#7c3aed",
        }
    }
}

/// Headline numbers for a feed snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryStats {
    /// Count of all normalized events, null-magnitude ones included
    pub total: usize,
    /// Mean of present magnitudes; 0 when none are present, never NaN
    pub average_magnitude: f64,
    /// Maximum of present magnitudes; 0 when none are present
    pub max_magnitude: f64,
}

impl SummaryStats {
    /// Stats for an empty snapshot.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            total: 0,
            average_magnitude: 0.0,
            max_magnitude: 0.0,
        }
    }
}

/// One band of the magnitude histogram.
#[derive(Debug, Clone, Serialize)]
pub struct MagnitudeBucket {
    pub label: &'static str,
    pub lower_bound: f64,
    pub upper_bound: Option<f64>,
    pub count: usize,
}

/// One hour of the hour-of-day histogram. Hours are UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HourlyBucket {
    /// Hour of day, 0-23
    pub hour: u32,
    pub count: usize,
}

/// Compute headline statistics for a snapshot.
#[must_use]
pub fn summarize(events: &[NormalizedEvent]) -> SummaryStats {
    let magnitudes: Vec<f64> = events.iter().filter_map(|e| e.magnitude).collect();

    if magnitudes.is_empty() {
        return SummaryStats {
            total: events.len(),
            average_magnitude: 0.0,
            max_magnitude: 0.0,
        };
    }

    let sum: f64 = magnitudes.iter().sum();
    let average = sum / magnitudes.len() as f64;
    let max = magnitudes.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    SummaryStats {
        total: events.len(),
        average_magnitude: average,
        max_magnitude: max,
    }
}

/// Strongest `n` events, descending by magnitude.
///
/// The sort is stable: equal magnitudes preserve feed order. Events without
/// a magnitude cannot be ranked and are skipped.
#[must_use]
pub fn top_n(events: &[NormalizedEvent], n: usize) -> Vec<NormalizedEvent> {
    let mut ranked: Vec<NormalizedEvent> = events
        .iter()
        .filter(|e| e.magnitude.is_some())
        .cloned()
        .collect();

    ranked.sort_by(|a, b| {
        b.magnitude
            .partial_cmp(&a.magnitude)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(n);
    ranked
}

/// Partition magnitude-present events into the five fixed bands.
///
/// Always returns all five buckets in ascending severity order, zero counts
/// included, so the pie chart legend stays stable on sparse feeds.
#[must_use]
pub fn bucket_by_magnitude(events: &[NormalizedEvent]) -> Vec<MagnitudeBucket> {
    let mut counts = [0usize; MagnitudeBand::ALL.len()];
    for event in events {
        if let Some(mag) = event.magnitude {
            let idx = MagnitudeBand::ALL
                .iter()
                .position(|b| *b == MagnitudeBand::classify(mag))
                .unwrap_or(0);
            counts[idx] += 1;
        }
    }

    MagnitudeBand::ALL
        .iter()
        .zip(counts)
        .map(|(band, count)| MagnitudeBucket {
            label: band.label(),
            lower_bound: band.lower_bound(),
            upper_bound: band.upper_bound(),
            count,
        })
        .collect()
}

/// Group events by UTC hour of day.
///
/// Sparse representation: hours with no events are omitted. Output is
/// sorted ascending by hour.
#[must_use]
pub fn bucket_by_hour(events: &[NormalizedEvent]) -> Vec<HourlyBucket> {
    let mut counts = [0usize; 24];
    for event in events {
        let hour = event.occurred_at.hour() as usize;
        if hour < 24 {
            counts[hour] += 1;
        }
    }

    (0..24u32)
        .filter(|h| counts[*h as usize] > 0)
        .map(|hour| HourlyBucket {
            hour,
            count: counts[hour as usize],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn event(id: &str, mag: Option<f64>, hour: u32) -> NormalizedEvent {
        NormalizedEvent {
            id: id.to_string(),
            place: format!("near {id}"),
            magnitude: mag,
            latitude: 37.8,
            longitude: -122.4,
            occurred_at: Utc
                .with_ymd_and_hms(2026, 8, 1, hour, 15, 0)
                .single()
                .expect("valid test timestamp"),
        }
    }

    #[test]
    fn test_summarize_mixed_null_scenario() {
        // Feed scenario: [2.1, 5.6, null]
        let events = vec![
            event("a", Some(2.1), 3),
            event("b", Some(5.6), 4),
            event("c", None, 5),
        ];
        let stats = summarize(&events);
        assert_eq!(stats.total, 3);
        assert!((stats.average_magnitude - 3.85).abs() < 1e-9);
        assert!((stats.max_magnitude - 5.6).abs() < 1e-9);
    }

    #[test]
    fn test_summarize_empty_is_zero_not_nan() {
        let stats = summarize(&[]);
        assert_eq!(stats.total, 0);
        assert!(!stats.average_magnitude.is_nan());
        assert!((stats.average_magnitude).abs() < f64::EPSILON);
        assert!((stats.max_magnitude).abs() < f64::EPSILON);
    }

    #[test]
    fn test_summarize_all_null_magnitudes() {
        let events = vec![event("a", None, 1), event("b", None, 2)];
        let stats = summarize(&events);
        assert_eq!(stats.total, 2);
        assert!(!stats.average_magnitude.is_nan());
        assert!((stats.average_magnitude).abs() < f64::EPSILON);
    }

    #[test]
    fn test_max_at_least_average() {
        let events = vec![
            event("a", Some(1.2), 0),
            event("b", Some(4.7), 1),
            event("c", Some(-0.3), 2),
        ];
        let stats = summarize(&events);
        assert!(stats.max_magnitude >= stats.average_magnitude);
    }

    #[test]
    fn test_negative_magnitude_is_minor() {
        // Micro-events can have negative magnitudes
        assert_eq!(MagnitudeBand::classify(-0.5), MagnitudeBand::Minor);
    }

    #[test]
    fn test_band_boundaries_belong_to_higher_band() {
        assert_eq!(MagnitudeBand::classify(2.99), MagnitudeBand::Minor);
        assert_eq!(MagnitudeBand::classify(3.0), MagnitudeBand::Light);
        assert_eq!(MagnitudeBand::classify(5.0), MagnitudeBand::Moderate);
        assert_eq!(MagnitudeBand::classify(6.0), MagnitudeBand::Strong);
        assert_eq!(MagnitudeBand::classify(7.0), MagnitudeBand::Major);
    }

    #[test]
    fn test_buckets_partition_without_loss() {
        let events = vec![
            event("a", Some(2.1), 0),
            event("b", Some(3.0), 1),
            event("c", Some(5.5), 2),
            event("d", Some(6.9), 3),
            event("e", Some(7.4), 4),
            event("f", None, 5), // not magnitude math
        ];
        let buckets = bucket_by_magnitude(&events);
        assert_eq!(buckets.len(), 5);

        let counted: usize = buckets.iter().map(|b| b.count).sum();
        let with_magnitude = events.iter().filter(|e| e.magnitude.is_some()).count();
        assert_eq!(counted, with_magnitude);
    }

    #[test]
    fn test_buckets_mixed_null_scenario() {
        let events = vec![
            event("a", Some(2.1), 3),
            event("b", Some(5.6), 4),
            event("c", None, 5),
        ];
        let buckets = bucket_by_magnitude(&events);
        assert_eq!(buckets[0].count, 1); // Minor
        assert_eq!(buckets[1].count, 0); // Light
        assert_eq!(buckets[2].count, 1); // Moderate
        assert_eq!(buckets[3].count, 0); // Strong
        assert_eq!(buckets[4].count, 0); // Major
    }

    #[test]
    fn test_empty_feed_buckets_all_zero() {
        let buckets = bucket_by_magnitude(&[]);
        assert_eq!(buckets.len(), 5);
        assert!(buckets.iter().all(|b| b.count == 0));
        assert!(bucket_by_hour(&[]).is_empty());
    }

    #[test]
    fn test_top_n_bounded_sorted_and_stable() {
        let events = vec![
            event("first", Some(4.0), 0),
            event("second", Some(6.1), 1),
            event("third", Some(4.0), 2),
            event("fourth", None, 3),
            event("fifth", Some(1.0), 4),
        ];

        let top = top_n(&events, 10);
        assert!(top.len() <= 10);
        assert_eq!(top.len(), 4); // null magnitude excluded

        // Descending, and the 4.0 tie preserves input order
        assert_eq!(top[0].id, "second");
        assert_eq!(top[1].id, "first");
        assert_eq!(top[2].id, "third");
        assert_eq!(top[3].id, "fifth");

        let top2 = top_n(&events, 2);
        assert_eq!(top2.len(), 2);
        assert_eq!(top2[0].id, "second");
    }

    #[test]
    fn test_top_n_selects_only_existing_events() {
        let events = vec![event("a", Some(3.3), 0)];
        let top = top_n(&events, 5);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].id, "a");
    }

    #[test]
    fn test_hourly_buckets_sparse_and_sorted() {
        let events = vec![
            event("a", Some(1.0), 23),
            event("b", Some(1.0), 4),
            event("c", Some(1.0), 4),
            event("d", None, 0),
        ];
        let hourly = bucket_by_hour(&events);
        assert_eq!(
            hourly,
            vec![
                HourlyBucket { hour: 0, count: 1 },
                HourlyBucket { hour: 4, count: 2 },
                HourlyBucket { hour: 23, count: 1 },
            ]
        );
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let events = vec![
            event("a", Some(2.1), 3),
            event("b", Some(5.6), 4),
            event("c", None, 5),
        ];
        assert_eq!(summarize(&events), summarize(&events));
        assert_eq!(bucket_by_hour(&events), bucket_by_hour(&events));

        let first: Vec<usize> = bucket_by_magnitude(&events).iter().map(|b| b.count).collect();
        let second: Vec<usize> = bucket_by_magnitude(&events).iter().map(|b| b.count).collect();
        assert_eq!(first, second);
    }
}
