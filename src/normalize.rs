//! Event normalization boundary.
//!
//! Maps raw feed records into the internal, fully-typed event shape.
//! Everything downstream (aggregation, map markers, chart series) operates
//! on `NormalizedEvent` only, never on the raw feed structures.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use tracing::warn;

use crate::models::{Feature, FeatureCollection};

/// Place label used when the feed omits one.
pub const UNKNOWN_PLACE: &str = "Unknown";

/// One seismic event in internal form.
///
/// `magnitude` stays optional: null-magnitude records are retained (they
/// count toward totals and appear on the map) but are excluded from all
/// magnitude math.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedEvent {
    pub id: String,
    pub place: String,
    pub magnitude: Option<f64>,
    pub latitude: f64,
    pub longitude: f64,
    pub occurred_at: DateTime<Utc>,
}

impl NormalizedEvent {
    /// Leading segment of the place description, before the first comma.
    ///
    /// "5 km NE of Ridgecrest, CA" -> "5 km NE of Ridgecrest"
    #[must_use]
    pub fn short_place(&self) -> &str {
        self.place.split(',').next().unwrap_or(&self.place).trim()
    }
}

/// Convert a feed response into normalized events.
///
/// Records that cannot be represented are dropped with a warning rather
/// than failing the whole refresh: fewer than 2 coordinates, latitude or
/// longitude out of range, or a timestamp outside the representable range.
#[must_use]
pub fn normalize(feed: &FeatureCollection) -> Vec<NormalizedEvent> {
    feed.features.iter().filter_map(normalize_one).collect()
}

fn normalize_one(feature: &Feature) -> Option<NormalizedEvent> {
    let coords = &feature.geometry.coordinates;
    if coords.len() < 2 {
        warn!(
            "dropping event {}: expected at least 2 coordinates, got {}",
            feature.id,
            coords.len()
        );
        return None;
    }

    // Source order is [lon, lat, depth?]; swap to (lat, lon) here and
    // nowhere else.
    let longitude = coords[0];
    let latitude = coords[1];

    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        warn!(
            "dropping event {}: coordinates ({latitude}, {longitude}) out of range",
            feature.id
        );
        return None;
    }

    let Some(occurred_at) = Utc.timestamp_millis_opt(feature.properties.time).single() else {
        warn!(
            "dropping event {}: unrepresentable timestamp {}",
            feature.id, feature.properties.time
        );
        return None;
    };

    Some(NormalizedEvent {
        id: feature.id.clone(),
        place: feature
            .properties
            .place
            .clone()
            .unwrap_or_else(|| UNKNOWN_PLACE.to_string()),
        magnitude: feature.properties.mag,
        latitude,
        longitude,
        occurred_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Geometry, Metadata, Properties};

    fn feature(id: &str, mag: Option<f64>, place: Option<&str>, coords: Vec<f64>) -> Feature {
        Feature {
            type_: "Feature".to_string(),
            id: id.to_string(),
            geometry: Geometry {
                type_: "Point".to_string(),
                coordinates: coords,
            },
            properties: Properties {
                mag,
                place: place.map(String::from),
                time: 1_756_200_000_000,
            },
        }
    }

    fn collection(features: Vec<Feature>) -> FeatureCollection {
        FeatureCollection {
            type_: "FeatureCollection".to_string(),
            metadata: Metadata {
                generated: 1_756_200_000_000,
                title: "USGS All Earthquakes, Past Day".to_string(),
                count: features.len(),
            },
            features,
        }
    }

    #[test]
    fn test_coordinate_swap() {
        // Source is [lon, lat, depth]: -122.4 is the longitude
        let feed = collection(vec![feature(
            "nc1",
            Some(2.1),
            Some("near SF"),
            vec![-122.4, 37.8, 10.0],
        )]);
        let events = normalize(&feed);
        assert_eq!(events.len(), 1);
        assert!((events[0].latitude - 37.8).abs() < f64::EPSILON);
        assert!((events[0].longitude - (-122.4)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_place_defaults_to_unknown() {
        let feed = collection(vec![feature("us1", Some(4.2), None, vec![142.3, 38.2, 29.0])]);
        let events = normalize(&feed);
        assert_eq!(events[0].place, UNKNOWN_PLACE);
    }

    #[test]
    fn test_null_magnitude_retained() {
        let feed = collection(vec![feature("ak1", None, Some("Alaska"), vec![-150.0, 61.0])]);
        let events = normalize(&feed);
        assert_eq!(events.len(), 1);
        assert!(events[0].magnitude.is_none());
    }

    #[test]
    fn test_bad_coordinates_dropped() {
        let feed = collection(vec![
            feature("bad1", Some(3.0), Some("short"), vec![10.0]),
            feature("bad2", Some(3.0), Some("polar"), vec![0.0, 95.0]),
            feature("ok", Some(3.0), Some("fine"), vec![0.0, 45.0]),
        ]);
        let events = normalize(&feed);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "ok");
    }

    #[test]
    fn test_short_place() {
        let feed = collection(vec![feature(
            "nc2",
            Some(1.5),
            Some("5 km NE of Ridgecrest, CA"),
            vec![-117.6, 35.7, 8.0],
        )]);
        let events = normalize(&feed);
        assert_eq!(events[0].short_place(), "5 km NE of Ridgecrest");
    }
}
