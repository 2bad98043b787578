//! Data models for USGS earthquake feed responses.
//!
//! These structures match the GeoJSON summary feed format. Only the fields
//! the pipeline consumes are modeled; everything else in the feed is ignored
//! at the serde boundary. `mag` and `place` are optional by feed contract.

use serde::Deserialize;

use crate::errors::QuakeTrackerError;

/// Top-level GeoJSON response from USGS summary feeds.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureCollection {
    /// Always "FeatureCollection"
    #[serde(rename = "type")]
    pub type_: String,

    /// Feed metadata
    pub metadata: Metadata,

    /// Earthquake events
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// Validate the response envelope.
    pub fn validate(&self) -> Result<(), QuakeTrackerError> {
        if self.type_ != "FeatureCollection" {
            return Err(QuakeTrackerError::InvalidResponse(format!(
                "expected type 'FeatureCollection', got '{}'",
                self.type_
            )));
        }
        Ok(())
    }
}

/// Metadata about the feed response.
#[derive(Debug, Clone, Deserialize)]
pub struct Metadata {
    /// When this feed was generated (ms since epoch)
    pub generated: i64,

    /// Human-readable title
    pub title: String,

    /// Number of events in response
    pub count: usize,
}

/// A single earthquake event record, as the feed shapes it.
#[derive(Debug, Clone, Deserialize)]
pub struct Feature {
    /// Always "Feature"
    #[serde(rename = "type")]
    pub type_: String,

    /// Unique event ID within a feed snapshot
    pub id: String,

    /// Geographic location
    pub geometry: Geometry,

    /// Event properties
    pub properties: Properties,
}

/// Geographic geometry for an event.
///
/// Coordinate order in the source is `[longitude, latitude, depth_km]` —
/// the normalizer swaps to (lat, lon) for map consumption.
#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    /// Always "Point"
    #[serde(rename = "type")]
    pub type_: String,

    /// Coordinates: [longitude, latitude, depth_km]
    pub coordinates: Vec<f64>,
}

/// Event properties consumed by the pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct Properties {
    /// Magnitude value; null for some micro/provisional events
    pub mag: Option<f64>,

    /// Human-readable place description
    pub place: Option<String>,

    /// Event time (ms since epoch)
    pub time: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sample_feed() {
        let json = include_str!("../tools/sample_all_day.json");
        let feed: FeatureCollection =
            serde_json::from_str(json).expect("failed to parse sample feed");

        feed.validate().expect("invalid feed");
        assert_eq!(feed.type_, "FeatureCollection");
        assert_eq!(feed.features.len(), feed.metadata.count);
        assert!(feed.metadata.generated > 0);

        for feature in &feed.features {
            assert!(!feature.id.is_empty());
            assert_eq!(feature.geometry.type_, "Point");
        }
    }

    #[test]
    fn test_optional_fields_absent() {
        let json = r#"{
            "type": "Feature",
            "id": "us7000test",
            "geometry": {"type": "Point", "coordinates": [142.3, 38.2, 29.0]},
            "properties": {"mag": null, "place": null, "time": 1756200000000}
        }"#;
        let feature: Feature = serde_json::from_str(json).expect("failed to parse feature");
        assert!(feature.properties.mag.is_none());
        assert!(feature.properties.place.is_none());
    }

    #[test]
    fn test_unknown_fields_ignored() {
        // Real feed records carry dozens of extra properties
        let json = r#"{
            "type": "Feature",
            "id": "nc75000000",
            "geometry": {"type": "Point", "coordinates": [-122.4, 37.8, 10.0]},
            "properties": {"mag": 2.1, "place": "5 km NE of Somewhere, CA",
                           "time": 1756200000000, "updated": 1756200500000,
                           "tsunami": 0, "sig": 68, "net": "nc"}
        }"#;
        let feature: Feature = serde_json::from_str(json).expect("failed to parse feature");
        assert_eq!(feature.properties.mag, Some(2.1));
    }

    #[test]
    fn test_envelope_validation_rejects_wrong_type() {
        let json = r#"{
            "type": "NotACollection",
            "metadata": {"generated": 0, "title": "t", "count": 0},
            "features": []
        }"#;
        let feed: FeatureCollection = serde_json::from_str(json).expect("failed to parse");
        assert!(feed.validate().is_err());
    }
}
