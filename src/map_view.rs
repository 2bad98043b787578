//! Map view adapter.
//!
//! Projects normalized events into marker descriptors for the map
//! renderer. Selection/recenter behavior lives in the presentation layer;
//! this adapter only produces descriptors.

use serde::Serialize;

use crate::normalize::NormalizedEvent;

/// Minimum marker radius in pixels. Keeps small and null-magnitude events
/// visible.
pub const MIN_MARKER_RADIUS: f64 = 4.0;

/// Position, size, and text for one map marker.
#[derive(Debug, Clone, Serialize)]
pub struct MarkerDescriptor {
    pub latitude: f64,
    pub longitude: f64,
    pub radius: f64,
    pub label: String,
    pub popup_text: String,
}

/// Marker radius for a magnitude: `max(mag * 2, 4)`.
#[must_use]
pub fn marker_radius(magnitude: Option<f64>) -> f64 {
    magnitude.map_or(MIN_MARKER_RADIUS, |m| (m * 2.0).max(MIN_MARKER_RADIUS))
}

/// Build marker descriptors for every event, null magnitudes included.
#[must_use]
pub fn to_markers(events: &[NormalizedEvent]) -> Vec<MarkerDescriptor> {
    events.iter().map(to_marker).collect()
}

fn to_marker(event: &NormalizedEvent) -> MarkerDescriptor {
    let mag_text = event
        .magnitude
        .map_or_else(|| "?".to_string(), |m| format!("{m:.1}"));

    MarkerDescriptor {
        latitude: event.latitude,
        longitude: event.longitude,
        radius: marker_radius(event.magnitude),
        label: format!("M {mag_text} {}", event.place),
        popup_text: format!(
            "{}\nMagnitude: {mag_text}\n{} UTC",
            event.place,
            event.occurred_at.format("%Y-%m-%d %H:%M:%S")
        ),
    }
}
