//! USGS earthquake feed client.
//!
//! Provides blocking HTTP access to the summary GeoJSON feeds.
//! Uses reqwest with rustls for TLS. One outbound call per invocation;
//! no retry and no caching — the caller re-invokes on window change or
//! refresh interval.

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::{debug, instrument};

use crate::errors::QuakeTrackerError;
use crate::models::FeatureCollection;

/// Default request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// User agent string for feed requests.
const USER_AGENT: &str = concat!("quaketracker/", env!("CARGO_PKG_VERSION"));

/// USGS base URL for earthquake feeds.
const USGS_BASE_URL: &str = "https://earthquake.usgs.gov";

/// Time window a feed request covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedWindow {
    PastHour,
    PastDay,
    PastWeek,
    PastMonth,
}

impl FeedWindow {
    /// Get the URL path segment for this window.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PastHour => "all_hour",
            Self::PastDay => "all_day",
            Self::PastWeek => "all_week",
            Self::PastMonth => "all_month",
        }
    }

    /// Human-readable label, as shown in the window selector.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PastHour => "Past Hour",
            Self::PastDay => "Past Day",
            Self::PastWeek => "Past 7 Days",
            Self::PastMonth => "Past 30 Days",
        }
    }
}

impl std::str::FromStr for FeedWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hour" | "all_hour" => Ok(Self::PastHour),
            "day" | "all_day" => Ok(Self::PastDay),
            "week" | "all_week" => Ok(Self::PastWeek),
            "month" | "all_month" => Ok(Self::PastMonth),
            _ => Err(format!(
                "unknown feed window: {s} (expected: hour, day, week, month)"
            )),
        }
    }
}

/// Client for the USGS earthquake feed endpoint.
pub struct UsgsClient {
    client: Client,
    base_url: String,
}

impl UsgsClient {
    /// Create a new USGS client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new() -> Result<Self, QuakeTrackerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: USGS_BASE_URL.to_string(),
        })
    }

    /// Fetch the summary GeoJSON feed for a time window.
    ///
    /// # Errors
    ///
    /// Returns `Network`/`Api` on transport failure or non-2xx status,
    /// `Parse` on malformed JSON, `InvalidResponse` on a bad envelope.
    #[instrument(skip(self), fields(window = window.as_str()))]
    pub fn fetch_feed(&self, window: FeedWindow) -> Result<FeatureCollection, QuakeTrackerError> {
        let url = format!(
            "{}/earthquakes/feed/v1.0/summary/{}.geojson",
            self.base_url,
            window.as_str()
        );

        debug!("fetching feed from {}", url);

        let response = self.client.get(&url).send()?;

        // Check status before parsing
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(QuakeTrackerError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        // Parse via serde_json so malformed bodies surface as Parse errors
        let body = response.text()?;
        let feed: FeatureCollection = serde_json::from_str(&body)?;

        feed.validate()?;

        debug!("fetched {} events ({})", feed.features.len(), feed.metadata.title);
        Ok(feed)
    }
}
