//! View-state store.
//!
//! Holds the current feed snapshot behind an immutable-replacement rule:
//! each refresh builds a whole new `Snapshot` and swaps it in. Refreshes
//! are ordered by a monotonically increasing sequence token, so a slow
//! fetch that completes after a faster window switch is discarded instead
//! of overwriting newer data.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use crate::aggregate::{self, HourlyBucket, MagnitudeBucket, SummaryStats};
use crate::client::FeedWindow;
use crate::normalize::NormalizedEvent;

/// One immutable view of the feed: the normalized events plus every
/// aggregate derived from them.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub window: FeedWindow,
    pub refreshed_at: Option<DateTime<Utc>>,
    pub events: Vec<NormalizedEvent>,
    pub stats: SummaryStats,
    pub magnitude_buckets: Vec<MagnitudeBucket>,
    pub hourly: Vec<HourlyBucket>,
}

impl Snapshot {
    /// Empty snapshot shown before the first successful refresh.
    #[must_use]
    pub fn empty(window: FeedWindow) -> Self {
        Self {
            window,
            refreshed_at: None,
            events: Vec::new(),
            stats: SummaryStats::empty(),
            magnitude_buckets: aggregate::bucket_by_magnitude(&[]),
            hourly: Vec::new(),
        }
    }

    /// Build a snapshot from normalized events, computing all aggregates.
    #[must_use]
    pub fn build(window: FeedWindow, refreshed_at: DateTime<Utc>, events: Vec<NormalizedEvent>) -> Self {
        let stats = aggregate::summarize(&events);
        let magnitude_buckets = aggregate::bucket_by_magnitude(&events);
        let hourly = aggregate::bucket_by_hour(&events);
        Self {
            window,
            refreshed_at: Some(refreshed_at),
            events,
            stats,
            magnitude_buckets,
            hourly,
        }
    }
}

/// Token identifying one refresh attempt. Only the latest token may
/// commit its snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshToken(u64);

/// Shared store for the current snapshot and selected window.
#[derive(Debug)]
pub struct ViewStore {
    current: RwLock<Arc<Snapshot>>,
    selected_window: RwLock<FeedWindow>,
    seq: AtomicU64,
}

impl ViewStore {
    /// Create a store holding an empty snapshot for `window`.
    #[must_use]
    pub fn new(window: FeedWindow) -> Self {
        Self {
            current: RwLock::new(Arc::new(Snapshot::empty(window))),
            selected_window: RwLock::new(window),
            seq: AtomicU64::new(0),
        }
    }

    /// The snapshot being displayed right now.
    #[must_use]
    pub fn current(&self) -> Arc<Snapshot> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// The window the user has selected (which may be newer than the
    /// window of the displayed snapshot while a fetch is in flight).
    #[must_use]
    pub fn selected_window(&self) -> FeedWindow {
        match self.selected_window.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Start a refresh for `window`: records the selection and returns a
    /// token that supersedes every earlier one.
    pub fn begin_refresh(&self, window: FeedWindow) -> RefreshToken {
        match self.selected_window.write() {
            Ok(mut guard) => *guard = window,
            Err(poisoned) => *poisoned.into_inner() = window,
        }
        RefreshToken(self.seq.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Install a snapshot if its token is still the latest.
    ///
    /// Returns `false` (and leaves the current snapshot in place) when a
    /// newer refresh has started since `token` was issued.
    pub fn commit(&self, token: RefreshToken, snapshot: Snapshot) -> bool {
        if token.0 != self.seq.load(Ordering::SeqCst) {
            return false;
        }
        match self.current.write() {
            Ok(mut guard) => *guard = Arc::new(snapshot),
            Err(poisoned) => *poisoned.into_inner() = Arc::new(snapshot),
        }
        true
    }
}
