//! Web server for the QuakeTracker dashboard.
//!
//! Provides the three navigable views over the feed pipeline:
//! - Axum for HTTP server
//! - Leaflet + OpenStreetMap tiles for the live map
//! - Chart.js for the statistics dashboard
//! - SSE (Server-Sent Events) to tell open pages a fresh snapshot landed
//!
//! All HTML is embedded for single-binary deployment.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{
        Html, IntoResponse,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{get, post},
};
use chrono::Utc;
use serde::Serialize;
use tokio::sync::broadcast;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

use crate::aggregate::{self, SummaryStats};
use crate::charts::{BarPoint, LinePoint, PieSlice, hourly_line, magnitude_pie, top_magnitude_bars};
use crate::client::{FeedWindow, UsgsClient};
use crate::errors::QuakeTrackerError;
use crate::map_view::{MarkerDescriptor, to_markers};
use crate::normalize::{self, NormalizedEvent};
use crate::store::{Snapshot, ViewStore};

/// Sidebar event list bound.
const LIST_LIMIT: usize = 50;

/// How many of the strongest events the bar chart ranks.
const TOP_N: usize = 10;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub window: FeedWindow,
    pub poll_interval: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            window: FeedWindow::PastDay,
            poll_interval: 60,
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Current snapshot plus the refresh supersede rule
    store: Arc<ViewStore>,
    /// Channel notifying SSE clients of fresh snapshots
    tx: broadcast::Sender<String>,
}

/// JSON projection of a snapshot: everything the pages render.
#[derive(Debug, Serialize)]
pub struct SnapshotView {
    pub window: &'static str,
    pub window_label: &'static str,
    pub refreshed_at: Option<String>,
    pub stats: SummaryStats,
    pub markers: Vec<MarkerDescriptor>,
    pub events: Vec<NormalizedEvent>,
    pub top_bars: Vec<BarPoint>,
    pub magnitude_pie: Vec<PieSlice>,
    pub hourly_line: Vec<LinePoint>,
}

/// Project a snapshot into its JSON view. Pure: calls only the view
/// adapters over the snapshot's normalized events.
#[must_use]
pub fn project(snapshot: &Snapshot) -> SnapshotView {
    let mut recent = snapshot.events.clone();
    recent.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
    recent.truncate(LIST_LIMIT);

    let top = aggregate::top_n(&snapshot.events, TOP_N);

    SnapshotView {
        window: snapshot.window.as_str(),
        window_label: snapshot.window.label(),
        refreshed_at: snapshot.refreshed_at.map(|t| t.to_rfc3339()),
        stats: snapshot.stats,
        markers: to_markers(&snapshot.events),
        events: recent,
        top_bars: top_magnitude_bars(&top),
        magnitude_pie: magnitude_pie(&snapshot.magnitude_buckets),
        hourly_line: hourly_line(&snapshot.hourly),
    }
}

/// Run one full refresh cycle: fetch, normalize, aggregate, commit.
///
/// Returns `Ok(false)` when the snapshot was superseded by a newer refresh
/// before it could land.
///
/// # Errors
///
/// Propagates fetch/parse failures; the store keeps the prior snapshot.
pub fn refresh_snapshot(
    client: &UsgsClient,
    store: &ViewStore,
    window: FeedWindow,
) -> Result<bool, QuakeTrackerError> {
    let token = store.begin_refresh(window);
    let feed = client.fetch_feed(window)?;
    let events = normalize::normalize(&feed);
    let snapshot = Snapshot::build(window, Utc::now(), events);
    Ok(store.commit(token, snapshot))
}

/// Create the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(map_page_handler))
        .route("/stats", get(stats_page_handler))
        .route("/about", get(about_page_handler))
        .route("/api/snapshot", get(snapshot_handler))
        .route("/api/window/{window}", post(window_handler))
        .route("/stream", get(sse_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Start the web server.
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let (tx, _rx) = broadcast::channel::<String>(100);
    let store = Arc::new(ViewStore::new(config.window));

    let state = AppState {
        store: Arc::clone(&store),
        tx: tx.clone(),
    };

    // Background polling task
    let poll_state = state.clone();
    let poll_interval = config.poll_interval;
    tokio::spawn(async move {
        poll_feed(poll_state, poll_interval).await;
    });

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("QuakeTracker dashboard starting at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Background task that re-fetches the selected window on an interval.
async fn poll_feed(state: AppState, poll_interval: u64) {
    let client = match UsgsClient::new() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("failed to create USGS client: {}", e);
            return;
        }
    };

    loop {
        let window = state.store.selected_window();

        match refresh_snapshot(&client, &state.store, window) {
            Ok(true) => {
                let _ = state.tx.send(window.as_str().to_string());
            }
            Ok(false) => {
                tracing::debug!("poll refresh superseded by a newer request");
            }
            Err(e) => {
                // Terminal for this cycle only: prior snapshot stays up
                tracing::warn!("feed refresh failed, keeping prior snapshot: {}", e);
            }
        }

        tokio::time::sleep(Duration::from_secs(poll_interval)).await;
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Live map view.
async fn map_page_handler() -> Html<&'static str> {
    Html(MAP_HTML)
}

/// Statistics dashboard view.
async fn stats_page_handler() -> Html<&'static str> {
    Html(STATS_HTML)
}

/// About page.
async fn about_page_handler() -> Html<&'static str> {
    Html(ABOUT_HTML)
}

/// Current snapshot as JSON.
async fn snapshot_handler(State(state): State<AppState>) -> Json<SnapshotView> {
    Json(project(&state.store.current()))
}

/// Select a feed window and refresh through the store.
///
/// On fetch failure the prior snapshot stays current and the error is
/// surfaced as a non-blocking notice for the page to show.
async fn window_handler(
    State(state): State<AppState>,
    Path(window): Path<String>,
) -> Result<Json<SnapshotView>, (StatusCode, String)> {
    let window: FeedWindow = window
        .parse()
        .map_err(|e: String| (StatusCode::BAD_REQUEST, e))?;

    let client =
        UsgsClient::new().map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    match refresh_snapshot(&client, &state.store, window) {
        Ok(true) => {
            let _ = state.tx.send(window.as_str().to_string());
        }
        Ok(false) => {
            tracing::debug!("window refresh superseded by a newer request");
        }
        Err(e) => {
            tracing::warn!("window refresh failed, keeping prior snapshot: {}", e);
            return Err((StatusCode::BAD_GATEWAY, e.to_string()));
        }
    }

    Ok(Json(project(&state.store.current())))
}

/// SSE stream notifying pages of fresh snapshots.
async fn sse_handler(
    State(state): State<AppState>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let rx = state.tx.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(window) => Some(Ok(Event::default().event("refresh").data(window))),
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Health check endpoint.
async fn health_handler() -> impl IntoResponse {
    "OK"
}

// ============================================================================
// HTML Templates (embedded for single-binary deployment)
// ============================================================================

const MAP_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>QuakeTracker — Live Map</title>

    <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css" />
    <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>

    <style>
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
            background: #09090b; color: #fafafa;
            display: flex; flex-direction: column; height: 100vh;
        }
        .nav {
            display: flex; align-items: center; justify-content: space-between;
            padding: 0.6rem 1.25rem; background: #0f0f12;
            border-bottom: 1px solid #27272a;
        }
        .brand { font-weight: 600; font-size: 1.05rem; }
        .brand span { color: #ef4444; }
        .nav-links a {
            color: #a1a1aa; text-decoration: none; margin-left: 1rem;
            font-size: 0.875rem;
        }
        .nav-links a.active, .nav-links a:hover { color: #fafafa; }
        .windows { display: flex; gap: 0.4rem; padding: 0.5rem 1.25rem;
                   background: #0f0f12; border-bottom: 1px solid #27272a; }
        .windows button {
            padding: 0.35rem 0.8rem; border-radius: 6px; border: 1px solid #27272a;
            background: #18181b; color: #a1a1aa; font-size: 0.8rem; cursor: pointer;
        }
        .windows button.active { background: #2563eb; color: #fff; border-color: #2563eb; }
        .notice { color: #f59e0b; font-size: 0.8rem; padding: 0.35rem 0.5rem; display: none; }
        .content { display: flex; flex: 1; min-height: 0; }
        .sidebar {
            width: 320px; overflow-y: auto; background: #0f0f12;
            border-right: 1px solid #27272a; padding: 0.75rem;
        }
        .sidebar h2 { font-size: 0.95rem; color: #d4d4d8; margin-bottom: 0.6rem; }
        .quake {
            padding: 0.6rem 0.7rem; border-radius: 10px; background: #18181b;
            border: 1px solid #27272a; margin-bottom: 0.5rem; cursor: pointer;
        }
        .quake:hover { background: #27272a; }
        .quake .row { display: flex; justify-content: space-between; align-items: center; }
        .quake .place { font-size: 0.82rem; overflow: hidden; white-space: nowrap;
                        text-overflow: ellipsis; max-width: 210px; }
        .quake .time { font-size: 0.72rem; color: #71717a; margin-top: 0.2rem; }
        .mag { font-size: 0.72rem; font-weight: 700; padding: 0.15rem 0.4rem;
               border-radius: 5px; }
        .mag-low { background: rgba(34,197,94,0.8); }
        .mag-mid { background: rgba(234,179,8,0.8); }
        .mag-high { background: rgba(220,38,38,0.8); }
        #map { flex: 1; }
        .empty { color: #71717a; font-size: 0.8rem; padding: 1rem 0.25rem; }
    </style>
</head>
<body>
    <nav class="nav">
        <div class="brand">&#9968;&#65039; Quake<span>Tracker</span></div>
        <div class="nav-links">
            <a href="/" class="active">Home</a>
            <a href="/stats">Stats</a>
            <a href="/about">About</a>
        </div>
    </nav>

    <div class="windows" id="windows">
        <button data-window="all_hour">Past Hour</button>
        <button data-window="all_day">Past Day</button>
        <button data-window="all_week">Past 7 Days</button>
        <button data-window="all_month">Past 30 Days</button>
        <span class="notice" id="notice"></span>
    </div>

    <div class="content">
        <aside class="sidebar">
            <h2>Live Earthquakes</h2>
            <div id="quake-list"><div class="empty">Loading seismic data&hellip;</div></div>
        </aside>
        <div id="map"></div>
    </div>

    <script>
        const map = L.map('map').setView([20, 0], 2);
        L.tileLayer('https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png', {
            attribution: '&copy; OpenStreetMap contributors'
        }).addTo(map);
        const markerLayer = L.layerGroup().addTo(map);

        function magClass(mag) {
            if (mag === null) return 'mag-low';
            if (mag < 3) return 'mag-low';
            if (mag < 5) return 'mag-mid';
            return 'mag-high';
        }

        function recenter(lat, lon) { map.setView([lat, lon], 5); }

        function render(snap) {
            document.querySelectorAll('.windows button').forEach(btn => {
                btn.classList.toggle('active', btn.dataset.window === snap.window);
            });

            markerLayer.clearLayers();
            snap.markers.forEach(m => {
                const marker = L.circleMarker([m.latitude, m.longitude], {
                    radius: m.radius, color: 'red', fillOpacity: 0.8
                }).bindPopup(m.popup_text.replace(/\n/g, '<br>'));
                marker.on('click', () => recenter(m.latitude, m.longitude));
                markerLayer.addLayer(marker);
            });

            const list = document.getElementById('quake-list');
            list.innerHTML = '';
            if (snap.events.length === 0) {
                list.innerHTML = '<div class="empty">No earthquakes in this window</div>';
                return;
            }
            snap.events.forEach(eq => {
                const magText = eq.magnitude === null ? '?' : eq.magnitude.toFixed(1);
                const item = document.createElement('div');
                item.className = 'quake';
                item.innerHTML =
                    '<div class="row"><span class="place"></span>' +
                    '<span class="mag ' + magClass(eq.magnitude) + '">M ' + magText + '</span></div>' +
                    '<div class="time">' + new Date(eq.occurred_at).toLocaleString() + '</div>';
                item.querySelector('.place').textContent = eq.place;
                item.addEventListener('click', () => recenter(eq.latitude, eq.longitude));
                list.appendChild(item);
            });
        }

        async function load() {
            const res = await fetch('/api/snapshot');
            render(await res.json());
        }

        function showNotice(message) {
            const notice = document.getElementById('notice');
            notice.textContent = message;
            notice.style.display = 'inline';
            setTimeout(() => { notice.style.display = 'none'; }, 6000);
        }

        document.querySelectorAll('.windows button').forEach(btn => {
            btn.addEventListener('click', async () => {
                const res = await fetch('/api/window/' + btn.dataset.window, { method: 'POST' });
                if (res.ok) {
                    render(await res.json());
                } else {
                    showNotice('Refresh failed — showing previous data');
                }
            });
        });

        const es = new EventSource('/stream');
        es.addEventListener('refresh', load);

        load();
    </script>
</body>
</html>
"##;

const STATS_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>QuakeTracker — Statistics</title>

    <script src="https://unpkg.com/chart.js@4.4.1/dist/chart.umd.js"></script>

    <style>
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
            background: #09090b; color: #fafafa;
        }
        .nav {
            display: flex; align-items: center; justify-content: space-between;
            padding: 0.6rem 1.25rem; background: #0f0f12;
            border-bottom: 1px solid #27272a;
        }
        .brand { font-weight: 600; font-size: 1.05rem; }
        .brand span { color: #ef4444; }
        .nav-links a {
            color: #a1a1aa; text-decoration: none; margin-left: 1rem;
            font-size: 0.875rem;
        }
        .nav-links a.active, .nav-links a:hover { color: #fafafa; }
        .main { max-width: 1000px; margin: 0 auto; padding: 1.5rem; }
        .title { text-align: center; margin-bottom: 1.5rem; }
        .title h1 { font-size: 1.5rem; }
        .title p { color: #a1a1aa; font-size: 0.85rem; margin-top: 0.25rem; }
        .cards { display: grid; grid-template-columns: repeat(3, 1fr); gap: 1rem;
                 margin-bottom: 2rem; }
        .card {
            background: #18181b; border: 1px solid #27272a; border-radius: 14px;
            padding: 1rem; text-align: center;
        }
        .card h3 { color: #a1a1aa; font-size: 0.8rem; font-weight: 500; }
        .card p { font-size: 1.8rem; font-weight: 700; margin-top: 0.25rem; }
        .card .total { color: #34d399; }
        .card .avg { color: #60a5fa; }
        .card .max { color: #f87171; }
        .panel { margin-bottom: 2rem; }
        .panel h2 { font-size: 1.05rem; margin-bottom: 0.75rem; }
        .panel .chart-box { background: #18181b; border: 1px solid #27272a;
                            border-radius: 14px; padding: 1rem; height: 360px; }
        @media (max-width: 700px) { .cards { grid-template-columns: 1fr; } }
    </style>
</head>
<body>
    <nav class="nav">
        <div class="brand">&#9968;&#65039; Quake<span>Tracker</span></div>
        <div class="nav-links">
            <a href="/">Home</a>
            <a href="/stats" class="active">Stats</a>
            <a href="/about">About</a>
        </div>
    </nav>

    <main class="main">
        <div class="title">
            <h1>&#127757; Global Earthquake Statistics</h1>
            <p id="subtitle">Loading&hellip;</p>
        </div>

        <div class="cards">
            <div class="card"><h3>Total Quakes</h3><p class="total" id="total">–</p></div>
            <div class="card"><h3>Avg Magnitude</h3><p class="avg" id="avg">–</p></div>
            <div class="card"><h3>Strongest</h3><p class="max" id="max">–</p></div>
        </div>

        <div class="panel">
            <h2>Top 10 Strongest Quakes</h2>
            <div class="chart-box"><canvas id="bar-chart"></canvas></div>
        </div>

        <div class="panel">
            <h2>Magnitude Distribution</h2>
            <div class="chart-box"><canvas id="pie-chart"></canvas></div>
        </div>

        <div class="panel">
            <h2>Quakes by Hour (UTC)</h2>
            <div class="chart-box"><canvas id="line-chart"></canvas></div>
        </div>
    </main>

    <script>
        let barChart = null, pieChart = null, lineChart = null;

        function replaceChart(existing, ctx, config) {
            if (existing) existing.destroy();
            return new Chart(ctx, config);
        }

        function render(snap) {
            document.getElementById('subtitle').textContent =
                snap.window_label + (snap.refreshed_at
                    ? ' — refreshed ' + new Date(snap.refreshed_at).toLocaleTimeString()
                    : '');
            document.getElementById('total').textContent = snap.stats.total;
            document.getElementById('avg').textContent = snap.stats.average_magnitude.toFixed(2);
            document.getElementById('max').textContent = snap.stats.max_magnitude.toFixed(1);

            barChart = replaceChart(barChart, document.getElementById('bar-chart'), {
                type: 'bar',
                data: {
                    labels: snap.top_bars.map(b => b.name),
                    datasets: [{ label: 'Magnitude', backgroundColor: '#ef4444',
                                 data: snap.top_bars.map(b => b.magnitude) }]
                },
                options: { maintainAspectRatio: false }
            });

            pieChart = replaceChart(pieChart, document.getElementById('pie-chart'), {
                type: 'pie',
                data: {
                    labels: snap.magnitude_pie.map(s => s.label),
                    datasets: [{ backgroundColor: snap.magnitude_pie.map(s => s.color),
                                 data: snap.magnitude_pie.map(s => s.count) }]
                },
                options: { maintainAspectRatio: false }
            });

            lineChart = replaceChart(lineChart, document.getElementById('line-chart'), {
                type: 'line',
                data: {
                    labels: snap.hourly_line.map(p => p.hour),
                    datasets: [{ label: 'Quakes', borderColor: '#3b82f6',
                                 pointRadius: 4, data: snap.hourly_line.map(p => p.count) }]
                },
                options: { maintainAspectRatio: false }
            });
        }

        async function load() {
            const res = await fetch('/api/snapshot');
            render(await res.json());
        }

        const es = new EventSource('/stream');
        es.addEventListener('refresh', load);

        load();
    </script>
</body>
</html>
"##;

const ABOUT_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>QuakeTracker — About</title>

    <style>
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
            background: #09090b; color: #fafafa;
        }
        .nav {
            display: flex; align-items: center; justify-content: space-between;
            padding: 0.6rem 1.25rem; background: #0f0f12;
            border-bottom: 1px solid #27272a;
        }
        .brand { font-weight: 600; font-size: 1.05rem; }
        .brand span { color: #ef4444; }
        .nav-links a {
            color: #a1a1aa; text-decoration: none; margin-left: 1rem;
            font-size: 0.875rem;
        }
        .nav-links a.active, .nav-links a:hover { color: #fafafa; }
        .main { max-width: 760px; margin: 0 auto; padding: 1.5rem; }
        .main h1 { font-size: 1.4rem; margin-bottom: 0.75rem; }
        .main h1 span { color: #ef4444; }
        .main > p { color: #d4d4d8; line-height: 1.6; margin-bottom: 1.5rem; }
        .main a { color: #60a5fa; }
        .features { display: grid; grid-template-columns: repeat(2, 1fr); gap: 1rem; }
        .feature {
            background: #18181b; border: 1px solid #27272a; border-radius: 14px;
            padding: 1.1rem;
        }
        .feature h3 { font-size: 0.95rem; margin-bottom: 0.35rem; }
        .feature p { color: #a1a1aa; font-size: 0.82rem; line-height: 1.5; }
        @media (max-width: 600px) { .features { grid-template-columns: 1fr; } }
    </style>
</head>
<body>
    <nav class="nav">
        <div class="brand">&#9968;&#65039; Quake<span>Tracker</span></div>
        <div class="nav-links">
            <a href="/">Home</a>
            <a href="/stats">Stats</a>
            <a href="/about" class="active">About</a>
        </div>
    </nav>

    <main class="main">
        <h1>About <span>QuakeTracker</span></h1>
        <p>
            QuakeTracker is a real-time earthquake monitoring dashboard powered by the
            <a href="https://earthquake.usgs.gov/" target="_blank" rel="noreferrer">USGS
            Earthquake API</a>. It helps students, researchers, and curious minds
            understand how earthquakes occur across the globe through an interactive
            map and simple data visualizations.
        </p>

        <div class="features">
            <div class="feature">
                <h3>&#127757; Live Global Map</h3>
                <p>Track earthquakes as they happen worldwide, with detailed
                   location data and click-to-zoom markers.</p>
            </div>
            <div class="feature">
                <h3>&#128202; Visual Stats</h3>
                <p>Explore easy-to-understand charts to analyze magnitudes
                   and frequencies over the selected window.</p>
            </div>
            <div class="feature">
                <h3>&#9889; Instant Updates</h3>
                <p>Stay informed with periodic refreshes of the USGS summary
                   feeds, streamed to every open page.</p>
            </div>
            <div class="feature">
                <h3>&#127891; Student Friendly</h3>
                <p>Designed to make earthquake science approachable, with
                   visuals instead of complex jargon.</p>
            </div>
        </div>
    </main>
</body>
</html>
"##;
