use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use eis_core::{
    CombinationFilter, EisPipeline, HighlightTracker, decode_measurements, frequency_range,
    nyquist_rows, paginate, reduce_to_latest,
};
use eis_feed::{Settings, decode_combinations};
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};
use schemars::JsonSchema;
use serde::Deserialize;
use tokio::sync::Mutex;

/// Series tracked at once. Past this, the least recently polled idle series
/// is dropped; if it is polled again its whole snapshot reads as new.
const MAX_TRACKED_SERIES: usize = 256;

type SeriesKey = (String, String);

#[derive(Clone)]
pub struct EisServer {
    state: Arc<Mutex<ServerState>>,
    tool_router: ToolRouter<Self>,
}

struct ServerState {
    settings: Settings,
    pipeline: EisPipeline,
    /// One tracker per `(testId, channelId)` series, at most `max_series`.
    trackers: HashMap<SeriesKey, TrackedSeries>,
    max_series: usize,
}

struct TrackedSeries {
    tracker: HighlightTracker,
    last_poll: Instant,
}

impl ServerState {
    /// Make room for `key` by dropping one series: idle ones (no live
    /// highlight) before busy ones, least recently polled first.
    fn evict_for(&mut self, key: &SeriesKey, now: Instant) {
        if self.trackers.len() < self.max_series || self.trackers.contains_key(key) {
            return;
        }
        let victim = self
            .trackers
            .iter()
            .min_by_key(|(_, s)| (!s.tracker.current(now).is_empty(), s.last_poll))
            .map(|(k, _)| k.clone());
        if let Some(victim) = victim {
            tracing::debug!("evicting tracker {}#{}", victim.0, victim.1);
            self.trackers.remove(&victim);
        }
    }
}

impl EisServer {
    pub fn new(settings: Settings) -> Self {
        let pipeline = settings.pipeline();
        Self {
            state: Arc::new(Mutex::new(ServerState {
                settings,
                pipeline,
                trackers: HashMap::new(),
                max_series: MAX_TRACKED_SERIES,
            })),
            tool_router: Self::tool_router(),
        }
    }
}

fn json_result(value: &serde_json::Value) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(
        serde_json::to_string_pretty(value).unwrap_or_default(),
    )]))
}

// --- Tool parameter types ---

#[derive(Debug, Deserialize, JsonSchema)]
struct BatchRequest {
    /// Measurement records: objects with numeric frequency, zReal and zImag
    /// (or Frequency, Zreal, Zimg)
    records: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct LatestRequest {
    /// Index combination records (primaryKey/PK, groupSortKey/GSI1SK, updatedAt/UpdatedAt)
    records: Vec<serde_json::Value>,
    /// Keep combinations whose primary key contains this test id
    test_id: Option<String>,
    /// Keep combinations whose primary key contains this channel id
    channel_id: Option<String>,
    /// 1-based page number (default 1)
    page: Option<usize>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct TrackRequest {
    /// Test id of the series being polled
    test_id: String,
    /// Channel id of the series being polled
    channel_id: String,
    /// The full current snapshot of the series, in series order
    records: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct SeriesRequest {
    /// Measurement series records
    records: Vec<serde_json::Value>,
    /// Source keys to flag as highlighted
    #[serde(default)]
    highlighted: Vec<String>,
}

#[tool_router]
impl EisServer {
    #[tool(
        description = "Check whether a batch of EIS measurement records can be projected. Returns {\"valid\": bool}. A batch is invalid when empty or when any record lacks a numeric frequency, zReal or zImag."
    )]
    async fn eis_validate(
        &self,
        Parameters(req): Parameters<BatchRequest>,
    ) -> Result<CallToolResult, McpError> {
        let state = self.state.lock().await;
        let valid = state.pipeline.validate(&req.records);
        json_result(&serde_json::json!({
            "valid": valid,
            "records": req.records.len(),
        }))
    }

    #[tool(
        description = "Project a batch of EIS measurement records onto the fixed 3D basis. Returns {x, y, z, category} with coordinates clamped to [-5, 5] and category A/B/C by distance from origin. Fails with invalid params when the batch does not validate."
    )]
    async fn eis_process(
        &self,
        Parameters(req): Parameters<BatchRequest>,
    ) -> Result<CallToolResult, McpError> {
        let state = self.state.lock().await;
        let point = state
            .pipeline
            .process(&req.records)
            .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
        json_result(&serde_json::json!({
            "x": point.x,
            "y": point.y,
            "z": point.z,
            "category": point.category,
            "distance": point.distance(),
        }))
    }

    #[tool(
        description = "Reduce index combination records to the latest entry per (testId, channelId), sorted by testId then channelId descending. Optional substring filters and 1-based pagination."
    )]
    async fn eis_latest(
        &self,
        Parameters(req): Parameters<LatestRequest>,
    ) -> Result<CallToolResult, McpError> {
        let state = self.state.lock().await;
        let filter = CombinationFilter {
            test_id: req.test_id,
            channel_id: req.channel_id,
        };
        let combinations = decode_combinations(&req.records);
        let latest = reduce_to_latest(&filter.apply(&combinations));
        let page = paginate(
            &latest,
            req.page.unwrap_or(1),
            state.settings.listing.per_page,
        );

        let items: Vec<serde_json::Value> = page
            .items
            .iter()
            .map(|c| {
                let parsed = c.parse();
                serde_json::json!({
                    "testId": parsed.test_id,
                    "channelId": parsed.channel_id,
                    "fullKey": parsed.full_key,
                    "updatedAt": c.updated_at,
                })
            })
            .collect();

        json_result(&serde_json::json!({
            "items": items,
            "page": page.page,
            "totalPages": page.total_pages,
            "totalItems": page.total_items,
            "skipped": req.records.len() - combinations.len(),
        }))
    }

    #[tool(
        description = "Report which records of a polled series are new. Call once per poll with the full current snapshot of one test/channel series. Returns the ids (sourceKey/SK) currently highlighted; a highlight lasts 3 seconds and a newer batch replaces it."
    )]
    async fn eis_track(
        &self,
        Parameters(req): Parameters<TrackRequest>,
    ) -> Result<CallToolResult, McpError> {
        let mut state = self.state.lock().await;
        let window = state.settings.highlight_window();
        let now = Instant::now();

        let key = (req.test_id.clone(), req.channel_id.clone());
        state.evict_for(&key, now);
        let series = state.trackers.entry(key).or_insert_with(|| TrackedSeries {
            tracker: HighlightTracker::new(window),
            last_poll: now,
        });
        series.last_poll = now;
        let tracker = &mut series.tracker;
        let before = tracker.previous_len();
        let highlighted = tracker.track_records(&req.records, now);
        let expires_in_ms = tracker
            .pending_expiry()
            .filter(|_| !highlighted.is_empty())
            .map(|deadline| deadline.saturating_duration_since(now).as_millis() as u64);

        tracing::debug!(
            "track {}#{}: {} -> {} records, {} highlighted",
            req.test_id,
            req.channel_id,
            before,
            req.records.len(),
            highlighted.len()
        );

        json_result(&serde_json::json!({
            "highlighted": highlighted,
            "newRecords": req.records.len().saturating_sub(before),
            "seen": req.records.len(),
            "expiresInMs": expires_in_ms,
        }))
    }

    #[tool(
        description = "Order a measurement series for a Nyquist plot (by sequence index) and report its frequency range. Each row carries zReal, -zImag, frequency and a highlighted flag."
    )]
    async fn eis_series(
        &self,
        Parameters(req): Parameters<SeriesRequest>,
    ) -> Result<CallToolResult, McpError> {
        let series = decode_measurements(&req.records)
            .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
        let rows = nyquist_rows(&series, &req.highlighted);
        let range = frequency_range(&series).map(|(lo, hi)| serde_json::json!({"min": lo, "max": hi}));

        json_result(&serde_json::json!({
            "rows": rows,
            "count": series.len(),
            "frequencyRange": range,
        }))
    }

    #[tool(description = "Show the active projection, highlight, poll and listing settings.")]
    async fn eis_settings(&self) -> Result<CallToolResult, McpError> {
        let state = self.state.lock().await;
        let value = serde_json::to_value(&state.settings)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        json_result(&value)
    }
}

#[tool_handler]
impl ServerHandler for EisServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "EIS projection pipeline.\n\n\
                 - eis_validate / eis_process: project a completed measurement batch to a labeled 3D point. \
                   Validate first; an invalid batch is a processing error, not missing data.\n\
                 - eis_latest: latest entry per test/channel combination for listing views.\n\
                 - eis_track: call once per poll with the full snapshot of one series to learn which \
                   records are new. State is kept per test/channel for the server lifetime.\n\
                 - eis_series: plot-ordered rows and frequency range for a series.\n\
                 - eis_settings: active constants."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
