use std::collections::VecDeque;
use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::{Map, Value, json};

use crate::api::{
    EventsRequest, EventsResponse, PerformanceEventsParams, PerformanceEventsResponse,
    RecordingApi, RecordingMetaResponse, SnapshotEvent, SnapshotsResponse,
};
use crate::error::{AppError, AppResult, FetchCause};

use super::report::{RecordingReport, ReportKind, UsageReporter};

pub(super) const WINDOW_A: &str = "182830cdf4b28a9-02530f1179ed36-1c525635-384000-182830cdf4c2841";
pub(super) const WINDOW_B: &str = "182830cdf4b28a9-02530f1179ed36-1c525635-384000-182830cdf4d3a2f";
pub(super) const RECORDING_ID: &str = "2";

pub(super) fn run_async_test<F>(future: F) -> AppResult<()>
where
    F: Future<Output = AppResult<()>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(future)
}

pub(super) fn meta_response() -> AppResult<RecordingMetaResponse> {
    let value = json!({
        "segments": [
            {
                "start_time": "2021-12-09T19:36:59Z",
                "end_time": "2021-12-09T20:10:00Z",
                "window_id": WINDOW_A,
                "is_active": true
            },
            {
                "start_time": "2021-12-09T20:10:00Z",
                "end_time": "2021-12-09T20:23:24Z",
                "window_id": WINDOW_B,
                "is_active": true
            }
        ],
        "start_and_end_times_by_window_id": {
            WINDOW_A: {"start_time": "2021-12-09T19:36:59Z", "end_time": "2021-12-09T20:10:00Z"},
            WINDOW_B: {"start_time": "2021-12-09T20:10:00Z", "end_time": "2021-12-09T20:23:24Z"}
        },
        "pinned_count": 0,
        "person": {"id": 1, "name": "test", "distinct_ids": ["d1"]}
    });
    Ok(serde_json::from_value(value)?)
}

pub(super) fn snapshot(timestamp: i64, kind: u64) -> SnapshotEvent {
    let mut fields = Map::new();
    fields.insert("type".to_owned(), Value::from(kind));
    SnapshotEvent { timestamp, fields }
}

pub(super) fn snapshots_page(
    entries: Vec<(&str, Vec<SnapshotEvent>)>,
    next: Option<&str>,
) -> SnapshotsResponse {
    SnapshotsResponse {
        snapshot_data_by_window_id: entries
            .into_iter()
            .map(|(window_id, events)| (window_id.to_owned(), events))
            .collect::<IndexMap<_, _>>(),
        next: next.map(str::to_owned),
    }
}

pub(super) fn event(id: &str, timestamp: &str) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("id".to_owned(), Value::from(id));
    fields.insert("event".to_owned(), Value::from("$pageview"));
    fields.insert("timestamp".to_owned(), Value::from(timestamp));
    fields
}

pub(super) fn events_page(ids: &[&str], next: Option<&str>) -> EventsResponse {
    EventsResponse {
        results: ids
            .iter()
            .map(|id| event(id, "2021-12-09T19:40:00Z"))
            .collect(),
        next: next.map(str::to_owned),
    }
}

pub(super) fn performance_page() -> AppResult<PerformanceEventsResponse> {
    Ok(serde_json::from_value(json!({
        "results": [
            {"entry_type": "navigation", "name": "https://example.com", "timestamp": 1639078620000_i64},
            {"entry_type": "resource", "name": "https://example.com/app.js", "timestamp": 1639078621000_i64}
        ]
    }))?)
}

struct Scripted<T> {
    delay: Duration,
    result: Result<T, FetchCause>,
}

/// One endpoint of [`FakeApi`]: scripted responses first, then the fallback.
struct Endpoint<T> {
    scripted: Mutex<VecDeque<Scripted<T>>>,
    fallback: Mutex<Option<Result<T, FetchCause>>>,
    calls: AtomicUsize,
    targets: Mutex<Vec<String>>,
}

impl<T: Clone> Endpoint<T> {
    const fn new() -> Self {
        Self {
            scripted: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(None),
            calls: AtomicUsize::new(0),
            targets: Mutex::new(Vec::new()),
        }
    }

    fn push(&self, delay: Duration, result: Result<T, FetchCause>) {
        if let Ok(mut scripted) = self.scripted.lock() {
            scripted.push_back(Scripted { delay, result });
        }
    }

    fn set_fallback(&self, result: Result<T, FetchCause>) {
        if let Ok(mut fallback) = self.fallback.lock() {
            *fallback = Some(result);
        }
    }

    async fn respond(&self, target: String) -> Result<T, FetchCause> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut targets) = self.targets.lock() {
            targets.push(target);
        }
        let next = self
            .scripted
            .lock()
            .ok()
            .and_then(|mut scripted| scripted.pop_front());
        if let Some(Scripted { delay, result }) = next {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            return result;
        }
        self.fallback
            .lock()
            .ok()
            .and_then(|fallback| fallback.clone())
            .unwrap_or(Err(FetchCause::Status { status: 404 }))
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn targets(&self) -> Vec<String> {
        self.targets
            .lock()
            .map(|targets| targets.clone())
            .unwrap_or_default()
    }
}

/// In-memory [`RecordingApi`] with scripted responses and call counters.
pub(super) struct FakeApi {
    meta: Endpoint<RecordingMetaResponse>,
    snapshots: Endpoint<SnapshotsResponse>,
    events: Endpoint<EventsResponse>,
    performance: Endpoint<PerformanceEventsResponse>,
}

impl FakeApi {
    /// Healthy API: metadata, one snapshot page, one events page and one
    /// performance page.
    pub(super) fn healthy() -> AppResult<Self> {
        let api = Self {
            meta: Endpoint::new(),
            snapshots: Endpoint::new(),
            events: Endpoint::new(),
            performance: Endpoint::new(),
        };
        api.meta.set_fallback(Ok(meta_response()?));
        api.snapshots.set_fallback(Ok(snapshots_page(
            vec![
                (WINDOW_A, vec![snapshot(30, 3), snapshot(10, 4), snapshot(20, 2)]),
                (WINDOW_B, vec![snapshot(15, 3)]),
            ],
            None,
        )));
        api.events
            .set_fallback(Ok(events_page(&["e1", "e2", "e3"], None)));
        api.performance.set_fallback(Ok(performance_page()?));
        Ok(api)
    }

    pub(super) fn fail_meta(&self, status: u16) {
        self.meta.set_fallback(Err(FetchCause::Status { status }));
    }

    pub(super) fn delay_meta(&self, delay: Duration) -> AppResult<()> {
        self.meta.push(delay, Ok(meta_response()?));
        Ok(())
    }

    pub(super) fn push_snapshots(&self, result: Result<SnapshotsResponse, FetchCause>) {
        self.snapshots.push(Duration::ZERO, result);
    }

    pub(super) fn push_events(&self, result: Result<EventsResponse, FetchCause>) {
        self.events.push(Duration::ZERO, result);
    }

    pub(super) fn meta_calls(&self) -> usize {
        self.meta.calls()
    }

    pub(super) fn snapshot_calls(&self) -> usize {
        self.snapshots.calls()
    }

    pub(super) fn events_calls(&self) -> usize {
        self.events.calls()
    }

    pub(super) fn performance_calls(&self) -> usize {
        self.performance.calls()
    }

    pub(super) fn snapshot_targets(&self) -> Vec<String> {
        self.snapshots.targets()
    }

    pub(super) fn events_targets(&self) -> Vec<String> {
        self.events.targets()
    }
}

#[async_trait]
impl RecordingApi for FakeApi {
    async fn recording_meta(
        &self,
        recording_id: &str,
    ) -> Result<RecordingMetaResponse, FetchCause> {
        self.meta.respond(recording_id.to_owned()).await
    }

    async fn recording_snapshots(
        &self,
        _recording_id: &str,
        cursor: Option<&str>,
    ) -> Result<SnapshotsResponse, FetchCause> {
        self.snapshots
            .respond(cursor.unwrap_or("initial").to_owned())
            .await
    }

    async fn events(&self, request: &EventsRequest) -> Result<EventsResponse, FetchCause> {
        let target = match request {
            EventsRequest::Initial(params) => format!("initial:{}", params.person_id),
            EventsRequest::Next(next) => next.clone(),
        };
        self.events.respond(target).await
    }

    async fn performance_events(
        &self,
        params: &PerformanceEventsParams,
    ) -> Result<PerformanceEventsResponse, FetchCause> {
        self.performance.respond(params.session_id.clone()).await
    }
}

/// Reporter that remembers every usage event.
#[derive(Default)]
pub(super) struct CollectingReporter {
    reports: Mutex<Vec<RecordingReport>>,
}

impl CollectingReporter {
    pub(super) fn kinds(&self) -> Vec<ReportKind> {
        self.reports
            .lock()
            .map(|reports| reports.iter().map(|report| report.kind).collect())
            .unwrap_or_default()
    }

    pub(super) fn count(&self, kind: ReportKind) -> usize {
        self.kinds().into_iter().filter(|seen| *seen == kind).count()
    }

    pub(super) fn last(&self, kind: ReportKind) -> AppResult<RecordingReport> {
        self.reports
            .lock()
            .ok()
            .and_then(|reports| {
                reports
                    .iter()
                    .rev()
                    .find(|report| report.kind == kind)
                    .cloned()
            })
            .ok_or_else(|| AppError::validation(format!("No {} report", kind.as_str())))
    }
}

impl UsageReporter for CollectingReporter {
    fn report_recording(&self, report: &RecordingReport) {
        if let Ok(mut reports) = self.reports.lock() {
            reports.push(report.clone());
        }
    }
}
