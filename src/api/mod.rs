//! Contracts of the recordings API endpoints the loader consumes.
mod client;
mod params;
mod types;


use async_trait::async_trait;

use crate::error::FetchCause;

pub use client::{ApiSettings, HttpRecordingApi};
pub use params::{
    EVENTS_ORDER_BY, EventsApiParams, FilterLogic, PerformanceEventsParams, PropertyFilter,
    PropertyGroup, PropertyGroupValue, PropertyKind, PropertyOperator, PropertyValue,
    SESSION_ID_PROPERTY, session_events_filter,
};
pub use types::{
    EventsResponse, PerformanceEvent, PerformanceEventsResponse, RawSegment, RawWindowTimes,
    RecordingMetaResponse, SnapshotEvent, SnapshotsResponse, person_id,
};

/// Target of an events request: either the first page built from params or
/// a `next` URL handed back by the previous page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventsRequest {
    Initial(EventsApiParams),
    Next(String),
}

/// Read-only access to the recordings API.
///
/// Every method resolves to exactly one HTTP exchange. Pagination is driven
/// by the caller, which passes `next` cursors back verbatim.
#[async_trait]
pub trait RecordingApi: Send + Sync {
    async fn recording_meta(&self, recording_id: &str)
    -> Result<RecordingMetaResponse, FetchCause>;

    async fn recording_snapshots(
        &self,
        recording_id: &str,
        cursor: Option<&str>,
    ) -> Result<SnapshotsResponse, FetchCause>;

    async fn events(&self, request: &EventsRequest) -> Result<EventsResponse, FetchCause>;

    async fn performance_events(
        &self,
        params: &PerformanceEventsParams,
    ) -> Result<PerformanceEventsResponse, FetchCause>;
}
