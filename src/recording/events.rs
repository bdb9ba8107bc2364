use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::api::{EVENTS_ORDER_BY, EventsApiParams, person_id, session_events_filter};

use super::RecordingMetadata;
use super::metadata::parse_epoch_ms;

/// Events are requested starting this long before the recording begins.
pub const EVENTS_LOOKBACK_MS: i64 = 60_000;

/// Request window format used by the events endpoint.
const API_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

#[must_use]
pub fn format_api_timestamp(epoch_ms: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(epoch_ms)
        .map(|instant| instant.format(API_TIMESTAMP_FORMAT).to_string())
}

/// Derives the first events request from parsed metadata. Returns `None`
/// until both the recording bounds and a person id are known.
#[must_use]
pub fn events_api_params(
    session_id: &str,
    metadata: &RecordingMetadata,
    person: Option<&Value>,
) -> Option<EventsApiParams> {
    let person_id = person.and_then(person_id)?;
    let start = metadata.start_time_epoch_ms()?;
    let end = metadata.end_time_epoch_ms()?;
    Some(EventsApiParams {
        after: format_api_timestamp(start.saturating_sub(EVENTS_LOOKBACK_MS))?,
        before: format_api_timestamp(end)?,
        person_id,
        order_by: vec![EVENTS_ORDER_BY.to_owned()],
        properties: session_events_filter(session_id),
    })
}

/// A raw event plus its offset from the start of the recording.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordingEvent {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    #[serde(rename = "playerTime")]
    pub player_time_ms: Option<i64>,
}

impl RecordingEvent {
    #[must_use]
    pub fn from_raw(fields: Map<String, Value>, recording_start_ms: Option<i64>) -> Self {
        let player_time_ms = recording_start_ms.and_then(|start| {
            let timestamp = fields.get("timestamp")?.as_str()?;
            let epoch_ms = parse_epoch_ms(timestamp).ok()?;
            Some(epoch_ms.saturating_sub(start))
        });
        Self {
            fields,
            player_time_ms,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventsData {
    pub events: Vec<RecordingEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl EventsData {
    /// Appends one page in fetch order. Records repeated across pages are
    /// kept as-is.
    pub fn append_page(
        &mut self,
        results: Vec<Map<String, Value>>,
        next: Option<String>,
        recording_start_ms: Option<i64>,
    ) {
        self.events.extend(
            results
                .into_iter()
                .map(|fields| RecordingEvent::from_raw(fields, recording_start_ms)),
        );
        self.next = next;
    }
}
