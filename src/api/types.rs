use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw body of `GET .../session_recordings/:id`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RecordingMetaResponse {
    #[serde(default)]
    pub segments: Vec<RawSegment>,
    #[serde(default)]
    pub start_and_end_times_by_window_id: BTreeMap<String, RawWindowTimes>,
    #[serde(default)]
    pub pinned_count: Option<u64>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub person: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RawSegment {
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub window_id: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RawWindowTimes {
    pub start_time: String,
    pub end_time: String,
}

/// One raw snapshot record. Only the timestamp is interpreted; everything
/// else is carried through untouched for the player.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SnapshotEvent {
    pub timestamp: i64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Raw body of `GET .../session_recordings/:id/snapshots`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SnapshotsResponse {
    /// Window order follows the response body.
    #[serde(default)]
    pub snapshot_data_by_window_id: IndexMap<String, Vec<SnapshotEvent>>,
    #[serde(default)]
    pub next: Option<String>,
}

/// Raw body of `GET .../events`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct EventsResponse {
    #[serde(default)]
    pub results: Vec<Map<String, Value>>,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PerformanceEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_type: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Raw body of `GET .../performance_events`. Single page, any `next` is ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PerformanceEventsResponse {
    #[serde(default)]
    pub results: Vec<PerformanceEvent>,
}

/// Reads the person id from a raw person payload, accepting either a string
/// or a numeric id.
#[must_use]
pub fn person_id(person: &Value) -> Option<String> {
    match person.get("id")? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        Value::String(_) | Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => {
            None
        }
    }
}
