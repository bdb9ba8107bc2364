use serde::Serialize;
use serde_json::Value;

use super::{BufferedTo, RecordingMetadata, SnapshotsByWindowId};

/// Everything the playback UI needs to render a recording.
///
/// `Default` is the shape before any fetch has completed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPlayerData {
    pub person: Option<Value>,
    pub metadata: RecordingMetadata,
    pub snapshots_by_window_id: SnapshotsByWindowId,
    pub buffered_to: Option<BufferedTo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}
