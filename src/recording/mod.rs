//! Player-facing data model and the pure transforms that build it from raw
//! API pages.
mod events;
mod metadata;
mod player;
mod snapshots;


pub use events::{
    EVENTS_LOOKBACK_MS, EventsData, RecordingEvent, events_api_params, format_api_timestamp,
};
pub use metadata::{RecordingMetadata, RecordingSegment, WindowTimes, parse_metadata_response};
pub use player::SessionPlayerData;
pub use snapshots::{BufferedTo, SnapshotsByWindowId, compute_buffered_to, merge_snapshot_page};
