use crate::api::{
    EventsRequest, EventsResponse, PerformanceEventsParams, PerformanceEventsResponse,
    RecordingMetaResponse, SnapshotsResponse,
};
use crate::error::LoaderError;

use super::report::ReportKind;

/// Requests a caller may send to a mounted loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderCommand {
    LoadEntireRecording,
    LoadRecordingMeta,
    /// Fetch the next snapshot page. Without an explicit cursor the last
    /// known `next` is used.
    LoadRecordingSnapshots {
        next: Option<String>,
    },
    LoadEvents {
        next: Option<String>,
    },
    LoadPerformanceEvents,
    /// Drop all accumulated state and start a fresh load sequence.
    Remount,
    Unmount,
}

/// Inputs to [`super::transition`]: caller requests and fetch outcomes.
#[derive(Debug, Clone)]
pub enum Action {
    LoadEntireRecording,
    LoadRecordingMeta,
    LoadRecordingMetaSuccess(Box<RecordingMetaResponse>),
    LoadRecordingMetaFailure(LoaderError),
    LoadRecordingSnapshots { next: Option<String> },
    LoadRecordingSnapshotsSuccess(Box<SnapshotsResponse>),
    LoadRecordingSnapshotsFailure(LoaderError),
    LoadEvents { next: Option<String> },
    LoadEventsSuccess(Box<EventsResponse>),
    LoadEventsFailure(LoaderError),
    LoadPerformanceEvents,
    LoadPerformanceEventsSuccess(Box<PerformanceEventsResponse>),
    LoadPerformanceEventsFailure(LoaderError),
    Reset,
}

impl Action {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Action::LoadEntireRecording => "loadEntireRecording",
            Action::LoadRecordingMeta => "loadRecordingMeta",
            Action::LoadRecordingMetaSuccess(_) => "loadRecordingMetaSuccess",
            Action::LoadRecordingMetaFailure(_) => "loadRecordingMetaFailure",
            Action::LoadRecordingSnapshots { .. } => "loadRecordingSnapshots",
            Action::LoadRecordingSnapshotsSuccess(_) => "loadRecordingSnapshotsSuccess",
            Action::LoadRecordingSnapshotsFailure(_) => "loadRecordingSnapshotsFailure",
            Action::LoadEvents { .. } => "loadEvents",
            Action::LoadEventsSuccess(_) => "loadEventsSuccess",
            Action::LoadEventsFailure(_) => "loadEventsFailure",
            Action::LoadPerformanceEvents => "loadPerformanceEvents",
            Action::LoadPerformanceEventsSuccess(_) => "loadPerformanceEventsSuccess",
            Action::LoadPerformanceEventsFailure(_) => "loadPerformanceEventsFailure",
            Action::Reset => "reset",
        }
    }

    #[must_use]
    pub const fn failure(&self) -> Option<&LoaderError> {
        match self {
            Action::LoadRecordingMetaFailure(error)
            | Action::LoadRecordingSnapshotsFailure(error)
            | Action::LoadEventsFailure(error)
            | Action::LoadPerformanceEventsFailure(error) => Some(error),
            Action::LoadEntireRecording
            | Action::LoadRecordingMeta
            | Action::LoadRecordingMetaSuccess(_)
            | Action::LoadRecordingSnapshots { .. }
            | Action::LoadRecordingSnapshotsSuccess(_)
            | Action::LoadEvents { .. }
            | Action::LoadEventsSuccess(_)
            | Action::LoadPerformanceEvents
            | Action::LoadPerformanceEventsSuccess(_)
            | Action::Reset => None,
        }
    }
}

/// A single network request the supervisor must issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    Meta,
    Snapshots { cursor: Option<String> },
    Events(EventsRequest),
    Performance(PerformanceEventsParams),
}

/// Work produced by a transition for the supervisor to carry out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Fetch(FetchRequest),
    Report(ReportKind),
}
