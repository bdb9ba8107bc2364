use serde::Serialize;

use crate::api::{EventsApiParams, PerformanceEvent};
use crate::error::LoaderError;
use crate::recording::{EventsData, SessionPlayerData};

/// Lifecycle of one loader within a mount.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    /// Never requested because its precondition or capability gate failed.
    Skipped,
    Failed(LoaderError),
}

impl LoadStatus {
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, LoadStatus::Loading)
    }

    #[must_use]
    pub const fn is_done(&self) -> bool {
        matches!(self, LoadStatus::Loaded | LoadStatus::Skipped)
    }

    #[must_use]
    pub const fn failure(&self) -> Option<&LoaderError> {
        match self {
            LoadStatus::Failed(error) => Some(error),
            LoadStatus::Idle | LoadStatus::Loading | LoadStatus::Loaded | LoadStatus::Skipped => {
                None
            }
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            LoadStatus::Idle => "idle",
            LoadStatus::Loading => "loading",
            LoadStatus::Loaded => "loaded",
            LoadStatus::Skipped => "skipped",
            LoadStatus::Failed(_) => "failed",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoaderStatuses {
    pub meta: LoadStatus,
    pub snapshots: LoadStatus,
    pub events: LoadStatus,
    pub performance: LoadStatus,
}

impl LoaderStatuses {
    #[must_use]
    pub const fn any_loading(&self) -> bool {
        self.meta.is_loading()
            || self.snapshots.is_loading()
            || self.events.is_loading()
            || self.performance.is_loading()
    }

    pub fn failures(&self) -> impl Iterator<Item = &LoaderError> {
        [
            &self.meta,
            &self.snapshots,
            &self.events,
            &self.performance,
        ]
        .into_iter()
        .filter_map(LoadStatus::failure)
    }
}

/// One-time side effects already emitted during this mount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportedFlags {
    pub first_paint: bool,
    pub recording_loaded: bool,
}

/// All state owned by one mounted loader.
#[derive(Debug, Clone, Default)]
pub struct LoaderState {
    pub recording_id: String,
    /// Bumped on every reset. Responses tagged with an older generation are
    /// dropped.
    pub generation: u64,
    pub status: LoaderStatuses,
    pub player: SessionPlayerData,
    pub chunk_pagination_index: u64,
    pub events_api_params: Option<EventsApiParams>,
    pub session_events: Option<EventsData>,
    pub performance_events: Vec<PerformanceEvent>,
    pub reported: ReportedFlags,
}

impl LoaderState {
    #[must_use]
    pub fn new(recording_id: impl Into<String>) -> Self {
        Self {
            recording_id: recording_id.into(),
            ..Self::default()
        }
    }

    /// Discards everything accumulated so far, as on unmount + remount.
    pub fn reset(&mut self) {
        let recording_id = std::mem::take(&mut self.recording_id);
        let generation = self.generation.wrapping_add(1);
        *self = Self {
            recording_id,
            generation,
            ..Self::default()
        };
    }

    /// Snapshot pagination reached its last page.
    #[must_use]
    pub const fn snapshots_exhausted(&self) -> bool {
        matches!(self.status.snapshots, LoadStatus::Loaded) && self.player.next.is_none()
    }

    #[must_use]
    pub fn events_exhausted(&self) -> bool {
        match self.status.events {
            LoadStatus::Skipped => true,
            LoadStatus::Loaded => self
                .session_events
                .as_ref()
                .is_none_or(|data| data.next.is_none()),
            LoadStatus::Idle | LoadStatus::Loading | LoadStatus::Failed(_) => false,
        }
    }

    #[must_use]
    pub fn entire_recording_loaded(&self) -> bool {
        matches!(self.status.meta, LoadStatus::Loaded)
            && self.snapshots_exhausted()
            && self.events_exhausted()
            && self.status.performance.is_done()
    }

    #[must_use]
    pub fn event_count(&self) -> usize {
        self.session_events
            .as_ref()
            .map_or(0, |data| data.events.len())
    }
}

/// Read-only view published to subscribers after every transition.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoaderView {
    pub session_recording_id: String,
    pub session_player_data: SessionPlayerData,
    pub session_events_data: Option<EventsData>,
    pub performance_events: Vec<PerformanceEvent>,
    pub events_api_params: Option<EventsApiParams>,
    pub chunk_pagination_index: u64,
    pub entire_recording_loaded: bool,
    #[serde(skip)]
    pub status: LoaderStatuses,
    /// Number of caller commands the supervisor has processed.
    #[serde(skip)]
    pub commands_processed: u64,
}

impl LoaderView {
    #[must_use]
    pub fn from_state(state: &LoaderState, commands_processed: u64) -> Self {
        Self {
            session_recording_id: state.recording_id.clone(),
            session_player_data: state.player.clone(),
            session_events_data: state.session_events.clone(),
            performance_events: state.performance_events.clone(),
            events_api_params: state.events_api_params.clone(),
            chunk_pagination_index: state.chunk_pagination_index,
            entire_recording_loaded: state.entire_recording_loaded(),
            status: state.status.clone(),
            commands_processed,
        }
    }

    /// Nothing is in flight and metadata loading has at least started.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        !matches!(self.status.meta, LoadStatus::Idle) && !self.status.any_loading()
    }

    pub fn failures(&self) -> impl Iterator<Item = &LoaderError> {
        self.status.failures()
    }
}
