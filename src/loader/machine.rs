use tracing::{debug, warn};

use crate::api::{EventsRequest, EventsResponse, PerformanceEventsParams, SnapshotsResponse};
use crate::error::LoaderError;
use crate::recording::{
    compute_buffered_to, events_api_params, merge_snapshot_page, parse_metadata_response,
};

use super::actions::{Action, Effect, FetchRequest};
use super::features::AvailableFeatures;
use super::report::ReportKind;
use super::state::{LoadStatus, LoaderState};

/// Applies one action to the loader state and returns the requests and
/// reports it triggers. Requests that are already in flight or have nothing
/// left to fetch produce no effects.
#[must_use]
pub fn transition(
    state: &mut LoaderState,
    action: Action,
    features: &AvailableFeatures,
) -> Vec<Effect> {
    let mut effects = Vec::new();
    match action {
        Action::LoadEntireRecording | Action::LoadRecordingMeta => {
            if state.status.meta.is_loading() {
                debug!("Metadata request already in flight");
            } else {
                state.status.meta = LoadStatus::Loading;
                effects.push(Effect::Fetch(FetchRequest::Meta));
            }
        }
        Action::LoadRecordingMetaSuccess(response) => {
            match parse_metadata_response(&response) {
                Ok(metadata) => {
                    state.events_api_params = events_api_params(
                        &state.recording_id,
                        &metadata,
                        response.person.as_ref(),
                    );
                    state.player.metadata = metadata;
                    state.player.person = response.person;
                    state.status.meta = LoadStatus::Loaded;
                    on_metadata_loaded(state, features, &mut effects);
                }
                Err(cause) => {
                    state.status.meta = LoadStatus::Failed(LoaderError::MetadataFetch { cause });
                }
            }
        }
        Action::LoadRecordingMetaFailure(error) => {
            state.status.meta = LoadStatus::Failed(error);
        }
        Action::LoadRecordingSnapshots { next } => {
            request_snapshots(state, next, &mut effects);
        }
        Action::LoadRecordingSnapshotsSuccess(response) => {
            let SnapshotsResponse {
                snapshot_data_by_window_id,
                next,
            } = *response;
            merge_snapshot_page(
                &mut state.player.snapshots_by_window_id,
                snapshot_data_by_window_id,
            );
            let buffered_to = compute_buffered_to(&state.player.snapshots_by_window_id);
            state.player.buffered_to = match (state.player.buffered_to.take(), buffered_to) {
                (Some(previous), Some(current)) if previous.time > current.time => Some(previous),
                (previous, current) => current.or(previous),
            };
            state.player.next = next;
            state.chunk_pagination_index = state.chunk_pagination_index.saturating_add(1);
            state.status.snapshots = LoadStatus::Loaded;

            if !state.reported.first_paint {
                state.reported.first_paint = true;
                effects.push(Effect::Report(ReportKind::Viewed));
                effects.push(Effect::Report(ReportKind::Analyzed));
            }
            if state.player.next.is_some() {
                request_snapshots(state, None, &mut effects);
            }
        }
        Action::LoadRecordingSnapshotsFailure(error) => {
            state.status.snapshots = LoadStatus::Failed(error);
        }
        Action::LoadEvents { next } => {
            request_events(state, next, &mut effects);
        }
        Action::LoadEventsSuccess(response) => {
            let EventsResponse { results, next } = *response;
            let recording_start = state.player.metadata.start_time_epoch_ms();
            let has_next = next.is_some();
            state
                .session_events
                .get_or_insert_with(Default::default)
                .append_page(results, next, recording_start);
            state.status.events = LoadStatus::Loaded;
            if has_next {
                request_events(state, None, &mut effects);
            }
        }
        Action::LoadEventsFailure(error) => {
            state.status.events = LoadStatus::Failed(error);
        }
        Action::LoadPerformanceEvents => {
            request_performance_events(state, features, &mut effects);
        }
        Action::LoadPerformanceEventsSuccess(response) => {
            state.performance_events = response.results;
            state.status.performance = LoadStatus::Loaded;
        }
        Action::LoadPerformanceEventsFailure(error) => {
            state.status.performance = LoadStatus::Failed(error);
        }
        Action::Reset => {
            state.reset();
        }
    }

    if !state.reported.recording_loaded && state.entire_recording_loaded() {
        state.reported.recording_loaded = true;
        effects.push(Effect::Report(ReportKind::Loaded));
    }
    effects
}

/// Metadata success starts every loader that has not been started yet.
fn on_metadata_loaded(
    state: &mut LoaderState,
    features: &AvailableFeatures,
    effects: &mut Vec<Effect>,
) {
    if matches!(state.status.snapshots, LoadStatus::Idle) {
        request_snapshots(state, None, effects);
    }
    if matches!(state.status.events, LoadStatus::Idle) {
        request_events(state, None, effects);
    }
    if matches!(state.status.performance, LoadStatus::Idle) {
        request_performance_events(state, features, effects);
    }
}

fn request_snapshots(state: &mut LoaderState, next: Option<String>, effects: &mut Vec<Effect>) {
    if state.status.snapshots.is_loading() {
        debug!("Snapshot request already in flight");
        return;
    }
    let cursor = next.or_else(|| state.player.next.clone());
    if cursor.is_none() && state.snapshots_exhausted() {
        debug!("All snapshot pages already loaded");
        return;
    }
    state.status.snapshots = LoadStatus::Loading;
    effects.push(Effect::Fetch(FetchRequest::Snapshots { cursor }));
}

fn request_events(state: &mut LoaderState, next: Option<String>, effects: &mut Vec<Effect>) {
    if state.status.events.is_loading() {
        debug!("Events request already in flight");
        return;
    }
    let cursor = next.or_else(|| {
        state
            .session_events
            .as_ref()
            .and_then(|data| data.next.clone())
    });
    let request = match cursor {
        Some(next) => EventsRequest::Next(next),
        None => {
            if state.events_exhausted() || state.session_events.is_some() {
                debug!("All event pages already loaded");
                return;
            }
            let Some(params) = state.events_api_params.clone() else {
                if matches!(state.status.meta, LoadStatus::Loaded) {
                    warn!("Recording has no person or bounds; skipping events");
                    state.session_events = Some(Default::default());
                    state.status.events = LoadStatus::Skipped;
                }
                return;
            };
            EventsRequest::Initial(params)
        }
    };
    state.status.events = LoadStatus::Loading;
    effects.push(Effect::Fetch(FetchRequest::Events(request)));
}

fn request_performance_events(
    state: &mut LoaderState,
    features: &AvailableFeatures,
    effects: &mut Vec<Effect>,
) {
    if state.status.performance.is_loading() {
        debug!("Performance events request already in flight");
        return;
    }
    if !features.performance_events_enabled() {
        state.performance_events.clear();
        state.status.performance = LoadStatus::Skipped;
        return;
    }
    let Some(params) = state.events_api_params.as_ref() else {
        if matches!(state.status.meta, LoadStatus::Loaded) {
            warn!("Recording has no person or bounds; skipping performance events");
            state.status.performance = LoadStatus::Skipped;
        }
        return;
    };
    let params = PerformanceEventsParams::for_events(&state.recording_id, params);
    state.status.performance = LoadStatus::Loading;
    effects.push(Effect::Fetch(FetchRequest::Performance(params)));
}
