use std::collections::BTreeMap;

use chrono::DateTime;
use serde::Serialize;

use crate::api::{RawSegment, RawWindowTimes, RecordingMetaResponse};
use crate::error::FetchCause;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingMetadata {
    pub recording_duration_ms: u64,
    pub segments: Vec<RecordingSegment>,
    pub pinned_count: u64,
    pub start_and_end_times_by_window_id: BTreeMap<String, WindowTimes>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingSegment {
    pub start_time_epoch_ms: i64,
    pub end_time_epoch_ms: i64,
    pub window_id: Option<String>,
    pub is_active: bool,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowTimes {
    pub start_time_epoch_ms: i64,
    pub end_time_epoch_ms: i64,
}

impl RecordingMetadata {
    /// Earliest known instant of the recording, from segments or windows.
    #[must_use]
    pub fn start_time_epoch_ms(&self) -> Option<i64> {
        let from_segments = self
            .segments
            .iter()
            .map(|segment| segment.start_time_epoch_ms)
            .min();
        from_segments.or_else(|| {
            self.start_and_end_times_by_window_id
                .values()
                .map(|times| times.start_time_epoch_ms)
                .min()
        })
    }

    /// Latest known instant of the recording, from segments or windows.
    #[must_use]
    pub fn end_time_epoch_ms(&self) -> Option<i64> {
        let from_segments = self
            .segments
            .iter()
            .map(|segment| segment.end_time_epoch_ms)
            .max();
        from_segments.or_else(|| {
            self.start_and_end_times_by_window_id
                .values()
                .map(|times| times.end_time_epoch_ms)
                .max()
        })
    }
}

/// Converts a raw metadata body into [`RecordingMetadata`].
///
/// The recording duration is the sum of segment durations; a raw
/// `duration_ms` is only used when the response carries no segments.
///
/// # Errors
///
/// Returns a decode error when a segment or window timestamp is not RFC 3339.
pub fn parse_metadata_response(
    raw: &RecordingMetaResponse,
) -> Result<RecordingMetadata, FetchCause> {
    let segments = raw
        .segments
        .iter()
        .map(parse_segment)
        .collect::<Result<Vec<_>, _>>()?;

    let mut start_and_end_times_by_window_id = BTreeMap::new();
    for (window_id, times) in &raw.start_and_end_times_by_window_id {
        start_and_end_times_by_window_id.insert(window_id.clone(), parse_window_times(times)?);
    }

    let recording_duration_ms = if segments.is_empty() {
        raw.duration_ms.unwrap_or(0)
    } else {
        segments
            .iter()
            .fold(0u64, |total, segment| total.saturating_add(segment.duration_ms))
    };

    Ok(RecordingMetadata {
        recording_duration_ms,
        segments,
        pinned_count: raw.pinned_count.unwrap_or(0),
        start_and_end_times_by_window_id,
    })
}

fn parse_segment(raw: &RawSegment) -> Result<RecordingSegment, FetchCause> {
    let start_time_epoch_ms = parse_epoch_ms(&raw.start_time)?;
    let end_time_epoch_ms = parse_epoch_ms(&raw.end_time)?;
    Ok(RecordingSegment {
        start_time_epoch_ms,
        end_time_epoch_ms,
        window_id: raw.window_id.clone(),
        is_active: raw.is_active,
        duration_ms: span_ms(start_time_epoch_ms, end_time_epoch_ms),
    })
}

fn parse_window_times(raw: &RawWindowTimes) -> Result<WindowTimes, FetchCause> {
    Ok(WindowTimes {
        start_time_epoch_ms: parse_epoch_ms(&raw.start_time)?,
        end_time_epoch_ms: parse_epoch_ms(&raw.end_time)?,
    })
}

pub(crate) fn parse_epoch_ms(value: &str) -> Result<i64, FetchCause> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|parsed| parsed.timestamp_millis())
        .map_err(|err| FetchCause::Decode {
            message: format!("invalid timestamp '{}': {}", value, err),
        })
}

fn span_ms(start: i64, end: i64) -> u64 {
    u64::try_from(end.saturating_sub(start)).unwrap_or(0)
}
