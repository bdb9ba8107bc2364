use std::time::Duration;

use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Viewed,
    Analyzed,
    Loaded,
}

impl ReportKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ReportKind::Viewed => "recording viewed",
            ReportKind::Analyzed => "recording analyzed",
            ReportKind::Loaded => "recording loaded",
        }
    }
}

/// Usage event describing how much of a recording was available when it
/// was emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordingReport {
    pub kind: ReportKind,
    pub recording_id: String,
    pub recording_duration_ms: u64,
    pub snapshot_chunks: u64,
    pub event_count: usize,
    pub performance_event_count: usize,
    pub elapsed: Duration,
}

/// Receives one-shot usage events from a mounted loader.
pub trait UsageReporter: Send + Sync {
    fn report_recording(&self, report: &RecordingReport);
}

/// Reporter that writes usage events to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl UsageReporter for TracingReporter {
    fn report_recording(&self, report: &RecordingReport) {
        info!(
            event = report.kind.as_str(),
            recording_id = %report.recording_id,
            duration_ms = report.recording_duration_ms,
            snapshot_chunks = report.snapshot_chunks,
            events = report.event_count,
            performance_events = report.performance_event_count,
            elapsed_ms = u64::try_from(report.elapsed.as_millis()).unwrap_or(u64::MAX),
            "Recording usage"
        );
    }
}
