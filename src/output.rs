//! Rendering of a settled loader view for the command-line binary.
use std::path::Path;

use crate::args::OutputFormat;
use crate::error::AppResult;
use crate::loader::{LoadStatus, LoaderView};

/// Renders `view` in the requested format. JSON output is the same shape
/// the playback UI consumes.
///
/// # Errors
///
/// Returns an error when the view cannot be serialized.
pub fn render(view: &LoaderView, format: OutputFormat) -> AppResult<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(view)?),
        OutputFormat::Summary => Ok(render_summary(view)),
    }
}

fn render_summary(view: &LoaderView) -> String {
    let player = &view.session_player_data;
    let snapshot_count: usize = player.snapshots_by_window_id.values().map(Vec::len).sum();
    let event_count = view
        .session_events_data
        .as_ref()
        .map_or(0, |data| data.events.len());

    let mut lines = vec![
        format!("Recording: {}", view.session_recording_id),
        format!(
            "Duration: {} ms across {} segment(s)",
            player.metadata.recording_duration_ms,
            player.metadata.segments.len()
        ),
        format!(
            "Snapshots: {} in {} window(s), {} page(s)",
            snapshot_count,
            player.snapshots_by_window_id.len(),
            view.chunk_pagination_index
        ),
    ];
    if let Some(buffered_to) = player.buffered_to.as_ref() {
        lines.push(format!(
            "Buffered to: {} (window {})",
            buffered_to.time, buffered_to.window_id
        ));
    }
    lines.push(format!("Events: {}", event_count));
    lines.push(format!(
        "Performance events: {}",
        view.performance_events.len()
    ));

    let status = &view.status;
    for (name, loader) in [
        ("metadata", &status.meta),
        ("snapshots", &status.snapshots),
        ("events", &status.events),
        ("performance", &status.performance),
    ] {
        match loader {
            LoadStatus::Failed(error) => lines.push(format!("  {}: failed ({})", name, error)),
            LoadStatus::Idle | LoadStatus::Loading | LoadStatus::Loaded | LoadStatus::Skipped => {
                lines.push(format!("  {}: {}", name, loader.label()));
            }
        }
    }
    lines.push(format!(
        "Entire recording loaded: {}",
        if view.entire_recording_loaded {
            "yes"
        } else {
            "no"
        }
    ));
    lines.join("\n")
}

/// Writes rendered output to `path`, or stdout when no path is given.
///
/// # Errors
///
/// Returns an error when the file cannot be written.
pub fn write_output(rendered: &str, path: Option<&str>) -> AppResult<()> {
    match path {
        Some(path) => {
            std::fs::write(Path::new(path), format!("{}\n", rendered))?;
            tracing::info!(path, "Wrote recording");
        }
        None => println!("{}", rendered),
    }
    Ok(())
}
