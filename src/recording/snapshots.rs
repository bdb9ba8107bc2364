use indexmap::IndexMap;
use serde::Serialize;

use crate::api::SnapshotEvent;

/// Snapshot records per window, each sequence sorted by timestamp. Windows
/// keep the order in which they were first seen across pages.
pub type SnapshotsByWindowId = IndexMap<String, Vec<SnapshotEvent>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferedTo {
    pub time: i64,
    pub window_id: String,
}

/// Appends a page to the per-window sequences and re-sorts every window the
/// page touched. New windows go after the ones already known. The sort is stable, so records sharing a timestamp keep
/// their arrival order.
pub fn merge_snapshot_page(
    existing: &mut SnapshotsByWindowId,
    page: SnapshotsByWindowId,
) {
    for (window_id, mut incoming) in page {
        let sequence = existing.entry(window_id).or_default();
        sequence.append(&mut incoming);
        sequence.sort_by_key(|event| event.timestamp);
    }
}

/// Latest timestamp across all windows, with the window holding it. Ties go
/// to the window seen first.
#[must_use]
pub fn compute_buffered_to(snapshots: &SnapshotsByWindowId) -> Option<BufferedTo> {
    let mut buffered: Option<(&str, i64)> = None;
    for (window_id, sequence) in snapshots {
        let Some(last) = sequence.last() else {
            continue;
        };
        let is_later = buffered.is_none_or(|(_, time)| last.timestamp > time);
        if is_later {
            buffered = Some((window_id.as_str(), last.timestamp));
        }
    }
    buffered.map(|(window_id, time)| BufferedTo {
        time,
        window_id: window_id.to_owned(),
    })
}
