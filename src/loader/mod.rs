//! Recording data aggregator: an explicit state machine driven by a
//! supervising task.
//!
//! [`transition`] is the only place loader state changes. It returns the
//! [`Effect`]s a transition implies (follow-up fetches, one-shot usage
//! reports); the supervisor behind [`RecordingLoader`] carries them out and
//! feeds fetch results back in as actions.
mod actions;
mod features;
mod machine;
mod report;
mod state;
mod supervisor;

#[cfg(test)]
mod test_support;

pub use actions::{Action, Effect, FetchRequest, LoaderCommand};
pub use features::{AvailableFeature, AvailableFeatures};
pub use machine::transition;
pub use report::{RecordingReport, ReportKind, TracingReporter, UsageReporter};
pub use state::{LoadStatus, LoaderState, LoaderStatuses, LoaderView, ReportedFlags};
pub use supervisor::RecordingLoader;
