//! Recording data aggregator for session replay.
//!
//! Given a recording id, the [`loader`] fetches recording metadata, every
//! page of snapshot data, the events that happened during the recording and
//! (when the capability is enabled) browser performance events, then merges
//! them into the view model a playback UI renders. The `replay-loader`
//! binary mounts one loader against a live API and prints the result.
pub mod api;
pub mod args;
pub mod config;
pub mod error;
pub mod loader;
pub mod output;
pub mod recording;
