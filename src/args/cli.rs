use std::time::Duration;

use clap::{Parser, ValueEnum};
use serde::Deserialize;

use crate::loader::AvailableFeature;

use super::parsers::{parse_duration_arg, parse_recording_id};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Full view model as pretty-printed JSON
    #[default]
    Json,
    /// Short human-readable report
    Summary,
}

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Loads every piece of a session recording (metadata, snapshots, events, performance events) and prints the assembled player data."
)]
pub struct LoaderArgs {
    /// Recording (session) id to load
    #[arg(long, short = 'r', value_parser = parse_recording_id)]
    pub recording: String,

    /// API host, e.g. https://app.example.com
    #[arg(long = "base-url", short = 'u')]
    pub base_url: Option<String>,

    /// Project id the recording belongs to
    #[arg(long, short = 'p')]
    pub project: Option<u64>,

    /// Personal API token sent as a bearer token
    #[arg(long, env = "REPLAY_LOADER_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Enable an optional capability (repeatable)
    #[arg(long = "feature", value_enum)]
    pub features: Vec<AvailableFeature>,

    /// Per-request timeout (supports ms/s/m/h)
    #[arg(
        long = "request-timeout",
        default_value = "30s",
        value_parser = parse_duration_arg
    )]
    pub request_timeout: Duration,

    /// Write the result to this file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<String>,

    /// Output format
    #[arg(long = "output-format", value_enum, default_value_t = OutputFormat::Json)]
    pub output_format: OutputFormat,

    /// Path to config file (TOML/JSON). Defaults to ./replay-loader.toml or ./replay-loader.json if present.
    #[arg(long)]
    pub config: Option<String>,

    /// Enable verbose logging (sets log level to debug unless overridden by REPLAY_LOADER_LOG/RUST_LOG)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable colored log output
    #[arg(long = "no-color")]
    pub no_color: bool,
}
