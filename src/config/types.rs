use std::time::Duration;

use serde::Deserialize;

use crate::args::{OutputFormat, parse_duration_arg};
use crate::error::{AppError, AppResult, ConfigError};
use crate::loader::AvailableFeature;

/// Contents of `replay-loader.toml` / `replay-loader.json`. Every field is
/// optional; command-line values take precedence.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub base_url: Option<String>,
    pub project_id: Option<u64>,
    pub api_token: Option<String>,
    pub features: Option<Vec<AvailableFeature>>,
    pub request_timeout: Option<DurationValue>,
    pub output: Option<String>,
    pub output_format: Option<OutputFormat>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> AppResult<Duration> {
        match self {
            DurationValue::Seconds(secs) => {
                if *secs == 0 {
                    return Err(AppError::config(ConfigError::InvalidRequestTimeout {
                        value: secs.to_string(),
                        message: "Duration must be > 0.".to_owned(),
                    }));
                }
                Ok(Duration::from_secs(*secs))
            }
            DurationValue::Text(text) => parse_duration_arg(text).map_err(|err| {
                AppError::config(ConfigError::InvalidRequestTimeout {
                    value: text.clone(),
                    message: err.to_string(),
                })
            }),
        }
    }
}
