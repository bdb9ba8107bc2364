use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::api::ApiSettings;
use crate::args::{LoaderArgs, OutputFormat};
use crate::error::{AppError, AppResult, ValidationError};
use crate::loader::AvailableFeatures;

use super::types::ConfigFile;

/// Applies configuration values to CLI arguments that were not given
/// explicitly.
///
/// # Errors
///
/// Returns an error when a config value is invalid.
pub fn apply_config(
    args: &mut LoaderArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if !is_user_set(matches, "base_url")
        && let Some(base_url) = config.base_url.clone()
    {
        args.base_url = Some(base_url);
    }

    if !is_user_set(matches, "project")
        && let Some(project_id) = config.project_id
    {
        args.project = Some(project_id);
    }

    if !is_user_set(matches, "token")
        && let Some(token) = config.api_token.clone()
    {
        args.token = Some(token);
    }

    if !is_user_set(matches, "features")
        && let Some(features) = config.features.clone()
    {
        args.features = features;
    }

    if !is_user_set(matches, "request_timeout")
        && let Some(timeout) = config.request_timeout.as_ref()
    {
        args.request_timeout = timeout.to_duration()?;
    }

    if !is_user_set(matches, "output")
        && let Some(output) = config.output.clone()
    {
        args.output = Some(output);
    }

    if !is_user_set(matches, "output_format")
        && let Some(format) = config.output_format
    {
        args.output_format = format;
    }

    Ok(())
}

/// Command line and environment both win over the config file.
fn is_user_set(matches: &ArgMatches, name: &str) -> bool {
    matches!(
        matches.value_source(name),
        Some(ValueSource::CommandLine | ValueSource::EnvVariable)
    )
}

/// Everything the binary needs after CLI and config file are merged.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub recording_id: String,
    pub api: ApiSettings,
    pub features: AvailableFeatures,
    pub output: Option<String>,
    pub output_format: OutputFormat,
}

impl TryFrom<LoaderArgs> for ResolvedConfig {
    type Error = AppError;

    fn try_from(args: LoaderArgs) -> AppResult<Self> {
        let base_url = args
            .base_url
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| AppError::validation(ValidationError::MissingBaseUrl))?;
        let project_id = args
            .project
            .ok_or_else(|| AppError::validation(ValidationError::MissingProject))?;
        let api_token = args.token.filter(|token| !token.trim().is_empty());

        Ok(Self {
            recording_id: args.recording,
            api: ApiSettings {
                base_url,
                project_id,
                api_token,
                request_timeout: args.request_timeout,
            },
            features: AvailableFeatures::new(args.features),
            output: args.output,
            output_format: args.output_format,
        })
    }
}
