use std::sync::Arc;

use clap::{ArgMatches, CommandFactory, FromArgMatches};
use tracing::{error, info, warn};

use replay_loader::api::HttpRecordingApi;
use replay_loader::args::LoaderArgs;
use replay_loader::config::{ResolvedConfig, apply_config, load_config};
use replay_loader::error::{AppError, AppResult};
use replay_loader::loader::{AvailableFeatures, LoaderView, RecordingLoader, TracingReporter};
use replay_loader::output::{render, write_output};

pub(crate) fn run() -> AppResult<()> {
    let (args, matches) = parse_args()?;

    crate::logger::init_logging(args.verbose, args.no_color);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(args, &matches))
}

fn parse_args() -> AppResult<(LoaderArgs, ArgMatches)> {
    let matches = LoaderArgs::command().get_matches();
    let args = LoaderArgs::from_arg_matches(&matches)?;
    Ok((args, matches))
}

async fn run_async(mut args: LoaderArgs, matches: &ArgMatches) -> AppResult<()> {
    if let Some(config) = load_config(args.config.as_deref())? {
        apply_config(&mut args, matches, &config)?;
    }
    let ResolvedConfig {
        recording_id,
        api,
        features,
        output,
        output_format,
    } = ResolvedConfig::try_from(args)?;

    let api = HttpRecordingApi::new(&api)?;
    info!(
        recording_id = %recording_id,
        base_url = %api.base_url(),
        "Loading recording"
    );

    let view = load_recording(recording_id, api, features).await?;

    let rendered = render(&view, output_format)?;
    write_output(&rendered, output.as_deref())?;

    for failure in view.failures() {
        error!(status = ?failure.status(), "{}", failure);
    }
    view.failures()
        .next()
        .map_or(Ok(()), |failure| Err(AppError::loader(failure.clone())))
}

/// Mounts a loader and waits until nothing is left in flight. Ctrl-C stops
/// early with whatever has been merged so far.
async fn load_recording(
    recording_id: String,
    api: HttpRecordingApi,
    features: AvailableFeatures,
) -> AppResult<LoaderView> {
    let mut loader =
        RecordingLoader::mount(recording_id, Arc::new(api), features, Arc::new(TracingReporter));

    let settled = tokio::select! {
        view = loader.settled() => Some(view?),
        signal = tokio::signal::ctrl_c() => {
            signal?;
            warn!("Interrupted; writing the partially loaded recording");
            None
        }
    };
    let view = settled.unwrap_or_else(|| loader.view());
    loader.unmount().await?;
    Ok(view)
}
