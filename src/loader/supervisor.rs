use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::api::RecordingApi;
use crate::error::{AppError, AppResult, LoaderError};

use super::actions::{Action, Effect, FetchRequest, LoaderCommand};
use super::features::AvailableFeatures;
use super::machine::transition;
use super::report::{RecordingReport, ReportKind, UsageReporter};
use super::state::{LoaderState, LoaderView};

/// A fetch outcome tagged with the generation that issued it.
struct Completion {
    generation: u64,
    action: Action,
}

/// Handle to one mounted recording loader.
///
/// Mounting spawns a supervising task that owns all loader state; the
/// handle only sends commands and observes the published [`LoaderView`].
/// Dropping the handle without [`RecordingLoader::unmount`] also stops the
/// supervisor once it notices the command channel closed.
pub struct RecordingLoader {
    commands: mpsc::UnboundedSender<LoaderCommand>,
    view_rx: watch::Receiver<LoaderView>,
    commands_sent: u64,
    task: JoinHandle<()>,
}

impl RecordingLoader {
    /// Mounts a loader for `recording_id` and starts loading the entire
    /// recording. Must be called from within a tokio runtime.
    #[must_use]
    pub fn mount(
        recording_id: impl Into<String>,
        api: Arc<dyn RecordingApi>,
        features: AvailableFeatures,
        reporter: Arc<dyn UsageReporter>,
    ) -> Self {
        let state = LoaderState::new(recording_id);
        let (view_tx, view_rx) = watch::channel(LoaderView::from_state(&state, 0));
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();

        let supervisor = Supervisor {
            state,
            api,
            features,
            reporter,
            completions_tx,
            view_tx,
            in_flight: Vec::new(),
            mounted_at: Instant::now(),
            commands_processed: 0,
        };
        let task = tokio::spawn(supervisor.run(commands_rx, completions_rx));

        let mut loader = Self {
            commands: commands_tx,
            view_rx,
            commands_sent: 0,
            task,
        };
        if loader.dispatch(LoaderCommand::LoadEntireRecording).is_err() {
            warn!("Recording loader stopped during mount");
        }
        loader
    }

    /// Sends a command to the supervisor.
    ///
    /// # Errors
    ///
    /// Returns an error when the supervisor has already stopped.
    pub fn dispatch(&mut self, command: LoaderCommand) -> AppResult<()> {
        self.commands
            .send(command)
            .map_err(|_err| AppError::loader(LoaderError::Stopped))?;
        self.commands_sent = self.commands_sent.saturating_add(1);
        Ok(())
    }

    #[must_use]
    pub fn view(&self) -> LoaderView {
        self.view_rx.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<LoaderView> {
        self.view_rx.clone()
    }

    /// Waits until every command sent so far has been processed and no
    /// request is in flight.
    ///
    /// # Errors
    ///
    /// Returns an error when the supervisor stops before settling.
    pub async fn settled(&mut self) -> AppResult<LoaderView> {
        let sent = self.commands_sent;
        let view = self
            .view_rx
            .wait_for(|view| view.commands_processed >= sent && view.is_settled())
            .await
            .map_err(|_err| AppError::loader(LoaderError::Stopped))?;
        Ok(view.clone())
    }

    /// Stops the supervisor. Responses still in flight are discarded.
    ///
    /// # Errors
    ///
    /// Returns an error when the supervisor task panicked.
    pub async fn unmount(self) -> AppResult<()> {
        if self.commands.send(LoaderCommand::Unmount).is_err() {
            debug!("Recording loader already stopped");
        }
        self.task.await?;
        Ok(())
    }
}

struct Supervisor {
    state: LoaderState,
    api: Arc<dyn RecordingApi>,
    features: AvailableFeatures,
    reporter: Arc<dyn UsageReporter>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    view_tx: watch::Sender<LoaderView>,
    in_flight: Vec<JoinHandle<()>>,
    mounted_at: Instant,
    commands_processed: u64,
}

impl Supervisor {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<LoaderCommand>,
        mut completions: mpsc::UnboundedReceiver<Completion>,
    ) {
        loop {
            tokio::select! {
                command = commands.recv() => {
                    let Some(command) = command else {
                        break;
                    };
                    if !self.handle_command(command) {
                        break;
                    }
                }
                Some(completion) = completions.recv() => {
                    if completion.generation == self.state.generation {
                        self.apply(completion.action);
                    } else {
                        debug!(
                            action = completion.action.name(),
                            generation = completion.generation,
                            current = self.state.generation,
                            "Discarding stale response"
                        );
                    }
                }
            }
            self.publish();
        }
        self.abort_in_flight();
        debug!(recording_id = %self.state.recording_id, "Recording loader unmounted");
    }

    /// Returns `false` once the loader should stop.
    fn handle_command(&mut self, command: LoaderCommand) -> bool {
        self.commands_processed = self.commands_processed.saturating_add(1);
        match command {
            LoaderCommand::Unmount => return false,
            LoaderCommand::Remount => {
                self.abort_in_flight();
                self.apply(Action::Reset);
                self.mounted_at = Instant::now();
                self.apply(Action::LoadEntireRecording);
            }
            LoaderCommand::LoadEntireRecording => self.apply(Action::LoadEntireRecording),
            LoaderCommand::LoadRecordingMeta => self.apply(Action::LoadRecordingMeta),
            LoaderCommand::LoadRecordingSnapshots { next } => {
                self.apply(Action::LoadRecordingSnapshots { next });
            }
            LoaderCommand::LoadEvents { next } => self.apply(Action::LoadEvents { next }),
            LoaderCommand::LoadPerformanceEvents => self.apply(Action::LoadPerformanceEvents),
        }
        true
    }

    fn apply(&mut self, action: Action) {
        if let Some(error) = action.failure() {
            warn!(recording_id = %self.state.recording_id, "{}", error);
        } else {
            debug!(action = action.name(), "Applying");
        }
        let effects = transition(&mut self.state, action, &self.features);
        for effect in effects {
            match effect {
                Effect::Fetch(request) => self.spawn_fetch(request),
                Effect::Report(kind) => self.report(kind),
            }
        }
    }

    fn spawn_fetch(&mut self, request: FetchRequest) {
        let api = Arc::clone(&self.api);
        let completions_tx = self.completions_tx.clone();
        let generation = self.state.generation;
        let recording_id = self.state.recording_id.clone();
        let handle = tokio::spawn(async move {
            let action = perform_fetch(api.as_ref(), &recording_id, request).await;
            // Fails only once the supervisor is gone.
            let _delivered = completions_tx.send(Completion { generation, action });
        });
        self.in_flight.retain(|task| !task.is_finished());
        self.in_flight.push(handle);
    }

    fn report(&self, kind: ReportKind) {
        let report = RecordingReport {
            kind,
            recording_id: self.state.recording_id.clone(),
            recording_duration_ms: self.state.player.metadata.recording_duration_ms,
            snapshot_chunks: self.state.chunk_pagination_index,
            event_count: self.state.event_count(),
            performance_event_count: self.state.performance_events.len(),
            elapsed: self.mounted_at.elapsed(),
        };
        self.reporter.report_recording(&report);
    }

    fn publish(&self) {
        self.view_tx
            .send_replace(LoaderView::from_state(&self.state, self.commands_processed));
    }

    fn abort_in_flight(&mut self) {
        for task in self.in_flight.drain(..) {
            task.abort();
        }
    }
}

async fn perform_fetch(api: &dyn RecordingApi, recording_id: &str, request: FetchRequest) -> Action {
    match request {
        FetchRequest::Meta => match api.recording_meta(recording_id).await {
            Ok(response) => Action::LoadRecordingMetaSuccess(Box::new(response)),
            Err(cause) => Action::LoadRecordingMetaFailure(LoaderError::MetadataFetch { cause }),
        },
        FetchRequest::Snapshots { cursor } => {
            match api.recording_snapshots(recording_id, cursor.as_deref()).await {
                Ok(response) => Action::LoadRecordingSnapshotsSuccess(Box::new(response)),
                Err(cause) => {
                    Action::LoadRecordingSnapshotsFailure(LoaderError::SnapshotFetch { cause })
                }
            }
        }
        FetchRequest::Events(request) => match api.events(&request).await {
            Ok(response) => Action::LoadEventsSuccess(Box::new(response)),
            Err(cause) => Action::LoadEventsFailure(LoaderError::EventsFetch { cause }),
        },
        FetchRequest::Performance(params) => match api.performance_events(&params).await {
            Ok(response) => Action::LoadPerformanceEventsSuccess(Box::new(response)),
            Err(cause) => {
                Action::LoadPerformanceEventsFailure(LoaderError::PerformanceFetch { cause })
            }
        },
    }
}
