use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use validator_core::JobId;

use crate::poller::{poll_job, EventSink, PollOutcome, PollSettings};
use crate::service::{ReqwestValidationService, ServiceSettings, ValidationService};
use crate::{EngineEvent, ServiceError};

#[derive(Clone)]
pub struct EngineConfig {
    pub service: ServiceSettings,
    pub poll: PollSettings,
    /// Where downloaded artifacts are written.
    pub output_dir: PathBuf,
    /// Timestamp stamped on freshly submitted jobs.
    pub submitted_utc: Arc<dyn Fn() -> String + Send + Sync>,
}

impl EngineConfig {
    pub fn default_with_output(output_dir: PathBuf) -> Self {
        Self {
            service: ServiceSettings::default(),
            poll: PollSettings::default(),
            output_dir,
            submitted_utc: Arc::new(|| chrono::Utc::now().to_rfc3339()),
        }
    }
}

enum EngineCommand {
    Submit { path: PathBuf, email_column: String },
    StartPolling { job_id: JobId },
    CancelPolling { job_id: JobId },
    FetchPage { request_id: u64, page: u32, limit: u32 },
    Delete { job_id: JobId },
    Download { filename: String },
}

/// Runs all service traffic on a single-threaded runtime owned by a background thread.
pub struct EngineHandle {
    cmd_tx: mpsc::UnboundedSender<EngineCommand>,
    shared: Arc<Shared>,
}

struct Shared {
    service: Arc<dyn ValidationService>,
    sink: Arc<dyn EventSink>,
    poll: PollSettings,
    output_dir: PathBuf,
    submitted_utc: Arc<dyn Fn() -> String + Send + Sync>,
    polls: Mutex<PollRegistry>,
}

#[derive(Default)]
struct PollRegistry {
    next_generation: u64,
    active: HashMap<JobId, (u64, CancellationToken)>,
}

impl EngineHandle {
    /// Starts an engine talking to the configured Validation Service over HTTP.
    pub fn new(config: EngineConfig, sink: Arc<dyn EventSink>) -> Result<Self, ServiceError> {
        let service = ReqwestValidationService::new(config.service.clone())?;
        Ok(Self::with_service(config, Arc::new(service), sink))
    }

    pub fn with_service(
        config: EngineConfig,
        service: Arc<dyn ValidationService>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            service,
            sink,
            poll: config.poll,
            output_dir: config.output_dir,
            submitted_utc: config.submitted_utc,
            polls: Mutex::new(PollRegistry::default()),
        });

        let engine = shared.clone();
        thread::spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(err) => {
                    engine_error!("Failed to start engine runtime: {}", err);
                    return;
                }
            };
            runtime.block_on(run(engine, cmd_rx));
        });

        Self { cmd_tx, shared }
    }

    pub fn submit(&self, path: PathBuf, email_column: impl Into<String>) {
        self.send(EngineCommand::Submit {
            path,
            email_column: email_column.into(),
        });
    }

    pub fn start_polling(&self, job_id: JobId) {
        self.send(EngineCommand::StartPolling { job_id });
    }

    pub fn cancel_polling(&self, job_id: JobId) {
        self.send(EngineCommand::CancelPolling { job_id });
    }

    pub fn fetch_page(&self, request_id: u64, page: u32, limit: u32) {
        self.send(EngineCommand::FetchPage {
            request_id,
            page,
            limit,
        });
    }

    pub fn delete(&self, job_id: JobId) {
        self.send(EngineCommand::Delete { job_id });
    }

    pub fn download(&self, filename: impl Into<String>) {
        self.send(EngineCommand::Download {
            filename: filename.into(),
        });
    }

    pub fn is_polling(&self, job_id: &JobId) -> bool {
        self.shared.registry().active.contains_key(job_id)
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            engine_warn!("Engine is not running; command dropped");
        }
    }
}

async fn run(shared: Arc<Shared>, mut cmd_rx: mpsc::UnboundedReceiver<EngineCommand>) {
    while let Some(command) = cmd_rx.recv().await {
        match command {
            EngineCommand::StartPolling { job_id } => shared.start_poll(job_id),
            EngineCommand::CancelPolling { job_id } => shared.cancel_poll(&job_id),
            other => {
                let shared = shared.clone();
                tokio::spawn(async move { shared.handle(other).await });
            }
        }
    }
    engine_debug!("Engine command channel closed; cancelling polls");
    for (_, (_, token)) in shared.registry().active.drain() {
        token.cancel();
    }
}

impl Shared {
    fn registry(&self) -> std::sync::MutexGuard<'_, PollRegistry> {
        self.polls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn start_poll(self: &Arc<Self>, job_id: JobId) {
        let token = CancellationToken::new();
        let generation = {
            let mut registry = self.registry();
            if registry.active.contains_key(&job_id) {
                engine_debug!("Job {} already has a polling loop", job_id);
                return;
            }
            registry.next_generation += 1;
            let generation = registry.next_generation;
            registry
                .active
                .insert(job_id.clone(), (generation, token.clone()));
            generation
        };
        engine_info!("Polling started for job {}", job_id);

        let shared = self.clone();
        tokio::spawn(async move {
            let outcome = poll_job(
                shared.service.as_ref(),
                &job_id,
                &shared.poll,
                &token,
                shared.sink.as_ref(),
            )
            .await;
            shared.forget_poll(&job_id, generation);
            match outcome {
                PollOutcome::Finished(result) => {
                    engine_info!(
                        "Polling finished for job {} ({})",
                        job_id,
                        match &result {
                            Ok(job) => job.status().to_string(),
                            Err(err) => err.to_string(),
                        }
                    );
                    shared.sink.emit(EngineEvent::PollFinished { job_id, result });
                }
                PollOutcome::Cancelled => engine_info!("Polling cancelled for job {}", job_id),
            }
        });
    }

    fn cancel_poll(&self, job_id: &JobId) {
        if let Some((_, token)) = self.registry().active.remove(job_id) {
            token.cancel();
        }
    }

    /// Drops the registry entry only if it still belongs to the loop that finished.
    fn forget_poll(&self, job_id: &JobId, generation: u64) {
        let mut registry = self.registry();
        if matches!(registry.active.get(job_id), Some((current, _)) if *current == generation) {
            registry.active.remove(job_id);
        }
    }

    async fn handle(&self, command: EngineCommand) {
        match command {
            EngineCommand::Submit { path, email_column } => {
                match self.service.submit(&path, &email_column).await {
                    Ok(submission) => {
                        engine_info!(
                            "Submission accepted job_id={} stored_as={}",
                            submission.job_id,
                            submission.stored_file_name
                        );
                        self.sink.emit(EngineEvent::Submitted {
                            job_id: submission.job_id,
                            stored_file_name: submission.stored_file_name,
                            submitted_at: (self.submitted_utc)(),
                        });
                    }
                    Err(error) => {
                        engine_warn!("Submission of {} failed: {}", path.display(), error);
                        self.sink.emit(EngineEvent::SubmitFailed { error });
                    }
                }
            }
            EngineCommand::FetchPage {
                request_id,
                page,
                limit,
            } => {
                engine_debug!(
                    "Fetching page={} limit={} request_id={}",
                    page,
                    limit,
                    request_id
                );
                let result = self.service.list(page, limit).await;
                if let Err(err) = &result {
                    engine_warn!("Page fetch request_id={} failed: {}", request_id, err);
                }
                self.sink
                    .emit(EngineEvent::PageFetched { request_id, result });
            }
            EngineCommand::Delete { job_id } => {
                let result = self.service.delete(&job_id).await;
                match &result {
                    Ok(()) => engine_info!("Deleted job {}", job_id),
                    Err(err) => engine_warn!("Delete of job {} failed: {}", job_id, err),
                }
                self.sink.emit(EngineEvent::Deleted { job_id, result });
            }
            EngineCommand::Download { filename } => {
                let result = self.service.download(&filename, &self.output_dir).await;
                match &result {
                    Ok(path) => engine_info!("Saved {} to {}", filename, path.display()),
                    Err(err) => engine_warn!("Download of {} failed: {}", filename, err),
                }
                self.sink
                    .emit(EngineEvent::DownloadFinished { filename, result });
            }
            EngineCommand::StartPolling { .. } | EngineCommand::CancelPolling { .. } => {}
        }
    }
}
