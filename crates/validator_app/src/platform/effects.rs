use std::sync::{mpsc, Arc};

use engine_logging::{engine_debug, engine_info};
use validator_core::{Effect, Msg};
use validator_engine::{EngineConfig, EngineEvent, EngineHandle, EventSink, ServiceError};

use super::commands::Input;

/// Hands core effects to the engine.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(config: EngineConfig, input_tx: mpsc::Sender<Input>) -> Result<Self, ServiceError> {
        let sink = Arc::new(MsgSink { tx: input_tx });
        let engine = EngineHandle::new(config, sink)?;
        Ok(Self { engine })
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SubmitJob { path, email_column } => {
                    engine_info!(
                        "SubmitJob file={} email_column={:?}",
                        path.display(),
                        email_column
                    );
                    self.engine.submit(path, email_column);
                }
                Effect::StartPolling { job_id } => self.engine.start_polling(job_id),
                Effect::CancelPolling { job_id } => self.engine.cancel_polling(job_id),
                Effect::FetchPage {
                    request_id,
                    page,
                    limit,
                } => {
                    engine_debug!("FetchPage request_id={} page={} limit={}", request_id, page, limit);
                    self.engine.fetch_page(request_id, page, limit);
                }
                Effect::DeleteJob { job_id } => {
                    engine_info!("DeleteJob job_id={}", job_id);
                    self.engine.delete(job_id);
                }
                Effect::DownloadArtifact { filename } => self.engine.download(filename),
            }
        }
    }
}

/// Feeds engine events back into the app loop as messages.
struct MsgSink {
    tx: mpsc::Sender<Input>,
}

impl EventSink for MsgSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(Input::Msg(event_to_msg(event)));
    }
}

pub fn event_to_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Submitted {
            job_id,
            stored_file_name,
            submitted_at,
        } => Msg::SubmitAccepted {
            job_id,
            stored_file_name,
            submitted_at,
        },
        EngineEvent::SubmitFailed { error } => Msg::SubmitRejected {
            message: error.server_message().map(str::to_string),
        },
        EngineEvent::PollProgress { job_id, status } => Msg::PollProgress { job_id, status },
        EngineEvent::PollFinished { job_id, result } => Msg::PollFinished {
            job_id,
            result: result.map_err(|err| err.to_string()),
        },
        EngineEvent::PageFetched { request_id, result } => match result {
            Ok(page) => Msg::PageLoaded {
                request_id,
                entries: page.entries,
                total_pages: page.total_pages,
            },
            Err(err) => Msg::PageLoadFailed {
                request_id,
                message: err.to_string(),
            },
        },
        EngineEvent::Deleted { job_id, result } => match result {
            Ok(()) => Msg::DeleteConfirmed { job_id },
            Err(err) => Msg::DeleteFailed {
                job_id,
                message: err.to_string(),
            },
        },
        EngineEvent::DownloadFinished { filename, result } => Msg::DownloadFinished {
            filename,
            result: result.map_err(|err| err.to_string()),
        },
    }
}
