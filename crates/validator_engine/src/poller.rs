use std::sync::mpsc;
use std::time::Duration;

use engine_logging::{engine_debug, engine_warn};
use tokio_util::sync::CancellationToken;
use validator_core::{JobId, JobResult};

use crate::{EngineEvent, ServiceError, ValidationService};

#[derive(Debug, Clone)]
pub struct PollSettings {
    /// Pause between a non-terminal answer and the next status query.
    pub interval: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
        }
    }
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The job reached a terminal status, or the status query itself failed.
    Finished(Result<JobResult, ServiceError>),
    Cancelled,
}

/// Queries `job_id` until it is terminal, reporting non-terminal statuses to `sink`.
///
/// Queries are strictly sequential. Once `cancel` fires no further query is
/// issued and nothing more is emitted.
pub async fn poll_job(
    service: &dyn ValidationService,
    job_id: &JobId,
    settings: &PollSettings,
    cancel: &CancellationToken,
    sink: &dyn EventSink,
) -> PollOutcome {
    let mut attempt: u32 = 0;
    loop {
        if cancel.is_cancelled() {
            return PollOutcome::Cancelled;
        }
        attempt += 1;
        engine_debug!("Polling job_id={} attempt={}", job_id, attempt);

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return PollOutcome::Cancelled,
            result = service.job_status(job_id) => result,
        };
        if cancel.is_cancelled() {
            return PollOutcome::Cancelled;
        }

        match result {
            Ok(job) if job.is_terminal() => return PollOutcome::Finished(Ok(job)),
            Ok(job) => sink.emit(EngineEvent::PollProgress {
                job_id: job_id.clone(),
                status: job.status(),
            }),
            Err(err) => {
                engine_warn!("Status query for job_id={} failed: {}", job_id, err);
                return PollOutcome::Finished(Err(err));
            }
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return PollOutcome::Cancelled,
            _ = tokio::time::sleep(settings.interval) => {}
        }
    }
}
