//! Validator engine: Validation Service client, polling loops and effect execution.
mod engine;
mod persist;
mod poller;
mod service;
mod types;
mod wire;

pub use engine::{EngineConfig, EngineHandle};
pub use persist::{ensure_output_dir, AtomicFileWriter, PendingFile, PersistError, StreamChunk};
pub use poller::{poll_job, ChannelEventSink, EventSink, PollOutcome, PollSettings};
pub use service::{ReqwestValidationService, ServiceSettings, ValidationService};
pub use types::{EngineEvent, FailureKind, ResultPage, ServiceError, Submission};
