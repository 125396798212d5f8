use std::fmt;
use std::path::PathBuf;

use validator_core::{JobId, JobResult, JobStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub job_id: JobId,
    /// Name under which the service stored the upload.
    pub stored_file_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultPage {
    pub entries: Vec<JobResult>,
    pub total_pages: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Submitted {
        job_id: JobId,
        stored_file_name: String,
        submitted_at: String,
    },
    SubmitFailed {
        error: ServiceError,
    },
    PollProgress {
        job_id: JobId,
        status: JobStatus,
    },
    PollFinished {
        job_id: JobId,
        result: Result<JobResult, ServiceError>,
    },
    PageFetched {
        request_id: u64,
        result: Result<ResultPage, ServiceError>,
    },
    Deleted {
        job_id: JobId,
        result: Result<(), ServiceError>,
    },
    DownloadFinished {
        filename: String,
        result: Result<PathBuf, ServiceError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ServiceError {
    pub kind: FailureKind,
    pub message: String,
}

impl ServiceError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// The explanation the service itself sent, if it sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self.kind {
            FailureKind::Rejected { .. } => Some(&self.message),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    /// Non-success status with a JSON `error` body.
    Rejected { status: u16 },
    HttpStatus(u16),
    Timeout,
    Network,
    Decode,
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::Rejected { status } => write!(f, "rejected with status {status}"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "malformed response"),
            FailureKind::Io => write!(f, "io error"),
        }
    }
}
