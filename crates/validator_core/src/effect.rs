use std::path::PathBuf;

use crate::JobId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SubmitJob { path: PathBuf, email_column: String },
    StartPolling { job_id: JobId },
    CancelPolling { job_id: JobId },
    FetchPage { request_id: u64, page: u32, limit: u32 },
    DeleteJob { job_id: JobId },
    DownloadArtifact { filename: String },
}

impl From<crate::PageRequest> for Effect {
    fn from(request: crate::PageRequest) -> Self {
        Effect::FetchPage {
            request_id: request.request_id,
            page: request.page,
            limit: request.limit,
        }
    }
}
