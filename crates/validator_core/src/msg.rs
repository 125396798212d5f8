use std::path::PathBuf;

use crate::{Artifact, JobId, JobResult, JobStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Load (or reload) the current page from the service.
    Refresh,
    /// User picked a file to upload.
    FileSelected(PathBuf),
    /// User edited the email column input.
    EmailColumnChanged(String),
    /// User pressed "Validate Emails".
    SubmitClicked,
    /// The service acknowledged the upload.
    SubmitAccepted {
        job_id: JobId,
        stored_file_name: String,
        submitted_at: String,
    },
    /// The upload request failed; `message` is the server's explanation if it sent one.
    SubmitRejected { message: Option<String> },
    /// A poll returned a non-terminal status.
    PollProgress { job_id: JobId, status: JobStatus },
    /// A polling loop ended, either with the terminal job or a transport error.
    PollFinished {
        job_id: JobId,
        result: Result<JobResult, String>,
    },
    /// User clicked a numbered page button.
    PageRequested(u32),
    NextPage,
    PrevPage,
    /// User picked a new page size.
    LimitChanged(u32),
    PageLoaded {
        request_id: u64,
        entries: Vec<JobResult>,
        total_pages: u32,
    },
    PageLoadFailed { request_id: u64, message: String },
    /// User clicked the delete icon on a row.
    DeleteClicked { job_id: JobId },
    DeleteConfirmed { job_id: JobId },
    DeleteFailed { job_id: JobId, message: String },
    /// User clicked one of a completed row's download links.
    DownloadClicked { job_id: JobId, artifact: Artifact },
    DownloadFinished {
        filename: String,
        result: Result<PathBuf, String>,
    },
}
