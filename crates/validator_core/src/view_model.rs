use crate::{Artifact, JobId, JobStatus, PageButtons, ValidationReport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppViewModel {
    pub rows: Vec<ResultRowView>,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
    pub page_buttons: PageButtons,
    pub selected_file: Option<String>,
    pub email_column: String,
    pub is_uploading: bool,
    pub can_submit: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRowView {
    pub job_id: JobId,
    pub title: String,
    pub created_at: String,
    pub status: JobStatus,
    pub report: Option<ValidationReport>,
    /// Bare filenames, ready to append to the download route.
    pub downloads: Vec<DownloadLink>,
}

impl ResultRowView {
    pub fn is_in_progress(&self) -> bool {
        matches!(self.status, JobStatus::Pending | JobStatus::Processing)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLink {
    pub artifact: Artifact,
    pub filename: String,
}
