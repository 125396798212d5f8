use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::filename::{basename, display_title};
use crate::view_model::{AppViewModel, DownloadLink, ResultRowView};
use crate::{Artifact, JobId, JobResult, Pagination, ResultStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// User-facing message (a toast in a graphical front-end).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Where the single in-flight upload is in its life.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UploadPhase {
    #[default]
    Idle,
    Submitting { original_file_name: String },
    Polling { job_id: JobId },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct UploadForm {
    pub(crate) file: Option<PathBuf>,
    pub(crate) email_column: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PendingDelete {
    pub(crate) index: usize,
    pub(crate) entry: JobResult,
    /// `(page, limit)` the entry was removed from.
    pub(crate) window: (u32, u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    pub(crate) store: ResultStore,
    pub(crate) pagination: Pagination,
    pub(crate) form: UploadForm,
    pub(crate) upload: UploadPhase,
    pub(crate) active_polls: BTreeSet<JobId>,
    pub(crate) pending_deletes: BTreeMap<JobId, PendingDelete>,
    /// Jobs marked failed locally because their status query failed, not
    /// because the service said so.
    pub(crate) transport_failures: BTreeSet<JobId>,
    notices: Vec<Notice>,
    dirty: bool,
    seen_revision: u64,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_limit(limit: u32) -> Self {
        Self {
            pagination: Pagination::new(limit),
            ..Self::default()
        }
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn upload_phase(&self) -> &UploadPhase {
        &self.upload
    }

    pub fn is_uploading(&self) -> bool {
        self.upload != UploadPhase::Idle
    }

    pub fn is_polling(&self, job_id: &JobId) -> bool {
        self.active_polls.contains(job_id)
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            rows: self.store.iter().map(row_view).collect(),
            page: self.pagination.page(),
            limit: self.pagination.limit(),
            total_pages: self.pagination.total_pages(),
            page_buttons: self.pagination.buttons(),
            selected_file: self.form.file.as_deref().map(file_name_of),
            email_column: self.form.email_column.clone(),
            is_uploading: self.is_uploading(),
            can_submit: self.form.file.is_some() && !self.is_uploading(),
        }
    }

    /// Returns whether anything visible changed since the last call, and resets.
    pub fn consume_dirty(&mut self) -> bool {
        let revision = self.store.revision();
        let was_dirty = self.dirty || revision != self.seen_revision;
        self.dirty = false;
        self.seen_revision = revision;
        was_dirty
    }

    /// Drains notices raised since the last call.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn notify_success(&mut self, message: impl Into<String>) {
        self.notices.push(Notice {
            level: NoticeLevel::Success,
            message: message.into(),
        });
    }

    pub(crate) fn notify_error(&mut self, message: impl Into<String>) {
        self.notices.push(Notice {
            level: NoticeLevel::Error,
            message: message.into(),
        });
    }

    /// Ends the in-flight upload if it belongs to `job_id`.
    pub(crate) fn release_upload_for(&mut self, job_id: &JobId) -> bool {
        let owns = matches!(&self.upload, UploadPhase::Polling { job_id: current } if current == job_id);
        if owns {
            self.upload = UploadPhase::Idle;
            self.mark_dirty();
        }
        owns
    }

    pub(crate) fn clear_form(&mut self) {
        self.form = UploadForm::default();
        self.mark_dirty();
    }
}

pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

fn row_view(entry: &JobResult) -> ResultRowView {
    let report = entry.report().cloned();
    let downloads = report
        .as_ref()
        .map(|report| {
            Artifact::ALL
                .iter()
                .filter_map(|&artifact| {
                    report.artifact(artifact).map(|name| DownloadLink {
                        artifact,
                        filename: basename(name).to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    ResultRowView {
        job_id: entry.id.clone(),
        title: display_title(&entry.original_file_name).to_string(),
        created_at: entry.created_at.clone(),
        status: entry.status(),
        report,
        downloads,
    }
}
