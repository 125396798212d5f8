//! Validator core: pure job-lifecycle state machine and view-model helpers.
mod effect;
mod filename;
mod job;
mod msg;
mod pagination;
mod state;
mod store;
mod update;
mod view_model;

pub use effect::Effect;
pub use filename::{basename, display_title, has_tabular_extension, TABULAR_EXTENSIONS};
pub use job::{Artifact, JobId, JobPatch, JobResult, JobState, JobStatus, ValidationReport};
pub use msg::Msg;
pub use pagination::{PageButtons, PageRequest, Pagination, DEFAULT_PAGE_LIMIT, PAGE_LIMIT_OPTIONS};
pub use state::{AppState, Notice, NoticeLevel, UploadPhase};
pub use store::ResultStore;
pub use update::{
    update, COMPLETED_MESSAGE, MISSING_INPUT_MESSAGE, UPLOAD_FAILED_MESSAGE,
    WRONG_EXTENSION_MESSAGE,
};
pub use view_model::{AppViewModel, DownloadLink, ResultRowView};
