//! JSON shapes exchanged with the Validation Service.

use serde::Deserialize;
use validator_core::{basename, JobId, JobResult, JobState, JobStatus, ValidationReport};

use crate::{FailureKind, ServiceError};

/// Ids arrive as strings from some deployments and as numbers from others.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum WireId {
    Text(String),
    Number(i64),
}

impl From<WireId> for JobId {
    fn from(value: WireId) -> Self {
        match value {
            WireId::Text(text) => JobId::new(text),
            WireId::Number(number) => JobId::new(number.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UploadResponse {
    pub(crate) file_name: String,
    #[serde(alias = "jobId")]
    pub(crate) record_id: WireId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PageResponse {
    pub(crate) db_results: Vec<WireJobResult>,
    #[serde(default)]
    pub(crate) total_pages: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub(crate) error: Option<String>,
    pub(crate) message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireJobResult {
    #[serde(alias = "_id", alias = "recordId", alias = "jobId")]
    pub(crate) id: Option<WireId>,
    #[serde(default)]
    original_file_name: Option<String>,
    status: String,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    valid: Option<u64>,
    #[serde(default)]
    disposable: Option<u64>,
    #[serde(default)]
    syntax_invalid: Option<u64>,
    #[serde(default)]
    dns_invalid: Option<u64>,
    #[serde(default)]
    report_filename: Option<String>,
    #[serde(default)]
    valid_filename: Option<String>,
    #[serde(default)]
    invalid_filename: Option<String>,
    #[serde(default)]
    csv_path: Option<String>,
}

impl WireJobResult {
    /// Converts to the domain model. `id` overrides whatever id the body carried.
    pub(crate) fn into_job_result(self, id: Option<JobId>) -> Result<JobResult, ServiceError> {
        let id = id
            .or_else(|| self.id.map(JobId::from))
            .ok_or_else(|| ServiceError::new(FailureKind::Decode, "job result without id"))?;
        let status: JobStatus = self
            .status
            .parse()
            .map_err(|err: String| ServiceError::new(FailureKind::Decode, err))?;

        let state = match status {
            JobStatus::Pending => JobState::Pending,
            JobStatus::Processing => JobState::Processing,
            JobStatus::Failed => JobState::Failed,
            JobStatus::Completed => JobState::Completed(ValidationReport {
                valid: self.valid.unwrap_or(0),
                disposable: self.disposable.unwrap_or(0),
                syntax_invalid: self.syntax_invalid.unwrap_or(0),
                dns_invalid: self.dns_invalid.unwrap_or(0),
                report_filename: self.report_filename,
                valid_filename: self.valid_filename,
                invalid_filename: self.invalid_filename,
            }),
        };

        Ok(JobResult {
            id,
            original_file_name: self.original_file_name.unwrap_or_default(),
            created_at: self.created_at.unwrap_or_default(),
            state,
            stored_file: self.csv_path.as_deref().map(|path| basename(path).to_string()),
        })
    }
}
