use std::fmt;
use std::str::FromStr;

/// Opaque job identifier assigned by the Validation Service.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for JobId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    fn rank(self) -> u8 {
        match self {
            JobStatus::Pending => 0,
            JobStatus::Processing => 1,
            JobStatus::Completed | JobStatus::Failed => 2,
        }
    }

    /// Whether a job currently in `self` may move to `next`.
    ///
    /// Terminal statuses never move again; everything else may stay put or advance.
    pub fn can_advance_to(self, next: JobStatus) -> bool {
        !self.is_terminal() && next.rank() >= self.rank()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(JobStatus::Pending),
            "processing" => Ok(JobStatus::Processing),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            other => Err(format!("unknown job status `{other}`")),
        }
    }
}

/// Downloadable files produced by a completed job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Artifact {
    Report,
    Valid,
    Invalid,
}

impl Artifact {
    pub const ALL: [Artifact; 3] = [Artifact::Report, Artifact::Valid, Artifact::Invalid];

    pub fn label(self) -> &'static str {
        match self {
            Artifact::Report => "report",
            Artifact::Valid => "valid",
            Artifact::Invalid => "invalid",
        }
    }
}

impl FromStr for Artifact {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "report" => Ok(Artifact::Report),
            "valid" => Ok(Artifact::Valid),
            "invalid" => Ok(Artifact::Invalid),
            other => Err(format!("unknown artifact `{other}` (expected report, valid or invalid)")),
        }
    }
}

/// Metrics and artifact references of a completed job.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationReport {
    pub valid: u64,
    pub disposable: u64,
    pub syntax_invalid: u64,
    pub dns_invalid: u64,
    pub report_filename: Option<String>,
    pub valid_filename: Option<String>,
    pub invalid_filename: Option<String>,
}

impl ValidationReport {
    pub fn artifact(&self, artifact: Artifact) -> Option<&str> {
        match artifact {
            Artifact::Report => self.report_filename.as_deref(),
            Artifact::Valid => self.valid_filename.as_deref(),
            Artifact::Invalid => self.invalid_filename.as_deref(),
        }
    }
}

/// Lifecycle state of a job. Only `Completed` carries a report, so metrics can
/// never be observed on an unfinished job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Processing,
    Completed(ValidationReport),
    Failed,
}

impl JobState {
    pub fn status(&self) -> JobStatus {
        match self {
            JobState::Pending => JobStatus::Pending,
            JobState::Processing => JobStatus::Processing,
            JobState::Completed(_) => JobStatus::Completed,
            JobState::Failed => JobStatus::Failed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobResult {
    pub id: JobId,
    pub original_file_name: String,
    /// RFC 3339 timestamp.
    pub created_at: String,
    pub state: JobState,
    /// Server-side copy of the uploaded CSV, already reduced to a bare filename.
    pub stored_file: Option<String>,
}

impl JobResult {
    /// Entry shown between submission acknowledgement and the first authoritative data.
    pub fn optimistic(
        id: JobId,
        original_file_name: impl Into<String>,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            id,
            original_file_name: original_file_name.into(),
            created_at: created_at.into(),
            state: JobState::Processing,
            stored_file: None,
        }
    }

    pub fn status(&self) -> JobStatus {
        self.state.status()
    }

    pub fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }

    pub fn report(&self) -> Option<&ValidationReport> {
        match &self.state {
            JobState::Completed(report) => Some(report),
            _ => None,
        }
    }
}

/// Partial update applied to a stored entry. `None` fields are left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobPatch {
    pub state: Option<JobState>,
    pub created_at: Option<String>,
    pub stored_file: Option<String>,
}

impl JobPatch {
    pub fn state(state: JobState) -> Self {
        Self {
            state: Some(state),
            ..Self::default()
        }
    }

    /// Everything the server reports about a job, except the locally chosen
    /// `original_file_name`.
    pub fn from_result(result: JobResult) -> Self {
        Self {
            state: Some(result.state),
            created_at: Some(result.created_at),
            stored_file: result.stored_file,
        }
    }

    /// Applies the patch, returning whether the entry changed.
    ///
    /// Terminal entries are frozen and a patch that would lower the status is
    /// rejected as a whole.
    pub(crate) fn apply_to(self, entry: &mut JobResult) -> bool {
        if entry.is_terminal() {
            return false;
        }
        if let Some(state) = &self.state {
            if !entry.status().can_advance_to(state.status()) {
                return false;
            }
        }

        let before = entry.clone();
        if let Some(state) = self.state {
            entry.state = state;
        }
        if let Some(created_at) = self.created_at {
            entry.created_at = created_at;
        }
        if let Some(stored_file) = self.stored_file {
            entry.stored_file = Some(stored_file);
        }
        *entry != before
    }
}
