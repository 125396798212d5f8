use std::path::{Path, PathBuf};
use std::time::Duration;

use bytes::Bytes;
use engine_logging::{engine_debug, engine_warn};
use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, Url};
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use validator_core::{basename, JobId, JobResult};

use crate::persist::{AtomicFileWriter, PersistError, StreamChunk};
use crate::wire::{ErrorBody, PageResponse, UploadResponse, WireJobResult};
use crate::{FailureKind, ResultPage, ServiceError, Submission};

const DOWNLOAD_CHANNEL_DEPTH: usize = 16;

#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// Every request is prefixed with this URL.
    pub base_url: String,
    pub upload_path: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            upload_path: "/upload".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// The remote service that validates uploaded CSV files.
#[async_trait::async_trait]
pub trait ValidationService: Send + Sync {
    async fn submit(&self, upload: &Path, email_column: &str) -> Result<Submission, ServiceError>;

    async fn job_status(&self, job_id: &JobId) -> Result<JobResult, ServiceError>;

    async fn list(&self, page: u32, limit: u32) -> Result<ResultPage, ServiceError>;

    async fn delete(&self, job_id: &JobId) -> Result<(), ServiceError>;

    /// Streams an artifact into `dest_dir`, returning the saved path.
    async fn download(&self, filename: &str, dest_dir: &Path) -> Result<PathBuf, ServiceError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestValidationService {
    settings: ServiceSettings,
    base: Url,
    client: reqwest::Client,
}

impl ReqwestValidationService {
    pub fn new(settings: ServiceSettings) -> Result<Self, ServiceError> {
        let base = Url::parse(settings.base_url.trim_end_matches('/'))
            .map_err(|err| ServiceError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ServiceError::new(
                FailureKind::InvalidUrl,
                format!("{} cannot be used as a base url", settings.base_url),
            ));
        }
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ServiceError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            settings,
            base,
            client,
        })
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    /// Public link for an artifact, with any server directory stripped.
    pub fn download_url(&self, filename: &str) -> Url {
        self.endpoint(&["download", basename(filename)])
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn upload_endpoint(&self) -> Url {
        let segments: Vec<&str> = self
            .settings
            .upload_path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();
        self.endpoint(&segments)
    }
}

#[async_trait::async_trait]
impl ValidationService for ReqwestValidationService {
    async fn submit(&self, upload: &Path, email_column: &str) -> Result<Submission, ServiceError> {
        let file_name = upload
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                ServiceError::new(FailureKind::Io, format!("{} is not a file", upload.display()))
            })?;
        let bytes = tokio::fs::read(upload)
            .await
            .map_err(|err| ServiceError::new(FailureKind::Io, err.to_string()))?;
        engine_debug!(
            "Uploading {} ({} bytes) with email column {:?}",
            file_name,
            bytes.len(),
            email_column
        );

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("text/csv")
            .map_err(map_reqwest_error)?;
        let form = Form::new()
            .part("csvFile", part)
            .text("emailColumn", email_column.to_string());

        let response = self
            .client
            .post(self.upload_endpoint())
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body = read_success(response).await?;
        let upload: UploadResponse = decode(&body)?;
        Ok(Submission {
            job_id: upload.record_id.into(),
            stored_file_name: upload.file_name,
        })
    }

    async fn job_status(&self, job_id: &JobId) -> Result<JobResult, ServiceError> {
        let response = self
            .client
            .get(self.endpoint(&["results", job_id.as_str()]))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body = read_success(response).await?;
        let wire: WireJobResult = decode(&body)?;
        wire.into_job_result(Some(job_id.clone()))
    }

    async fn list(&self, page: u32, limit: u32) -> Result<ResultPage, ServiceError> {
        let mut url = self.endpoint(&["results"]);
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("limit", &limit.to_string());
        let response = self.client.get(url).send().await.map_err(map_reqwest_error)?;
        let body = read_success(response).await?;
        let wire: PageResponse = decode(&body)?;

        let mut entries = Vec::with_capacity(wire.db_results.len());
        for item in wire.db_results {
            match item.into_job_result(None) {
                Ok(entry) => entries.push(entry),
                Err(err) => engine_warn!("Skipping unreadable result on page {}: {}", page, err),
            }
        }
        Ok(ResultPage {
            entries,
            total_pages: wire.total_pages,
        })
    }

    async fn delete(&self, job_id: &JobId) -> Result<(), ServiceError> {
        let response = self
            .client
            .delete(self.endpoint(&["results", job_id.as_str()]))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_success(response).await.map(|_| ())
    }

    async fn download(&self, filename: &str, dest_dir: &Path) -> Result<PathBuf, ServiceError> {
        let name = basename(filename);
        let response = self
            .client
            .get(self.download_url(name))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        if !response.status().is_success() {
            return Err(read_success(response)
                .await
                .err()
                .unwrap_or_else(|| ServiceError::new(FailureKind::Network, "unexpected status")));
        }

        // The file is written on the blocking pool; chunks cross over a bounded channel.
        let writer = AtomicFileWriter::new(dest_dir.to_path_buf());
        let (chunk_tx, chunk_rx) = mpsc::channel(DOWNLOAD_CHANNEL_DEPTH);
        let target = name.to_string();
        let persist = tokio::task::spawn_blocking(move || writer.write_stream(&target, chunk_rx));

        let mut received = 0u64;
        let mut transfer = Ok(());
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(data) => {
                    received += data.len() as u64;
                    if chunk_tx.send(StreamChunk::Data(data)).await.is_err() {
                        // The writer gave up; its error is reported below.
                        break;
                    }
                }
                Err(err) => {
                    transfer = Err(map_reqwest_error(err));
                    break;
                }
            }
        }
        if transfer.is_ok() {
            let _ = chunk_tx.send(StreamChunk::End).await;
        }
        drop(chunk_tx);

        let saved = persist
            .await
            .map_err(|err| ServiceError::new(FailureKind::Io, err.to_string()))?;
        transfer?;
        let saved = saved.map_err(map_persist_error)?;
        engine_debug!("Downloaded {} ({} bytes)", name, received);
        Ok(saved)
    }
}

/// Returns the body of a 2xx response, or the most specific error for anything else.
async fn read_success(response: Response) -> Result<Bytes, ServiceError> {
    let status = response.status();
    let body = response.bytes().await.map_err(map_reqwest_error)?;
    if status.is_success() {
        return Ok(body);
    }

    let server_message = serde_json::from_slice::<ErrorBody>(&body)
        .ok()
        .and_then(|body| body.error.or(body.message))
        .filter(|message| !message.trim().is_empty());
    Err(match server_message {
        Some(message) => ServiceError::new(
            FailureKind::Rejected {
                status: status.as_u16(),
            },
            message,
        ),
        None => ServiceError::new(FailureKind::HttpStatus(status.as_u16()), status.to_string()),
    })
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ServiceError> {
    serde_json::from_slice(body).map_err(|err| ServiceError::new(FailureKind::Decode, err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> ServiceError {
    if err.is_timeout() {
        return ServiceError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ServiceError::new(FailureKind::Decode, err.to_string());
    }
    ServiceError::new(FailureKind::Network, err.to_string())
}

fn map_persist_error(err: PersistError) -> ServiceError {
    ServiceError::new(FailureKind::Io, err.to_string())
}
