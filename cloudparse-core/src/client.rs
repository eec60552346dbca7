//! High-level client: orchestrates submit -> poll -> fetch against the
//! hosted parsing service.
//!
//! This module provides the top-level entry points for parsing a file into
//! [`Document`] records:
//!   - Validates the input is a supported type before any network call
//!   - Submits the file and receives a job id
//!   - Polls the job status at the configured interval until terminal
//!   - On success fetches and decodes the result payload
//!
//! # Major Types
//! - [`CloudParseClient`]: the client, generic over a [`ParseTransport`]
//!
//! # Concurrency
//! One logical operation per call; no shared mutable state between calls.
//! The async entry points suspend only at network I/O and sleep boundaries.
//! The blocking variants drive the same async implementation on a
//! current-thread runtime, so polling logic exists exactly once. Abandoning
//! a call stops further polling but does not cancel the remote job.
//!
//! # Error Handling
//! Transient network errors are retried a bounded number of times with a
//! doubling backoff; all other errors propagate immediately. No partial
//! results: the caller gets the full document sequence or an error.

use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::future::try_join_all;
use tracing::{debug, error, info, warn};

use crate::config::ParseConfig;
use crate::contract::{Document, FileExtractor, JobStatus, ParseError, ParseTransport};
use crate::transport::HttpTransport;

/// File extensions the remote service accepts.
const SUPPORTED_EXTENSIONS: &[&str] = &["pdf"];

/// Initial delay before retrying a transient network error; doubles per try.
const RETRY_BASE_DELAY_MS: u64 = 500;

/// Client for the hosted parsing service. Holds immutable configuration and
/// a transport; safe to share across tasks.
pub struct CloudParseClient<T: ParseTransport = HttpTransport> {
    config: ParseConfig,
    transport: T,
}

impl CloudParseClient<HttpTransport> {
    /// Build a client over the real HTTP transport.
    pub fn new(config: ParseConfig) -> Result<Self, ParseError> {
        if config.api_key.is_empty() {
            return Err(ParseError::Authentication("API key is required".to_string()));
        }
        let transport = HttpTransport::new(&config)?;
        Ok(Self { config, transport })
    }

    /// Build a client from `CLOUDPARSE_API_KEY` / `CLOUDPARSE_BASE_URL`.
    pub fn from_env() -> Result<Self, ParseError> {
        Self::new(ParseConfig::from_env()?)
    }
}

impl<T: ParseTransport> CloudParseClient<T> {
    /// Build a client over a caller-supplied transport (tests, alternate
    /// wire implementations).
    pub fn with_transport(config: ParseConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ParseConfig {
        &self.config
    }

    /// Parse the file at `path` into documents. Fails with
    /// [`ParseError::UnsupportedFormat`] before any network call if the
    /// extension is not supported.
    pub async fn parse(&self, path: impl AsRef<Path>) -> Result<Vec<Document>, ParseError> {
        let path = path.as_ref();
        ensure_supported(path)?;

        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.pdf")
            .to_string();

        let mut metadata = HashMap::new();
        metadata.insert(
            "file_path".to_string(),
            serde_json::Value::from(path.display().to_string()),
        );
        metadata.insert(
            "file_name".to_string(),
            serde_json::Value::from(file_name.clone()),
        );

        self.run_job(&file_name, bytes, metadata).await
    }

    /// Parse in-memory bytes. `file_name` determines the format check and
    /// the name reported to the service.
    pub async fn parse_bytes(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Vec<Document>, ParseError> {
        ensure_supported(Path::new(file_name))?;

        let mut metadata = HashMap::new();
        metadata.insert(
            "file_name".to_string(),
            serde_json::Value::from(file_name.to_string()),
        );

        self.run_job(file_name, bytes, metadata).await
    }

    /// Blocking equivalent of [`CloudParseClient::parse`]: identical
    /// constraints and outputs, driven on a current-thread runtime.
    pub fn parse_blocking(&self, path: impl AsRef<Path>) -> Result<Vec<Document>, ParseError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.parse(path))
    }

    /// Blocking equivalent of [`CloudParseClient::parse_bytes`].
    pub fn parse_bytes_blocking(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Vec<Document>, ParseError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.parse_bytes(file_name, bytes))
    }

    /// Parse several files, failing fast on the first error. Each file gets
    /// its own job; jobs are awaited together.
    pub async fn parse_many<P: AsRef<Path>>(
        &self,
        paths: &[P],
    ) -> Result<Vec<Vec<Document>>, ParseError> {
        try_join_all(paths.iter().map(|p| self.parse(p))).await
    }

    async fn run_job(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        mut metadata: HashMap<String, serde_json::Value>,
    ) -> Result<Vec<Document>, ParseError> {
        let result_type = self.config.result_type;
        metadata.insert(
            "result_type".to_string(),
            serde_json::Value::from(result_type.as_str()),
        );

        info!(file_name, result_type = %result_type, "Submitting file for parsing");
        let job = self
            .with_retry("submit", || self.transport.submit(file_name, bytes.clone()))
            .await?;

        let interval = Duration::from_secs(self.config.check_interval_secs);
        let deadline = Duration::from_secs(self.config.max_timeout_secs);
        let started = Instant::now();

        loop {
            tokio::time::sleep(interval).await;

            // Deadline is checked before each status request, so a timed-out
            // call issues no further polls.
            if started.elapsed() > deadline {
                error!(
                    job_id = %job.id,
                    waited_secs = started.elapsed().as_secs(),
                    "Gave up waiting for parse job"
                );
                return Err(ParseError::Timeout(self.config.max_timeout_secs));
            }

            let status = self
                .with_retry("job status", || self.transport.job_status(&job.id))
                .await?;
            match status {
                JobStatus::Pending => {
                    debug!(job_id = %job.id, elapsed = ?started.elapsed(), "Parse job still pending");
                }
                JobStatus::Error(message) => {
                    error!(job_id = %job.id, message = %message, "Parse job failed remotely");
                    return Err(ParseError::Remote(message));
                }
                JobStatus::Success => break,
            }
        }

        let text = self
            .with_retry("fetch result", || {
                self.transport.fetch_result(&job.id, result_type)
            })
            .await?;
        info!(job_id = %job.id, chars = text.len(), "Fetched parse result");

        Ok(vec![Document { text, metadata }])
    }

    /// Run a wire call, retrying transient failures up to the configured
    /// bound with a doubling backoff.
    async fn with_retry<R, F, Fut>(&self, context: &str, mut op: F) -> Result<R, ParseError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<R, ParseError>>,
    {
        let mut attempt = 0u32;
        let mut delay = Duration::from_millis(RETRY_BASE_DELAY_MS);
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.config.max_retries => {
                    attempt += 1;
                    warn!(
                        error = %e,
                        context,
                        attempt,
                        max_retries = self.config.max_retries,
                        "Transient network error, retrying after backoff"
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl<T: ParseTransport> FileExtractor for CloudParseClient<T> {
    async fn extract(&self, path: &Path) -> Result<Vec<Document>, ParseError> {
        self.parse(path).await
    }
}

fn ensure_supported(path: &Path) -> Result<(), ParseError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match extension {
        Some(ref ext) if SUPPORTED_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        _ => {
            error!(path = %path.display(), "Unsupported file format, refusing to submit");
            Err(ParseError::UnsupportedFormat(path.display().to_string()))
        }
    }
}
