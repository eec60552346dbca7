//! # contract: data model and trait seams for the parse client
//!
//! This module defines the plain data types exchanged with the hosted parsing
//! service (jobs, documents, result formats), the error taxonomy, and the two
//! trait seams of the crate:
//!
//! - [`ParseTransport`]: the three wire operations (submit, status, result).
//!   Implemented by the real HTTP transport and by test mocks.
//! - [`FileExtractor`]: the path-to-documents capability a host document
//!   loader expects. Implemented by [`crate::client::CloudParseClient`] and
//!   by test mocks.
//!
//! ## Mocking & Testing
//! Both traits are annotated for `mockall`, so consumers can generate
//! deterministic mocks for unit/integration tests. The mocks are exported
//! under the `test-export-mocks` feature (enabled by default).

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use mockall::automock;

/// Error taxonomy for the parse client. Only [`ParseError::Network`] is
/// retryable; every other variant propagates immediately to the caller.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Missing or rejected credentials.
    #[error("authentication failed: {0}")]
    Authentication(String),
    /// The input file is not a type the remote service supports.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),
    /// The remote job reached its ERROR state, or the service answered with
    /// something the client cannot interpret. Carries the server message.
    #[error("remote parse failed: {0}")]
    Remote(String),
    /// Polling did not reach a terminal job state within the configured
    /// maximum number of seconds.
    #[error("parse job did not finish within {0} seconds")]
    Timeout(u64),
    /// Transient transport-level failure (connection error, 5xx). Retried a
    /// bounded number of times with backoff before surfacing.
    #[error("transient network error: {0}")]
    Network(String),
    /// Reading the local input file failed.
    #[error("failed to read input file: {0}")]
    Io(#[from] std::io::Error),
}

impl ParseError {
    /// Whether the error is worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, ParseError::Network(_))
    }
}

/// The output encoding requested from the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ResultType {
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "markdown")]
    Markdown,
}

impl ResultType {
    /// The wire value used in URLs and result payload keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultType::Text => "text",
            ResultType::Markdown => "markdown",
        }
    }
}

impl Default for ResultType {
    fn default() -> Self {
        ResultType::Text
    }
}

impl std::str::FromStr for ResultType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" | "txt" => Ok(ResultType::Text),
            "markdown" | "md" => Ok(ResultType::Markdown),
            other => Err(ParseError::UnsupportedFormat(format!(
                "unknown result type: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for ResultType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Server-side lifecycle of a parse job. Transitions are monotonic:
/// `Pending` -> `Success` or `Pending` -> `Error`, never backward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Success,
    /// Terminal failure, carrying the server-reported message.
    Error(String),
}

/// A server-side unit of work, tracked by id until it reaches a terminal
/// status. Exactly one job exists per submitted file.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: String,
    pub status: JobStatus,
}

/// A unit of extracted content returned to the caller: text plus a metadata
/// mapping (string keys to scalar JSON values, e.g. the source file name).
/// Immutable after creation; ownership transfers to the caller.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Document {
    pub text: String,
    pub metadata: HashMap<String, serde_json::Value>,
}

/// The three wire operations against the hosted parsing service.
///
/// Implemented by the reqwest transport in [`crate::transport`] and by
/// `MockParseTransport` in tests. All methods are async and map transport
/// failures into the [`ParseError`] taxonomy.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ParseTransport: Send + Sync {
    /// Upload a file and start a parse job. Returns the job in its initial
    /// pending state.
    async fn submit(&self, file_name: &str, bytes: Vec<u8>) -> Result<Job, ParseError>;

    /// Fetch the current status of a job.
    async fn job_status(&self, job_id: &str) -> Result<JobStatus, ParseError>;

    /// Fetch the decoded result payload of a successfully finished job.
    async fn fetch_result(
        &self,
        job_id: &str,
        result_type: ResultType,
    ) -> Result<String, ParseError>;
}

/// Capability expected by host document-loading utilities: map a file path
/// to a sequence of [`Document`] records.
///
/// [`crate::client::CloudParseClient`] implements this, so any caller that
/// needs a path-to-documents function can adapt the client to that shape
/// without inheritance or wrapping.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait FileExtractor: Send + Sync {
    /// Extract all documents from the file at `path`.
    async fn extract(&self, path: &Path) -> Result<Vec<Document>, ParseError>;
}
