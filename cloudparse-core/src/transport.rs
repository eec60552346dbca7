//! HTTP transport against the hosted parsing service.
//!
//! Implements [`ParseTransport`] with reqwest. Endpoint shapes:
//! - `POST {base}/api/parsing/upload` — multipart upload, returns `{"id": ...}`
//! - `GET {base}/api/parsing/job/{id}` — returns `{"status": "PENDING" | "SUCCESS" | "ERROR", ...}`
//! - `GET {base}/api/parsing/job/{id}/result/{format}` — returns the content
//!   under a key named after the requested format
//!
//! Status mapping: 401/403 become [`ParseError::Authentication`], 5xx and
//! connection-level failures become [`ParseError::Network`] (retryable), any
//! other non-success status becomes [`ParseError::Remote`] with the body.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{error, info};

use crate::config::ParseConfig;
use crate::contract::{Job, JobStatus, ParseError, ParseTransport, ResultType};

pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpTransport {
    pub fn new(config: &ParseConfig) -> Result<Self, ParseError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.max_timeout_secs))
            .build()
            .map_err(|e| ParseError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(), // avoid "//"
            api_key: config.api_key.clone(),
        })
    }

    /// Map a non-success response to the error taxonomy.
    async fn classify_failure(response: reqwest::Response, context: &str) -> ParseError {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<failed to decode response body>"));
        classify_status(status, &body, context)
    }

    fn send_failure(e: reqwest::Error, context: &str) -> ParseError {
        error!(error = ?e, context, "Failed to reach parse API");
        ParseError::Network(format!("{context}: {e}"))
    }
}

/// HTTP status to error-variant mapping: 401/403 are credential rejections,
/// 5xx are retryable, everything else surfaces as a remote failure.
fn classify_status(status: StatusCode, body: &str, context: &str) -> ParseError {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        error!(status = %status, context, "Authentication rejected by parse API");
        return ParseError::Authentication(format!("{context}: {status}: {body}"));
    }
    if status.is_server_error() {
        error!(status = %status, context, "Parse API server error");
        return ParseError::Network(format!("{context}: {status}: {body}"));
    }
    error!(status = %status, context, "Parse API returned error. Response body: {body}");
    ParseError::Remote(format!("{context}: {status}: {body}"))
}


#[async_trait]
impl ParseTransport for HttpTransport {
    async fn submit(&self, file_name: &str, bytes: Vec<u8>) -> Result<Job, ParseError> {
        let url = format!("{}/api/parsing/upload", self.base_url);
        info!(url = %url, file_name, size = bytes.len(), "Uploading file to parse API");

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("application/pdf")
            .map_err(|e| ParseError::Network(format!("upload: {e}")))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Self::send_failure(e, "upload"))?;

        if !response.status().is_success() {
            return Err(Self::classify_failure(response, "upload").await);
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ParseError::Remote(format!("upload: invalid response JSON: {e}")))?;
        let job_id = match body.get("id") {
            Some(serde_json::Value::String(id)) => id.clone(),
            Some(serde_json::Value::Number(id)) => id.to_string(),
            _ => {
                error!(body = %body, "Upload response missing job id");
                return Err(ParseError::Remote(
                    "upload: response missing job id".to_string(),
                ));
            }
        };
        info!(job_id = %job_id, file_name, "Parse job started");
        Ok(Job {
            id: job_id,
            status: JobStatus::Pending,
        })
    }

    async fn job_status(&self, job_id: &str) -> Result<JobStatus, ParseError> {
        let url = format!("{}/api/parsing/job/{}", self.base_url, job_id);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| Self::send_failure(e, "job status"))?;

        if !response.status().is_success() {
            return Err(Self::classify_failure(response, "job status").await);
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ParseError::Remote(format!("job status: invalid response JSON: {e}")))?;
        let status = body
            .get("status")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ParseError::Remote("job status: response missing status".to_string()))?;

        match status {
            "PENDING" => Ok(JobStatus::Pending),
            "SUCCESS" => Ok(JobStatus::Success),
            "ERROR" => {
                let message = body
                    .get("error")
                    .or_else(|| body.get("detail"))
                    .and_then(|v| v.as_str())
                    .unwrap_or("unknown error")
                    .to_string();
                error!(job_id, message = %message, "Parse job reported ERROR");
                Ok(JobStatus::Error(message))
            }
            other => Err(ParseError::Remote(format!(
                "job status: unknown status {other:?}"
            ))),
        }
    }

    async fn fetch_result(
        &self,
        job_id: &str,
        result_type: ResultType,
    ) -> Result<String, ParseError> {
        let url = format!(
            "{}/api/parsing/job/{}/result/{}",
            self.base_url,
            job_id,
            result_type.as_str()
        );
        info!(url = %url, job_id, "Fetching parse result");

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| Self::send_failure(e, "fetch result"))?;

        if !response.status().is_success() {
            return Err(Self::classify_failure(response, "fetch result").await);
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ParseError::Remote(format!("fetch result: invalid response JSON: {e}")))?;
        // The payload carries the content under a key named after the format.
        match body.get(result_type.as_str()).and_then(|v| v.as_str()) {
            Some(content) => Ok(content.to_string()),
            None => {
                error!(job_id, result_type = %result_type, "Result payload missing content");
                Err(ParseError::Remote(format!(
                    "fetch result: payload missing {:?} content",
                    result_type.as_str()
                )))
            }
        }
    }
}
