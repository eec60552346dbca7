use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::contract::{ParseError, ResultType};

/// Default endpoint of the hosted parsing service.
pub const DEFAULT_BASE_URL: &str = "https://api.cloudparse.dev";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "CLOUDPARSE_API_KEY";
/// Environment variable overriding the base URL.
pub const BASE_URL_ENV: &str = "CLOUDPARSE_BASE_URL";

const DEFAULT_CHECK_INTERVAL_SECS: u64 = 1;
const DEFAULT_MAX_TIMEOUT_SECS: u64 = 2000;
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Client configuration: credential, endpoint and polling policy.
///
/// The polling interval, maximum timeout and retry bound are operational
/// parameters; callers tune them here instead of the client hard-coding them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseConfig {
    /// API key sent as a bearer token on every request.
    #[serde(skip_serializing)]
    pub api_key: String,
    pub base_url: String,
    pub result_type: ResultType,
    /// Seconds to wait between job status checks.
    pub check_interval_secs: u64,
    /// Maximum seconds to wait for a job to reach a terminal state.
    pub max_timeout_secs: u64,
    /// Maximum retries for transient network errors, per wire call.
    pub max_retries: u32,
}

impl ParseConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            result_type: ResultType::default(),
            check_interval_secs: DEFAULT_CHECK_INTERVAL_SECS,
            max_timeout_secs: DEFAULT_MAX_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Build a configuration from the environment: the API key from
    /// `CLOUDPARSE_API_KEY` (required), the base URL from
    /// `CLOUDPARSE_BASE_URL` (optional).
    pub fn from_env() -> Result<Self, ParseError> {
        let api_key = match std::env::var(API_KEY_ENV) {
            Ok(key) if !key.is_empty() => key,
            _ => {
                error!(var = API_KEY_ENV, "API key missing in environment");
                return Err(ParseError::Authentication(format!(
                    "{API_KEY_ENV} is not set"
                )));
            }
        };
        let mut config = Self::new(api_key);
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            config.base_url = url;
        }
        Ok(config)
    }

    pub fn trace_loaded(&self) {
        info!(
            api_key_set = !self.api_key.is_empty(),
            base_url = %self.base_url,
            result_type = %self.result_type,
            check_interval_secs = self.check_interval_secs,
            max_timeout_secs = self.max_timeout_secs,
            max_retries = self.max_retries,
            "Loaded parse configuration"
        );
        debug!(base_url = %self.base_url, "Parse configuration in use");
    }
}
