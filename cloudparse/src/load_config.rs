/// `load_config` module: Loads and adapts a static YAML config—including
/// environment secret injection—into the core `ParseConfig`.
///
/// This module is the only place where untrusted YAML is parsed and mapped to
/// the strongly-typed client configuration.
///
/// # Responsibilities
/// - Parse user-supplied YAML configuration files into type-safe structs
/// - Map loosely-typed YAML keys (e.g., the result type string) to rich types
/// - Inject the API key from the environment; the key never lives in YAML
/// - Ensure robust error messages for CLI and tests
///
/// # Errors
/// All errors in this module use `anyhow::Error` for context-rich
/// diagnostics, surfaced at the CLI boundary.
///
/// YAML fields override environment defaults for the non-secret settings.
use anyhow::Result;
use cloudparse_core::{ParseConfig, ResultType};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{error, info};

#[derive(Debug, Deserialize)]
pub struct CliConfig {
    pub parse: ParseSection,
}

/// Non-secret settings accepted from YAML. Everything is optional; absent
/// fields keep the environment/built-in defaults.
#[derive(Debug, Default, Deserialize)]
pub struct ParseSection {
    pub base_url: Option<String>,
    pub result_type: Option<String>,
    pub check_interval_secs: Option<u64>,
    pub max_timeout_secs: Option<u64>,
    pub max_retries: Option<u32>,
}

/// Loads a static YAML config file (no secrets) and injects the API key from
/// the environment. Returns a ready `ParseConfig` for use by the CLI.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ParseConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let raw: CliConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    apply_section(raw.parse)
}

/// Start from the environment (API key required there) and apply YAML
/// overrides on top.
fn apply_section(section: ParseSection) -> Result<ParseConfig> {
    let mut config = ParseConfig::from_env()?;

    if let Some(base_url) = section.base_url {
        config.base_url = base_url;
    }
    if let Some(kind) = section.result_type {
        config.result_type = kind.parse::<ResultType>()?;
    }
    if let Some(secs) = section.check_interval_secs {
        config.check_interval_secs = secs;
    }
    if let Some(secs) = section.max_timeout_secs {
        config.max_timeout_secs = secs;
    }
    if let Some(retries) = section.max_retries {
        config.max_retries = retries;
    }

    Ok(config)
}
