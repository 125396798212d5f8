//! Client configuration.
//!
//! Values come from an optional RON file, the `VALIDATOR_API_URL` environment
//! variable and command-line flags, in increasing order of precedence.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use validator_core::DEFAULT_PAGE_LIMIT;
use validator_engine::{EngineConfig, PollSettings, ServiceSettings};

use super::cli::Cli;
use super::logging::{LogDestination, DEFAULT_LOG_FILE};

pub const DEFAULT_CONFIG_FILE: &str = "validator.ron";
pub const API_URL_ENV: &str = "VALIDATOR_API_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_url: String,
    pub upload_path: String,
    pub page_limit: u32,
    pub poll_interval_secs: u64,
    pub request_timeout_secs: u64,
    pub output_dir: PathBuf,
    pub log_destination: LogDestination,
    pub log_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        let service = ServiceSettings::default();
        Self {
            api_url: service.base_url,
            upload_path: service.upload_path,
            page_limit: DEFAULT_PAGE_LIMIT,
            poll_interval_secs: PollSettings::default().interval.as_secs(),
            request_timeout_secs: service.request_timeout.as_secs(),
            output_dir: PathBuf::from("downloads"),
            log_destination: LogDestination::default(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

/// Final configuration plus anything worth logging once the logger is up.
#[derive(Debug)]
pub struct Resolved {
    pub config: AppConfig,
    pub warnings: Vec<String>,
}

impl AppConfig {
    /// Reads a RON config file. `Ok(None)` means the file does not exist.
    pub fn read(path: &Path) -> anyhow::Result<Option<Self>> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| format!("reading {}", path.display()));
            }
        };
        let config = ron::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
        Ok(Some(config))
    }

    pub fn engine_config(&self) -> EngineConfig {
        let mut engine = EngineConfig::default_with_output(self.output_dir.clone());
        engine.service.base_url = self.api_url.clone();
        engine.service.upload_path = self.upload_path.clone();
        engine.service.request_timeout = Duration::from_secs(self.request_timeout_secs.max(1));
        engine.poll.interval = Duration::from_secs(self.poll_interval_secs.max(1));
        engine
    }
}

/// Layers file, environment and flags. A missing file yields defaults; a
/// broken one yields defaults and a warning.
pub fn resolve(cli: &Cli, env_api_url: Option<String>) -> Resolved {
    let mut warnings = Vec::new();
    let path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    let mut config = match AppConfig::read(&path) {
        Ok(Some(config)) => config,
        Ok(None) => {
            if cli.config.is_some() {
                warnings.push(format!("Config file {} not found; using defaults", path.display()));
            }
            AppConfig::default()
        }
        Err(err) => {
            warnings.push(format!("Ignoring config file: {err:#}"));
            AppConfig::default()
        }
    };

    if let Some(url) = env_api_url.filter(|url| !url.trim().is_empty()) {
        config.api_url = url;
    }
    if let Some(url) = &cli.api_url {
        config.api_url = url.clone();
    }
    if let Some(limit) = cli.limit {
        config.page_limit = limit;
    }
    if let Some(destination) = cli.log {
        config.log_destination = destination;
    }

    if config.page_limit == 0 {
        warnings.push(format!("Page limit 0 is not usable; falling back to {DEFAULT_PAGE_LIMIT}"));
        config.page_limit = DEFAULT_PAGE_LIMIT;
    }

    Resolved { config, warnings }
}
