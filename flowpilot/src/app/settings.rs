//! Settings file management

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::app::options::CopilotOptions;
use crate::errors::CopilotError;
use crate::logs::{LogLevel, LogOptions};
use crate::{context, guide, tracer};

/// Copilot settings, read from a JSON file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Emit JSON log lines
    #[serde(default)]
    pub json_logs: bool,

    /// Maximum number of cached data flows
    #[serde(default = "default_flow_cache_capacity")]
    pub flow_cache_capacity: usize,

    /// Data-flow cache validity in seconds
    #[serde(default = "default_flow_cache_ttl")]
    pub flow_cache_ttl_secs: u64,

    /// Number of past contexts remembered
    #[serde(default = "default_history_size")]
    pub history_size: usize,

    /// Maximum paths discovered per trace
    #[serde(default = "default_max_paths")]
    pub max_paths: usize,

    /// Guide debounce window in milliseconds
    #[serde(default = "default_guide_debounce")]
    pub guide_debounce_ms: u64,

    /// Guide fallback poll interval in milliseconds
    #[serde(default = "default_guide_poll_interval")]
    pub guide_poll_interval_ms: u64,

    /// Pattern catalog to use instead of the bundled one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
}

fn default_flow_cache_capacity() -> usize {
    50
}

fn default_flow_cache_ttl() -> u64 {
    60
}

fn default_history_size() -> usize {
    10
}

fn default_max_paths() -> usize {
    256
}

fn default_guide_debounce() -> u64 {
    300
}

fn default_guide_poll_interval() -> u64 {
    500
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            json_logs: false,
            flow_cache_capacity: default_flow_cache_capacity(),
            flow_cache_ttl_secs: default_flow_cache_ttl(),
            history_size: default_history_size(),
            max_paths: default_max_paths(),
            guide_debounce_ms: default_guide_debounce(),
            guide_poll_interval_ms: default_guide_poll_interval(),
            catalog_path: None,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, CopilotError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub async fn load(path: &Path) -> Result<Self, CopilotError> {
        let json = tokio::fs::read_to_string(path).await?;
        Self::from_json(&json)
    }

    fn validate(&self) -> Result<(), CopilotError> {
        if self.flow_cache_capacity == 0 {
            return Err(CopilotError::ConfigError("flowCacheCapacity must be at least 1".to_string()));
        }
        if self.history_size == 0 {
            return Err(CopilotError::ConfigError("historySize must be at least 1".to_string()));
        }
        if self.max_paths == 0 {
            return Err(CopilotError::ConfigError("maxPaths must be at least 1".to_string()));
        }
        if self.guide_poll_interval_ms == 0 {
            return Err(CopilotError::ConfigError("guidePollIntervalMs must be positive".to_string()));
        }
        Ok(())
    }

    pub fn log_options(&self) -> LogOptions {
        LogOptions {
            log_level: self.log_level.clone(),
            json_format: self.json_logs,
        }
    }

    pub fn to_options(&self) -> CopilotOptions {
        CopilotOptions {
            tracer: tracer::Options {
                cache_capacity: self.flow_cache_capacity,
                cache_ttl: Duration::from_secs(self.flow_cache_ttl_secs),
                max_paths: self.max_paths,
            },
            aggregator: context::Options {
                history_size: self.history_size,
            },
            guide: guide::Options {
                debounce: Duration::from_millis(self.guide_debounce_ms),
                poll_interval: Duration::from_millis(self.guide_poll_interval_ms),
            },
        }
    }
}
