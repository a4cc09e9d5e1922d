use crate::core::classifier::{KeywordRule, NoSeparatorPolicy};
use crate::utils::error::{AdMuteError, Result};
use crate::utils::validation::{
    validate_non_empty_list, validate_non_empty_string, validate_range, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const POLL_INTERVAL_RANGE_MS: (u64, u64) = (50, 5000);
pub const COMMAND_TIMEOUT_RANGE_MS: (u64, u64) = (50, 30_000);
pub const MIN_TITLE_LEN_RANGE: (usize, usize) = (1, 64);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub player: Option<PlayerConfig>,
    pub classifier: Option<ClassifierConfig>,
    pub monitor: Option<MonitorConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub process_name: Option<String>,
    /// Empty-state titles shown between tracks.
    pub placeholders: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub separators: Option<Vec<String>>,
    /// Replaces the built-in keyword table.
    pub keywords: Option<Vec<KeywordRule>>,
    /// Appended to the keyword table in use.
    pub extra_keywords: Option<Vec<KeywordRule>>,
    pub min_title_len: Option<usize>,
    pub no_separator: Option<NoSeparatorPolicy>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub poll_interval_ms: Option<u64>,
    pub command_timeout_ms: Option<u64>,
    pub start_enabled: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub verbose: Option<bool>,
    pub format: Option<LogFormat>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AdMuteError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AdMuteError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${PLAYER})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}")?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        if let Some(player) = &self.player {
            if let Some(name) = &player.process_name {
                validate_non_empty_string("player.process_name", name)?;
            }
        }

        if let Some(classifier) = &self.classifier {
            if let Some(separators) = &classifier.separators {
                validate_non_empty_list("classifier.separators", separators)?;
            }
            if let Some(len) = classifier.min_title_len {
                validate_range(
                    "classifier.min_title_len",
                    len,
                    MIN_TITLE_LEN_RANGE.0,
                    MIN_TITLE_LEN_RANGE.1,
                )?;
            }
        }

        if let Some(monitor) = &self.monitor {
            if let Some(ms) = monitor.poll_interval_ms {
                validate_range(
                    "monitor.poll_interval_ms",
                    ms,
                    POLL_INTERVAL_RANGE_MS.0,
                    POLL_INTERVAL_RANGE_MS.1,
                )?;
            }
            if let Some(ms) = monitor.command_timeout_ms {
                validate_range(
                    "monitor.command_timeout_ms",
                    ms,
                    COMMAND_TIMEOUT_RANGE_MS.0,
                    COMMAND_TIMEOUT_RANGE_MS.1,
                )?;
            }
        }

        Ok(())
    }

    pub fn process_name(&self) -> Option<&str> {
        self.player.as_ref()?.process_name.as_deref()
    }

    pub fn poll_interval_ms(&self) -> Option<u64> {
        self.monitor.as_ref()?.poll_interval_ms
    }

    pub fn command_timeout_ms(&self) -> Option<u64> {
        self.monitor.as_ref()?.command_timeout_ms
    }

    pub fn start_enabled(&self) -> bool {
        self.monitor
            .as_ref()
            .and_then(|m| m.start_enabled)
            .unwrap_or(true)
    }

    pub fn verbose(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|l| l.verbose)
            .unwrap_or(false)
    }

    pub fn log_format(&self) -> Option<LogFormat> {
        self.logging.as_ref()?.format
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
