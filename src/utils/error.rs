use std::time::Duration;
use thiserror::Error;

/// 靜音/取消靜音指令失敗的原因
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    #[error("process '{0}' is not running")]
    ProcessNotFound(String),

    #[error("no audio session owned by '{0}'")]
    NoSessions(String),

    #[error("audio command failed: {message}")]
    CommandFailed { message: String },

    #[error("audio command timed out after {0:?}")]
    Timeout(Duration),

    #[error("audio backend IO error: {0}")]
    Io(String),
}

#[derive(Error, Debug)]
pub enum AdMuteError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Audio control error: {0}")]
    AudioError(#[from] AudioError),

    #[error("Window title source error: {message}")]
    TitleSourceError { message: String },

    #[error("Invalid keyword pattern: {0}")]
    RegexError(#[from] regex::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Monitor task error: {message}")]
    MonitorError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Audio,
    TitleSource,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl AdMuteError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AdMuteError::ConfigError { .. }
            | AdMuteError::ConfigValidationError { .. }
            | AdMuteError::InvalidConfigValueError { .. }
            | AdMuteError::RegexError(_) => ErrorCategory::Configuration,
            AdMuteError::AudioError(_) => ErrorCategory::Audio,
            AdMuteError::TitleSourceError { .. } => ErrorCategory::TitleSource,
            AdMuteError::IoError(_) | AdMuteError::MonitorError { .. } => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 下一個 tick 會重試
            AdMuteError::AudioError(_) | AdMuteError::TitleSourceError { .. } => {
                ErrorSeverity::Medium
            }
            AdMuteError::ConfigError { .. }
            | AdMuteError::ConfigValidationError { .. }
            | AdMuteError::InvalidConfigValueError { .. }
            | AdMuteError::RegexError(_) => ErrorSeverity::High,
            AdMuteError::MonitorError { .. } => ErrorSeverity::High,
            AdMuteError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            AdMuteError::AudioError(AudioError::ProcessNotFound(name)) => {
                format!("Start '{}' first; muting resumes automatically once it plays", name)
            }
            AdMuteError::AudioError(AudioError::Timeout(_)) => {
                "The audio server is slow to answer; raise --command-timeout-ms".to_string()
            }
            AdMuteError::AudioError(_) => {
                "Check that pactl is installed and the sound server is running".to_string()
            }
            AdMuteError::TitleSourceError { .. } => {
                "Check that wmctrl is installed and an X11 session is available".to_string()
            }
            AdMuteError::RegexError(_) => {
                "Review the [classifier] keywords in the config file".to_string()
            }
            AdMuteError::ConfigError { .. }
            | AdMuteError::ConfigValidationError { .. }
            | AdMuteError::InvalidConfigValueError { .. } => {
                "Fix the reported value in the TOML file or on the command line".to_string()
            }
            AdMuteError::MonitorError { .. } => {
                "Restart admute; audio was restored before the monitor stopped".to_string()
            }
            AdMuteError::IoError(_) => "Check file paths and permissions".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Audio => format!("Could not control player audio: {}", self),
            ErrorCategory::TitleSource => format!("Could not read the player window: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, AdMuteError>;
