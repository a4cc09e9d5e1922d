use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 每個 poll tick 從標題來源取得的一筆樣本
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleSample {
    pub text: String,
    pub observed_at: DateTime<Utc>,
}

impl TitleSample {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            observed_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Content,
    Advertisement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackPhase {
    #[default]
    Unknown,
    Content,
    Advertisement,
}

impl From<Classification> for PlaybackPhase {
    fn from(value: Classification) -> Self {
        match value {
            Classification::Content => PlaybackPhase::Content,
            Classification::Advertisement => PlaybackPhase::Advertisement,
        }
    }
}

/// Mutable state of the monitor. Only `PlaybackMonitor` writes to it.
///
/// `is_muted` is true only while `phase == Advertisement` and `enabled`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaybackState {
    pub last_title: String,
    pub phase: PlaybackPhase,
    pub is_muted: bool,
    pub enabled: bool,
    pub ad_transitions: u64,
    pub content_transitions: u64,
    /// Set after a failed command; the next tick bypasses the debounce.
    pub rearmed: bool,
}

impl PlaybackState {
    pub fn new(enabled: bool) -> Self {
        Self {
            last_title: String::new(),
            phase: PlaybackPhase::Unknown,
            is_muted: false,
            enabled,
            ad_transitions: 0,
            content_transitions: 0,
            rearmed: false,
        }
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new(true)
    }
}

/// 提供給日誌與訂閱者的事件，一律帶有觸發的標題
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MonitorEvent {
    AdDetected { count: u64, title: String },
    AdCleared { title: String },
    MuteReasserted { title: String },
    MuteFailed { title: String, reason: String },
    UnmuteFailed { title: String, reason: String },
    Enabled,
    Disabled { unmuted: bool },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    pub enabled: bool,
    pub is_muted: bool,
    pub phase: PlaybackPhase,
    pub last_title: String,
    pub ad_transitions: u64,
    pub content_transitions: u64,
}

impl From<&PlaybackState> for StatusSnapshot {
    fn from(state: &PlaybackState) -> Self {
        Self {
            enabled: state.enabled,
            is_muted: state.is_muted,
            phase: state.phase,
            last_title: state.last_title.clone(),
            ad_transitions: state.ad_transitions,
            content_transitions: state.content_transitions,
        }
    }
}
