use crate::core::classifier::TitleClassifier;
use crate::domain::model::{
    Classification, MonitorEvent, PlaybackState, StatusSnapshot, TitleSample,
};
use crate::domain::ports::AudioController;
use crate::utils::error::AudioError;
use std::time::Duration;

pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AudioCommand {
    Mute,
    Unmute,
}

/// Debounced mute/unmute state machine, driven once per poll tick.
pub struct PlaybackMonitor<A: AudioController> {
    classifier: TitleClassifier,
    controller: A,
    process_name: String,
    command_timeout: Duration,
    state: PlaybackState,
}

impl<A: AudioController> PlaybackMonitor<A> {
    pub fn new(classifier: TitleClassifier, controller: A, process_name: impl Into<String>) -> Self {
        Self {
            classifier,
            controller,
            process_name: process_name.into(),
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            state: PlaybackState::default(),
        }
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.state.enabled = enabled;
        self
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn status(&self) -> StatusSnapshot {
        StatusSnapshot::from(&self.state)
    }

    pub fn process_name(&self) -> &str {
        &self.process_name
    }

    async fn send(&self, command: AudioCommand) -> Result<(), AudioError> {
        let call = match command {
            AudioCommand::Mute => self.controller.mute(&self.process_name),
            AudioCommand::Unmute => self.controller.unmute(&self.process_name),
        };

        match tokio::time::timeout(self.command_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(AudioError::Timeout(self.command_timeout)),
        }
    }

    /// 處理一筆標題樣本；標題沒變時不做任何事
    pub async fn on_sample(&mut self, sample: &TitleSample) -> Option<MonitorEvent> {
        let retry = self.state.rearmed;
        if !retry && sample.text == self.state.last_title {
            return None;
        }

        self.state.rearmed = false;
        self.state.last_title = sample.text.clone();

        if sample.is_empty() {
            tracing::debug!("Player window not found");
            return None;
        }

        let verdict = self.classifier.evaluate(&sample.text);
        self.state.phase = verdict.classification.into();
        tracing::debug!(
            observed_at = %sample.observed_at,
            reason = ?verdict.reason,
            "Classified '{}' as {:?}",
            sample.text,
            verdict.classification
        );

        let title = sample.text.clone();
        match (verdict.classification, self.state.is_muted) {
            (Classification::Advertisement, false) => {
                if !self.state.enabled {
                    tracing::debug!("Ad detected while disabled: '{}'", title);
                    return None;
                }

                if !retry {
                    self.state.ad_transitions += 1;
                }
                tracing::info!("📢 Advertisement #{}: '{}'", self.state.ad_transitions, title);

                match self.send(AudioCommand::Mute).await {
                    Ok(()) => {
                        self.state.is_muted = true;
                        tracing::info!("🔇 Muted {}", self.process_name);
                        Some(MonitorEvent::AdDetected {
                            count: self.state.ad_transitions,
                            title,
                        })
                    }
                    Err(e) => Some(self.mute_failed(title, e)),
                }
            }
            (Classification::Advertisement, true) => {
                // the session can drop its mute flag between polls
                match self.send(AudioCommand::Mute).await {
                    Ok(()) => {
                        tracing::debug!("Mute reasserted for '{}'", title);
                        Some(MonitorEvent::MuteReasserted { title })
                    }
                    Err(e) => Some(self.mute_failed(title, e)),
                }
            }
            (Classification::Content, true) => {
                if !retry {
                    self.state.content_transitions += 1;
                }
                tracing::info!("🎶 Now playing: '{}'", title);

                match self.send(AudioCommand::Unmute).await {
                    Ok(()) => {
                        self.state.is_muted = false;
                        tracing::info!("🔊 Unmuted {}", self.process_name);
                        Some(MonitorEvent::AdCleared { title })
                    }
                    Err(e) => {
                        self.state.rearmed = true;
                        tracing::warn!("❌ Unmute failed for '{}': {}", title, e);
                        Some(MonitorEvent::UnmuteFailed {
                            title,
                            reason: e.to_string(),
                        })
                    }
                }
            }
            (Classification::Content, false) => {
                tracing::info!("🎶 Now playing: '{}'", title);
                None
            }
        }
    }

    fn mute_failed(&mut self, title: String, error: AudioError) -> MonitorEvent {
        self.state.rearmed = true;
        tracing::warn!("❌ Mute failed for '{}': {}", title, error);
        MonitorEvent::MuteFailed {
            title,
            reason: error.to_string(),
        }
    }

    /// Turning the monitor off restores audio immediately; `is_muted` is
    /// cleared whether or not the unmute call succeeded.
    pub async fn set_enabled(&mut self, enabled: bool) -> Option<MonitorEvent> {
        if enabled == self.state.enabled {
            return None;
        }
        self.state.enabled = enabled;

        if enabled {
            // re-evaluate whatever is on screen right now
            self.state.last_title.clear();
            tracing::info!("▶️ Ad muting enabled");
            return Some(MonitorEvent::Enabled);
        }

        let unmuted = self.restore_audio().await;
        tracing::info!("⏸️ Ad muting disabled");
        Some(MonitorEvent::Disabled { unmuted })
    }

    /// 失效安全：若目前是靜音，嘗試取消靜音一次並清除旗標
    async fn restore_audio(&mut self) -> bool {
        if !self.state.is_muted {
            return false;
        }

        let result = self.send(AudioCommand::Unmute).await;
        self.state.is_muted = false;
        match result {
            Ok(()) => {
                tracing::info!("🔊 Audio restored for {}", self.process_name);
                true
            }
            Err(e) => {
                tracing::error!("❌ Could not restore audio for {}: {}", self.process_name, e);
                false
            }
        }
    }

    /// Restore audio, then forget counters and title history.
    pub async fn reset(&mut self) {
        self.restore_audio().await;
        self.state = PlaybackState::new(self.state.enabled);
        tracing::info!("🔄 Monitor state reset");
    }

    pub async fn shutdown(mut self) -> PlaybackState {
        self.restore_audio().await;
        tracing::info!(
            "📊 Stats: blocked {} ads, {} returns to content",
            self.state.ad_transitions,
            self.state.content_transitions
        );
        self.state
    }
}
