use crate::utils::error::{AudioError, Result};
use async_trait::async_trait;

/// 讀取目標播放器視窗的標題
#[async_trait]
pub trait WindowTitleSource: Send + Sync {
    /// Visible title of the player window, or an empty string when no window is found.
    async fn current_title(&self) -> Result<String>;
}

/// Mutes and unmutes every audio session owned by a process.
///
/// Both calls are idempotent: asking for the state that is already in effect
/// succeeds. Success requires at least one session to have been updated.
#[async_trait]
pub trait AudioController: Send + Sync {
    async fn mute(&self, process_name: &str) -> std::result::Result<(), AudioError>;
    async fn unmute(&self, process_name: &str) -> std::result::Result<(), AudioError>;
}

#[async_trait]
impl<T: WindowTitleSource + ?Sized> WindowTitleSource for Box<T> {
    async fn current_title(&self) -> Result<String> {
        (**self).current_title().await
    }
}

#[async_trait]
impl<T: AudioController + ?Sized> AudioController for Box<T> {
    async fn mute(&self, process_name: &str) -> std::result::Result<(), AudioError> {
        (**self).mute(process_name).await
    }

    async fn unmute(&self, process_name: &str) -> std::result::Result<(), AudioError> {
        (**self).unmute(process_name).await
    }
}
