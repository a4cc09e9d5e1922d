use crate::domain::ports::AudioController;
use crate::utils::error::AudioError;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};

/// Logs commands without touching any audio session.
#[derive(Debug, Default)]
pub struct DryRunAudioController {
    muted: AtomicBool,
}

impl DryRunAudioController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_muted(&self) -> bool {
        self.muted.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AudioController for DryRunAudioController {
    async fn mute(&self, process_name: &str) -> Result<(), AudioError> {
        self.muted.store(true, Ordering::SeqCst);
        tracing::info!("🔍 [dry-run] would mute '{}'", process_name);
        Ok(())
    }

    async fn unmute(&self, process_name: &str) -> Result<(), AudioError> {
        self.muted.store(false, Ordering::SeqCst);
        tracing::info!("🔍 [dry-run] would unmute '{}'", process_name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_tracks_requested_state() {
        let controller = DryRunAudioController::new();
        tokio_test::assert_ok!(controller.mute("spotify").await);
        tokio_test::assert_ok!(controller.mute("spotify").await);
        assert!(controller.is_muted());
        tokio_test::assert_ok!(controller.unmute("spotify").await);
        assert!(!controller.is_muted());
    }
}
