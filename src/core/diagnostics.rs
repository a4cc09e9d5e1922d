use crate::domain::ports::AudioController;
use crate::utils::error::{AudioError, Result};
use std::future::Future;
use std::time::Duration;

/// How long the player stays muted during a self test.
pub const SELF_TEST_HOLD: Duration = Duration::from_secs(2);

async fn bounded<F>(call: F, timeout: Duration) -> std::result::Result<(), AudioError>
where
    F: Future<Output = std::result::Result<(), AudioError>>,
{
    tokio::time::timeout(timeout, call)
        .await
        .unwrap_or(Err(AudioError::Timeout(timeout)))
}

/// Mutes the player, waits `hold`, then unmutes it.
///
/// A failed mute still gets one unmute attempt, since a timed-out call may
/// have landed anyway.
pub async fn mute_round_trip<A: AudioController>(
    controller: &A,
    process_name: &str,
    hold: Duration,
    timeout: Duration,
) -> Result<()> {
    tracing::info!("🧪 Muting '{}'", process_name);
    if let Err(e) = bounded(controller.mute(process_name), timeout).await {
        tracing::error!("❌ Mute failed: {}", e);
        let _ = bounded(controller.unmute(process_name), timeout).await;
        return Err(e.into());
    }
    tracing::info!("✅ Muted, holding for {:?}", hold);

    tokio::time::sleep(hold).await;

    tracing::info!("🧪 Unmuting '{}'", process_name);
    bounded(controller.unmute(process_name), timeout).await?;
    tracing::info!("✅ Unmuted, audio control works");
    Ok(())
}
