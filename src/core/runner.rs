use crate::core::monitor::PlaybackMonitor;
use crate::domain::model::{MonitorEvent, PlaybackState, StatusSnapshot, TitleSample};
use crate::domain::ports::{AudioController, WindowTitleSource};
use crate::utils::error::{AdMuteError, Result};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(300);
const COMMAND_QUEUE: usize = 16;
const EVENT_QUEUE: usize = 64;

#[derive(Debug)]
pub enum MonitorCommand {
    Enable,
    Disable,
    Toggle,
    Reset,
    Status(oneshot::Sender<StatusSnapshot>),
    Quit,
}

/// Owner side of a running monitor task.
///
/// All state lives in the task; this handle only sends commands.
pub struct MonitorHandle {
    commands: mpsc::Sender<MonitorCommand>,
    events: broadcast::Sender<MonitorEvent>,
    cancel_token: CancellationToken,
    handle: JoinHandle<PlaybackState>,
}

impl MonitorHandle {
    pub async fn send(&self, command: MonitorCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| AdMuteError::MonitorError {
                message: "monitor task is no longer running".to_string(),
            })
    }

    pub async fn status(&self) -> Result<StatusSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.send(MonitorCommand::Status(tx)).await?;
        rx.await.map_err(|_| AdMuteError::MonitorError {
            message: "monitor task dropped the status request".to_string(),
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.events.subscribe()
    }

    pub fn commands(&self) -> mpsc::Sender<MonitorCommand> {
        self.commands.clone()
    }

    /// 停止監控並等待最後一次取消靜音完成
    pub async fn stop(self) -> Result<PlaybackState> {
        self.cancel_token.cancel();
        self.join().await
    }

    pub async fn join(self) -> Result<PlaybackState> {
        self.handle.await.map_err(|e| AdMuteError::MonitorError {
            message: format!("monitor task failed to join: {}", e),
        })
    }
}

pub fn spawn_monitor<S, A>(
    monitor: PlaybackMonitor<A>,
    source: S,
    poll_interval: Duration,
) -> MonitorHandle
where
    S: WindowTitleSource + 'static,
    A: AudioController + 'static,
{
    let (commands, rx) = mpsc::channel(COMMAND_QUEUE);
    let (events, _) = broadcast::channel(EVENT_QUEUE);
    let cancel_token = CancellationToken::new();

    let handle = tokio::spawn(monitor_loop(
        monitor,
        source,
        poll_interval,
        rx,
        events.clone(),
        cancel_token.clone(),
    ));

    MonitorHandle {
        commands,
        events,
        cancel_token,
        handle,
    }
}

async fn monitor_loop<S, A>(
    mut monitor: PlaybackMonitor<A>,
    source: S,
    poll_interval: Duration,
    mut commands: mpsc::Receiver<MonitorCommand>,
    events: broadcast::Sender<MonitorEvent>,
    cancel_token: CancellationToken,
) -> PlaybackState
where
    S: WindowTitleSource,
    A: AudioController,
{
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(
        "🎵 Watching '{}' every {:?}",
        monitor.process_name(),
        poll_interval
    );

    loop {
        // 每次只處理一個分支，進行中的 tick 一定會做完
        tokio::select! {
            biased;

            _ = cancel_token.cancelled() => {
                tracing::info!("👋 Stop requested");
                break;
            }
            command = commands.recv() => {
                let Some(command) = command else {
                    tracing::info!("👋 Command channel closed");
                    break;
                };
                if !handle_command(&mut monitor, command, &events).await {
                    break;
                }
            }
            _ = ticker.tick() => {
                if let Some(sample) = read_title(&source, poll_interval).await {
                    if let Some(event) = monitor.on_sample(&sample).await {
                        publish(&events, event);
                    }
                }
            }
        }
    }

    monitor.shutdown().await
}

/// Returns false when the loop should stop.
async fn handle_command<A: AudioController>(
    monitor: &mut PlaybackMonitor<A>,
    command: MonitorCommand,
    events: &broadcast::Sender<MonitorEvent>,
) -> bool {
    let event = match command {
        MonitorCommand::Enable => monitor.set_enabled(true).await,
        MonitorCommand::Disable => monitor.set_enabled(false).await,
        MonitorCommand::Toggle => {
            let enabled = monitor.state().enabled;
            monitor.set_enabled(!enabled).await
        }
        MonitorCommand::Reset => {
            monitor.reset().await;
            None
        }
        MonitorCommand::Status(reply) => {
            if reply.send(monitor.status()).is_err() {
                tracing::debug!("Status requester went away");
            }
            None
        }
        MonitorCommand::Quit => {
            tracing::info!("👋 Quit requested");
            return false;
        }
    };

    if let Some(event) = event {
        publish(events, event);
    }
    true
}

async fn read_title<S: WindowTitleSource>(source: &S, limit: Duration) -> Option<TitleSample> {
    match tokio::time::timeout(limit, source.current_title()).await {
        Ok(Ok(title)) => Some(TitleSample::new(title)),
        Ok(Err(e)) => {
            tracing::warn!("Window title lookup failed: {}", e);
            None
        }
        Err(_) => {
            tracing::warn!("Window title lookup timed out (> {:?}), skipping tick", limit);
            None
        }
    }
}

fn publish(events: &broadcast::Sender<MonitorEvent>, event: MonitorEvent) {
    // no subscribers is fine
    let _ = events.send(event);
}
