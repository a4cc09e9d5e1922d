use admute::adapters::ReplayTitleSource;
use admute::{
    spawn_monitor, AudioController, AudioError, MonitorCommand, MonitorEvent, PlaybackMonitor,
    PlaybackPhase, TitleClassifier, WindowTitleSource,
};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;

const TICK: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Call {
    Mute,
    Unmute,
}

#[derive(Clone, Default)]
struct MockAudio {
    calls: Arc<Mutex<Vec<Call>>>,
    hang: bool,
}

impl MockAudio {
    fn hanging() -> Self {
        Self {
            hang: true,
            ..Default::default()
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    async fn answer(&self, call: Call) -> Result<(), AudioError> {
        self.calls.lock().unwrap().push(call);
        if self.hang {
            std::future::pending::<()>().await;
        }
        Ok(())
    }
}

#[async_trait]
impl AudioController for MockAudio {
    async fn mute(&self, _process_name: &str) -> Result<(), AudioError> {
        self.answer(Call::Mute).await
    }

    async fn unmute(&self, _process_name: &str) -> Result<(), AudioError> {
        self.answer(Call::Unmute).await
    }
}

/// 永遠不回應的標題來源
struct StuckSource;

#[async_trait]
impl WindowTitleSource for StuckSource {
    async fn current_title(&self) -> admute::Result<String> {
        std::future::pending().await
    }
}

fn new_monitor(audio: &MockAudio) -> PlaybackMonitor<MockAudio> {
    let classifier = TitleClassifier::for_player("spotify").unwrap();
    PlaybackMonitor::new(classifier, audio.clone(), "spotify")
        .with_command_timeout(Duration::from_millis(100))
}

async fn next_events(events: &mut broadcast::Receiver<MonitorEvent>, n: usize) -> Vec<MonitorEvent> {
    let mut collected = Vec::with_capacity(n);
    while collected.len() < n {
        collected.push(events.recv().await.unwrap());
    }
    collected
}

#[tokio::test(start_paused = true)]
async fn test_runner_drives_ad_content_cycle() {
    let audio = MockAudio::default();
    let source = ReplayTitleSource::new(["", "Spotify", "Artist A - Song 1", "Spotify", "Artist B - Song 2"]);

    let handle = spawn_monitor(new_monitor(&audio), source, TICK);
    let mut events = handle.subscribe();

    let received = next_events(&mut events, 4).await;
    assert!(matches!(received[0], MonitorEvent::AdDetected { count: 1, .. }));
    assert!(matches!(received[1], MonitorEvent::AdCleared { .. }));
    assert!(matches!(received[2], MonitorEvent::AdDetected { count: 2, .. }));
    assert!(matches!(received[3], MonitorEvent::AdCleared { .. }));

    // the last title keeps repeating and must not trigger anything
    tokio::time::sleep(TICK * 10).await;

    let state = handle.stop().await.unwrap();
    assert_eq!(state.ad_transitions, 2);
    assert_eq!(state.content_transitions, 2);
    assert_eq!(
        audio.calls(),
        vec![Call::Mute, Call::Unmute, Call::Mute, Call::Unmute]
    );
}

#[tokio::test(start_paused = true)]
async fn test_stop_while_muted_restores_audio() {
    let audio = MockAudio::default();
    let handle = spawn_monitor(new_monitor(&audio), ReplayTitleSource::new(["Spotify"]), TICK);
    let mut events = handle.subscribe();

    next_events(&mut events, 1).await;
    tokio::time::sleep(TICK * 3).await;

    let state = handle.stop().await.unwrap();
    assert!(!state.is_muted);
    assert_eq!(audio.calls(), vec![Call::Mute, Call::Unmute]);
}

#[tokio::test(start_paused = true)]
async fn test_quit_command_restores_audio() {
    let audio = MockAudio::default();
    let handle = spawn_monitor(new_monitor(&audio), ReplayTitleSource::new(["Spotify"]), TICK);
    let mut events = handle.subscribe();

    next_events(&mut events, 1).await;
    handle.send(MonitorCommand::Quit).await.unwrap();

    let state = handle.join().await.unwrap();
    assert!(!state.is_muted);
    assert_eq!(audio.calls(), vec![Call::Mute, Call::Unmute]);
}

#[tokio::test(start_paused = true)]
async fn test_disable_and_status_commands() {
    let audio = MockAudio::default();
    let handle = spawn_monitor(new_monitor(&audio), ReplayTitleSource::new(["Spotify"]), TICK);
    let mut events = handle.subscribe();

    next_events(&mut events, 1).await;
    let status = handle.status().await.unwrap();
    assert!(status.enabled);
    assert!(status.is_muted);
    assert_eq!(status.phase, PlaybackPhase::Advertisement);
    assert_eq!(status.last_title, "Spotify");

    handle.send(MonitorCommand::Toggle).await.unwrap();
    assert_eq!(
        next_events(&mut events, 1).await,
        vec![MonitorEvent::Disabled { unmuted: true }]
    );

    let status = handle.status().await.unwrap();
    assert!(!status.enabled);
    assert!(!status.is_muted);

    // re-enabling picks the ad that is still on screen back up
    handle.send(MonitorCommand::Enable).await.unwrap();
    let received = next_events(&mut events, 2).await;
    assert_eq!(received[0], MonitorEvent::Enabled);
    assert!(matches!(received[1], MonitorEvent::AdDetected { count: 2, .. }));

    handle.stop().await.unwrap();
    assert_eq!(
        audio.calls(),
        vec![Call::Mute, Call::Unmute, Call::Mute, Call::Unmute]
    );
}

#[tokio::test(start_paused = true)]
async fn test_hung_audio_call_times_out() {
    let audio = MockAudio::hanging();
    let handle = spawn_monitor(new_monitor(&audio), ReplayTitleSource::new(["Spotify"]), TICK);
    let mut events = handle.subscribe();

    let received = next_events(&mut events, 2).await;
    for event in &received {
        match event {
            MonitorEvent::MuteFailed { title, reason } => {
                assert_eq!(title, "Spotify");
                assert!(reason.contains("timed out"));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    let state = handle.stop().await.unwrap();
    assert!(!state.is_muted);
    assert_eq!(state.ad_transitions, 1);
    // nothing was muted, so no unmute on the way out
    assert!(audio.calls().iter().all(|c| *c == Call::Mute));
}

#[tokio::test(start_paused = true)]
async fn test_stuck_title_source_does_not_block_stop() {
    let audio = MockAudio::default();
    let handle = spawn_monitor(new_monitor(&audio), StuckSource, TICK);

    tokio::time::sleep(TICK * 5).await;
    let state = handle.stop().await.unwrap();

    assert_eq!(state.phase, PlaybackPhase::Unknown);
    assert!(audio.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_reset_command_clears_counters() {
    let audio = MockAudio::default();
    let handle = spawn_monitor(new_monitor(&audio), ReplayTitleSource::new(["Spotify"]), TICK);
    let mut events = handle.subscribe();

    next_events(&mut events, 1).await;
    handle.send(MonitorCommand::Reset).await.unwrap();

    // after the reset the ad is seen again as a fresh title
    let received = next_events(&mut events, 1).await;
    assert!(matches!(received[0], MonitorEvent::AdDetected { count: 1, .. }));

    handle.stop().await.unwrap();
    assert_eq!(
        audio.calls(),
        vec![Call::Mute, Call::Unmute, Call::Mute, Call::Unmute]
    );
}
