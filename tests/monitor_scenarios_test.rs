use admute::{
    AudioController, AudioError, Classification, MonitorEvent, PlaybackMonitor, TitleClassifier,
    TitleSample,
};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Call {
    Mute,
    Unmute,
}

/// 記錄每一次呼叫，並可切換成失敗模式
#[derive(Clone, Default)]
struct MockAudio {
    calls: Arc<Mutex<Vec<Call>>>,
    fail: Arc<Mutex<bool>>,
}

impl MockAudio {
    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn fail(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    fn answer(&self, call: Call) -> Result<(), AudioError> {
        self.calls.lock().unwrap().push(call);
        if *self.fail.lock().unwrap() {
            Err(AudioError::NoSessions("spotify".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl AudioController for MockAudio {
    async fn mute(&self, _process_name: &str) -> Result<(), AudioError> {
        self.answer(Call::Mute)
    }

    async fn unmute(&self, _process_name: &str) -> Result<(), AudioError> {
        self.answer(Call::Unmute)
    }
}

fn new_monitor(audio: &MockAudio) -> PlaybackMonitor<MockAudio> {
    let classifier = TitleClassifier::for_player("spotify").unwrap();
    PlaybackMonitor::new(classifier, audio.clone(), "spotify")
}

async fn feed(monitor: &mut PlaybackMonitor<MockAudio>, titles: &[&str]) -> Vec<MonitorEvent> {
    let mut events = Vec::new();
    for title in titles {
        if let Some(event) = monitor.on_sample(&TitleSample::new(*title)).await {
            events.push(event);
        }
    }
    events
}

#[tokio::test]
async fn test_ad_content_alternation() {
    let audio = MockAudio::default();
    let mut monitor = new_monitor(&audio);

    let events = feed(
        &mut monitor,
        &["", "Spotify", "Artist A - Song 1", "Spotify", "Artist B - Song 2"],
    )
    .await;

    assert_eq!(
        audio.calls(),
        vec![Call::Mute, Call::Unmute, Call::Mute, Call::Unmute]
    );
    assert_eq!(
        events,
        vec![
            MonitorEvent::AdDetected {
                count: 1,
                title: "Spotify".to_string()
            },
            MonitorEvent::AdCleared {
                title: "Artist A - Song 1".to_string()
            },
            MonitorEvent::AdDetected {
                count: 2,
                title: "Spotify".to_string()
            },
            MonitorEvent::AdCleared {
                title: "Artist B - Song 2".to_string()
            },
        ]
    );
    assert_eq!(monitor.state().ad_transitions, 2);
    assert_eq!(monitor.state().content_transitions, 2);
    assert!(!monitor.state().is_muted);
}

#[tokio::test]
async fn test_unchanged_title_for_100_ticks() {
    let audio = MockAudio::default();
    let mut monitor = new_monitor(&audio);

    let titles = vec!["Spotify"; 100];
    feed(&mut monitor, &titles).await;

    assert_eq!(audio.calls(), vec![Call::Mute]);
    assert_eq!(monitor.state().ad_transitions, 1);
}

#[tokio::test]
async fn test_identical_titles_debounced() {
    let audio = MockAudio::default();
    let mut monitor = new_monitor(&audio);

    feed(&mut monitor, &["Spotify", "Spotify", "Muse - Uprising", "Muse - Uprising"]).await;

    assert_eq!(audio.calls(), vec![Call::Mute, Call::Unmute]);
}

#[tokio::test]
async fn test_content_without_prior_mute_issues_nothing() {
    let audio = MockAudio::default();
    let mut monitor = new_monitor(&audio);

    let events = feed(&mut monitor, &["Radiohead - Creep", "Muse - Uprising"]).await;

    assert!(events.is_empty());
    assert!(audio.calls().is_empty());
    assert_eq!(monitor.state().content_transitions, 0);
}

#[tokio::test]
async fn test_window_gap_does_not_unmute() {
    let audio = MockAudio::default();
    let mut monitor = new_monitor(&audio);

    feed(&mut monitor, &["Spotify", "", "", "Spotify"]).await;

    // the return to "Spotify" after the gap only reasserts
    assert_eq!(audio.calls(), vec![Call::Mute, Call::Mute]);
    assert!(monitor.state().is_muted);
    assert_eq!(monitor.state().ad_transitions, 1);
}

#[tokio::test]
async fn test_failed_mute_rearms_same_title() {
    let audio = MockAudio::default();
    let mut monitor = new_monitor(&audio);

    audio.fail(true);
    let events = feed(&mut monitor, &["Advertisement", "Advertisement"]).await;
    assert_eq!(audio.calls(), vec![Call::Mute, Call::Mute]);
    assert!(events
        .iter()
        .all(|e| matches!(e, MonitorEvent::MuteFailed { title, .. } if title == "Advertisement")));

    audio.fail(false);
    feed(&mut monitor, &["Advertisement", "Advertisement"]).await;
    assert_eq!(audio.calls(), vec![Call::Mute, Call::Mute, Call::Mute]);
    assert!(monitor.state().is_muted);
    assert_eq!(monitor.state().ad_transitions, 1);
}

#[tokio::test]
async fn test_disable_while_muted_unmutes_once() {
    let audio = MockAudio::default();
    let mut monitor = new_monitor(&audio);
    feed(&mut monitor, &["Spotify"]).await;

    let event = monitor.set_enabled(false).await;
    assert_eq!(event, Some(MonitorEvent::Disabled { unmuted: true }));

    // disabling twice is a no-op
    assert_eq!(monitor.set_enabled(false).await, None);
    assert_eq!(audio.calls(), vec![Call::Mute, Call::Unmute]);
    assert!(!monitor.state().is_muted);
}

#[tokio::test]
async fn test_shutdown_after_repeated_unmute_failures() {
    let audio = MockAudio::default();
    let mut monitor = new_monitor(&audio);
    feed(&mut monitor, &["Spotify"]).await;

    audio.fail(true);
    feed(&mut monitor, &["Muse - Uprising", "Muse - Uprising", "Muse - Uprising"]).await;
    assert!(monitor.state().is_muted);
    assert_eq!(monitor.state().content_transitions, 1);

    let state = monitor.shutdown().await;
    assert!(!state.is_muted);
    assert_eq!(
        audio.calls(),
        vec![Call::Mute, Call::Unmute, Call::Unmute, Call::Unmute, Call::Unmute]
    );
}

#[test]
fn test_classify_is_total() {
    let classifier = TitleClassifier::for_player("spotify").unwrap();
    let inputs = [
        "",
        " ",
        "\t\n",
        "-",
        " - ",
        "🎵🎵🎵",
        "a - b",
        "Spotify - Advertisement",
        "Radiohead - Creep",
        "SPOTIFY PREMIUM",
        "ﾃｽﾄ – ﾃｽﾄ",
    ];

    for input in inputs {
        let verdict = classifier.classify(input);
        assert!(matches!(
            verdict,
            Classification::Content | Classification::Advertisement
        ));
    }

    assert_eq!(classifier.classify(""), Classification::Advertisement);
    assert_eq!(
        classifier.classify("Spotify - Advertisement"),
        Classification::Advertisement
    );
    assert_eq!(classifier.classify("Radiohead - Creep"), Classification::Content);
}
