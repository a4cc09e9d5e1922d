use admute::adapters::{
    console::spawn_console_control, process::is_process_running, DryRunAudioController,
    PactlAudioController, ReplayTitleSource, WmctrlTitleSource,
};
use admute::config::toml_config::LogFormat;
use admute::core::diagnostics::{mute_round_trip, SELF_TEST_HOLD};
use admute::utils::error::ErrorSeverity;
use admute::utils::logger;
use admute::{
    spawn_monitor, AdMuteError, AudioController, CliConfig, MonitorCommand, MonitorHandle,
    PlaybackMonitor, Settings, TitleClassifier, WindowTitleSource,
};
use clap::Parser;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    let settings = match Settings::resolve(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(exit_code(&e));
        }
    };

    match settings.log_format {
        LogFormat::Compact => logger::init_cli_logger(settings.verbose),
        LogFormat::Json => logger::init_json_logger(settings.verbose),
    }
    tracing::debug!("Effective settings: {:?}", settings);

    if let Err(e) = run(cli, settings).await {
        tracing::error!(
            "❌ admute stopped: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(exit_code(&e));
    }
}

fn exit_code(e: &AdMuteError) -> i32 {
    match e.severity() {
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

async fn run(cli: CliConfig, settings: Settings) -> admute::Result<()> {
    if cli.self_test {
        return self_test(&cli, &settings).await;
    }

    tracing::info!("🚀 Starting admute for '{}'", settings.process_name);

    let source: Box<dyn WindowTitleSource> = match &cli.replay {
        Some(path) => {
            tracing::info!("📁 Replaying titles from {}", path);
            Box::new(ReplayTitleSource::from_file(path)?)
        }
        None => {
            if !is_process_running(&settings.process_name) {
                tracing::warn!(
                    "⚠️ '{}' is not running yet; it will be picked up once it starts",
                    settings.process_name
                );
            }
            Box::new(WmctrlTitleSource::new(settings.process_name.clone())?)
        }
    };

    let controller = audio_controller(&cli)?;

    let classifier = TitleClassifier::new(settings.rules.clone())?;
    let monitor = PlaybackMonitor::new(classifier, controller, settings.process_name.clone())
        .with_command_timeout(settings.command_timeout)
        .with_enabled(settings.start_enabled);

    let handle = spawn_monitor(monitor, source, settings.poll_interval);

    if cli.emit_events {
        spawn_event_printer(&handle);
    }
    spawn_signal_handler(handle.commands());
    // 不等待這個執行緒：stdin 可能一直沒有輸入
    spawn_console_control(
        std::io::BufReader::new(std::io::stdin()),
        std::io::stdout(),
        handle.commands(),
    );

    tracing::info!("Type toggle / enable / disable / status / reset / quit, or press Ctrl+C");

    let state = handle.join().await?;
    tracing::info!("👋 Stopped after blocking {} ads", state.ad_transitions);
    Ok(())
}

fn audio_controller(cli: &CliConfig) -> admute::Result<Box<dyn AudioController>> {
    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - audio will not be touched");
        Ok(Box::new(DryRunAudioController::new()))
    } else {
        Ok(Box::new(PactlAudioController::new()?))
    }
}

async fn self_test(cli: &CliConfig, settings: &Settings) -> admute::Result<()> {
    tracing::info!("🧪 Self test for '{}'", settings.process_name);

    if cli.dry_run {
        let controller = DryRunAudioController::new();
        return mute_round_trip(
            &controller,
            &settings.process_name,
            SELF_TEST_HOLD,
            settings.command_timeout,
        )
        .await;
    }

    let controller = PactlAudioController::new()?;
    match controller.sessions(&settings.process_name).await {
        Ok(sessions) => tracing::info!(
            "Found {} audio session(s) for '{}'",
            sessions.len(),
            settings.process_name
        ),
        Err(e) => tracing::warn!("⚠️ Could not list audio sessions: {}", e),
    }

    mute_round_trip(
        &controller,
        &settings.process_name,
        SELF_TEST_HOLD,
        settings.command_timeout,
    )
    .await
}

fn spawn_event_printer(handle: &MonitorHandle) {
    let mut events = handle.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match serde_json::to_string(&event) {
                Ok(line) => println!("{}", line),
                Err(e) => tracing::warn!("Could not serialize event: {}", e),
            }
        }
    });
}

fn spawn_signal_handler(commands: mpsc::Sender<MonitorCommand>) {
    tokio::spawn(async move {
        wait_for_termination().await;
        let _ = commands.send(MonitorCommand::Quit).await;
    });
}

#[cfg(unix)]
async fn wait_for_termination() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => tracing::info!("Ctrl+C received"),
                _ = terminate.recv() => tracing::info!("SIGTERM received"),
            }
        }
        Err(e) => {
            tracing::warn!("Could not install SIGTERM handler: {}", e);
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Ctrl+C received");
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_termination() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Ctrl+C received");
}
