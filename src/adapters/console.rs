//! Line-based control from a terminal.
//!
//! Lines are read on a plain OS thread. A read on stdin can block forever,
//! and a thread outside the runtime does not hold up process exit once the
//! monitor has stopped.

use crate::core::runner::MonitorCommand;
use crate::domain::model::StatusSnapshot;
use std::io::{BufRead, Write};
use std::thread::JoinHandle;
use tokio::sync::{mpsc, oneshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    Toggle,
    Enable,
    Disable,
    Reset,
    Status,
    Quit,
}

/// `Ok(None)` for a blank line, `Err` with the offending word otherwise.
pub fn parse_line(line: &str) -> std::result::Result<Option<ConsoleCommand>, String> {
    let word = line.trim().to_lowercase();
    let command = match word.as_str() {
        "" => return Ok(None),
        "toggle" => ConsoleCommand::Toggle,
        "enable" | "on" => ConsoleCommand::Enable,
        "disable" | "off" => ConsoleCommand::Disable,
        "reset" => ConsoleCommand::Reset,
        "status" => ConsoleCommand::Status,
        "quit" | "exit" | "q" => ConsoleCommand::Quit,
        _ => return Err(word),
    };
    Ok(Some(command))
}

pub fn format_status(status: &StatusSnapshot) -> String {
    format!(
        "{} | {} | phase: {:?} | blocked: {} | title: '{}'",
        if status.enabled { "✓ active" } else { "✗ disabled" },
        if status.is_muted { "🔇 muted" } else { "🔊 audible" },
        status.phase,
        status.ad_transitions,
        status.last_title
    )
}

/// Forwards commands read from `input` until `quit`, end of input, or the
/// monitor going away. Status replies and complaints go to `output`.
pub fn spawn_console_control<R, W>(
    input: R,
    mut output: W,
    commands: mpsc::Sender<MonitorCommand>,
) -> JoinHandle<()>
where
    R: BufRead + Send + 'static,
    W: Write + Send + 'static,
{
    std::thread::spawn(move || {
        for line in input.lines() {
            let Ok(line) = line else {
                break;
            };

            let command = match parse_line(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(word) => {
                    let _ = writeln!(output, "Unknown command '{}'", word);
                    continue;
                }
            };

            let request = match command {
                ConsoleCommand::Status => {
                    let (tx, rx) = oneshot::channel();
                    if commands.blocking_send(MonitorCommand::Status(tx)).is_err() {
                        break;
                    }
                    if let Ok(status) = rx.blocking_recv() {
                        let _ = writeln!(output, "{}", format_status(&status));
                    }
                    continue;
                }
                ConsoleCommand::Toggle => MonitorCommand::Toggle,
                ConsoleCommand::Enable => MonitorCommand::Enable,
                ConsoleCommand::Disable => MonitorCommand::Disable,
                ConsoleCommand::Reset => MonitorCommand::Reset,
                ConsoleCommand::Quit => MonitorCommand::Quit,
            };

            let quit = command == ConsoleCommand::Quit;
            if commands.blocking_send(request).is_err() || quit {
                break;
            }
        }
        tracing::debug!("Console control stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::PlaybackPhase;

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line("  Toggle "), Ok(Some(ConsoleCommand::Toggle)));
        assert_eq!(parse_line("off"), Ok(Some(ConsoleCommand::Disable)));
        assert_eq!(parse_line("q"), Ok(Some(ConsoleCommand::Quit)));
        assert_eq!(parse_line("   "), Ok(None));
        assert_eq!(parse_line("Mute"), Err("mute".to_string()));
    }

    #[test]
    fn test_format_status() {
        let status = StatusSnapshot {
            enabled: true,
            is_muted: true,
            phase: PlaybackPhase::Advertisement,
            last_title: "Spotify".to_string(),
            ad_transitions: 2,
            content_transitions: 1,
        };

        let line = format_status(&status);
        assert!(line.starts_with("✓ active | 🔇 muted"));
        assert!(line.contains("blocked: 2"));
        assert!(line.ends_with("title: 'Spotify'"));
    }

    #[test]
    fn test_stops_when_monitor_is_gone() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        let thread = spawn_console_control(
            std::io::Cursor::new("toggle\nstatus\n"),
            std::io::sink(),
            tx,
        );
        assert!(thread.join().is_ok());
    }
}
