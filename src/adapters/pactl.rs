//! PulseAudio / PipeWire backend. Every sink input (audio session) owned by
//! the player is muted, not just the first one found.
//!
//! `pactl list sink-inputs` and `pactl list clients` share one block format,
//! so both are parsed into [`PactlEntry`].

use crate::domain::ports::AudioController;
use crate::utils::error::{AudioError, Result};
use async_trait::async_trait;
use regex::Regex;
use tokio::process::Command;

/// 一個 sink input 或 client 區塊；client 沒有 Mute 欄位，`muted` 恆為 false
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PactlEntry {
    pub id: u32,
    pub binary: Option<String>,
    pub app_name: Option<String>,
    pub muted: bool,
}

impl PactlEntry {
    pub fn owned_by(&self, process_name: &str) -> bool {
        let target = process_name.trim().to_lowercase();
        [&self.binary, &self.app_name]
            .into_iter()
            .flatten()
            .any(|name| name.to_lowercase() == target)
    }
}

struct PactlParser {
    header: Regex,
    property: Regex,
    mute: Regex,
}

impl PactlParser {
    fn new() -> Result<Self> {
        Ok(Self {
            header: Regex::new(r"^(?:Sink Input|Client) #(\d+)")?,
            property: Regex::new(r#"^\s*([\w.]+) = "(.*)"$"#)?,
            mute: Regex::new(r"^\s*Mute: (yes|no)")?,
        })
    }

    fn parse(&self, output: &str) -> Vec<PactlEntry> {
        let mut inputs = Vec::new();
        let mut current: Option<PactlEntry> = None;

        for line in output.lines() {
            if let Some(caps) = self.header.captures(line) {
                inputs.extend(current.take());
                current = caps[1].parse().ok().map(|id| PactlEntry {
                    id,
                    ..Default::default()
                });
                continue;
            }

            let Some(input) = current.as_mut() else {
                continue;
            };

            if let Some(caps) = self.mute.captures(line) {
                input.muted = &caps[1] == "yes";
            } else if let Some(caps) = self.property.captures(line) {
                match &caps[1] {
                    "application.process.binary" => input.binary = Some(caps[2].to_string()),
                    "application.name" => input.app_name = Some(caps[2].to_string()),
                    _ => {}
                }
            }
        }

        inputs.extend(current);
        inputs
    }
}

pub struct PactlAudioController {
    parser: PactlParser,
}

impl PactlAudioController {
    pub fn new() -> Result<Self> {
        Ok(Self {
            parser: PactlParser::new()?,
        })
    }

    pub fn parse_entries(&self, output: &str) -> Vec<PactlEntry> {
        self.parser.parse(output)
    }

    /// Sink inputs currently owned by the player.
    pub async fn sessions(
        &self,
        process_name: &str,
    ) -> std::result::Result<Vec<PactlEntry>, AudioError> {
        let listing = Self::pactl(&["list", "sink-inputs"]).await?;
        Ok(self
            .parse_entries(&listing)
            .into_iter()
            .filter(|input| input.owned_by(process_name))
            .collect())
    }

    /// 沒有 session 時分辨「播放器沒在跑」與「播放器沒有出聲」
    async fn missing_sessions_error(&self, process_name: &str) -> AudioError {
        match Self::pactl(&["list", "clients"]).await {
            Ok(listing) => no_session_error(&self.parse_entries(&listing), process_name),
            Err(e) => {
                tracing::debug!("Could not list pactl clients: {}", e);
                AudioError::NoSessions(process_name.to_string())
            }
        }
    }

    async fn pactl(args: &[&str]) -> std::result::Result<String, AudioError> {
        let output = Command::new("pactl")
            .args(args)
            .env("LC_ALL", "C")
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| AudioError::Io(e.to_string()))?;

        if !output.status.success() {
            return Err(AudioError::CommandFailed {
                message: format!(
                    "pactl {} exited with {}: {}",
                    args.join(" "),
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn set_mute(&self, process_name: &str, muted: bool) -> std::result::Result<(), AudioError> {
        let sessions = self.sessions(process_name).await?;
        if sessions.is_empty() {
            return Err(self.missing_sessions_error(process_name).await);
        }

        let already = sessions.iter().filter(|s| s.muted == muted).count();
        if already > 0 {
            tracing::debug!(
                "{}/{} sessions of '{}' already have mute={}",
                already,
                sessions.len(),
                process_name,
                muted
            );
        }

        let flag = if muted { "1" } else { "0" };
        let mut updated = 0usize;
        let mut last_error = None;

        for session in &sessions {
            let id = session.id.to_string();
            match Self::pactl(&["set-sink-input-mute", &id, flag]).await {
                Ok(_) => updated += 1,
                Err(e) => {
                    tracing::debug!("Sink input #{} not updated: {}", session.id, e);
                    last_error = Some(e);
                }
            }
        }

        // 至少一個 session 成功才算成功
        match (updated, last_error) {
            (0, Some(e)) => Err(e),
            (0, None) => Err(AudioError::NoSessions(process_name.to_string())),
            (n, _) => {
                tracing::debug!("Set mute={} on {}/{} sessions of '{}'", muted, n, sessions.len(), process_name);
                Ok(())
            }
        }
    }
}

fn no_session_error(clients: &[PactlEntry], process_name: &str) -> AudioError {
    if clients.iter().any(|client| client.owned_by(process_name)) {
        AudioError::NoSessions(process_name.to_string())
    } else {
        AudioError::ProcessNotFound(process_name.to_string())
    }
}

#[async_trait]
impl AudioController for PactlAudioController {
    async fn mute(&self, process_name: &str) -> std::result::Result<(), AudioError> {
        self.set_mute(process_name, true).await
    }

    async fn unmute(&self, process_name: &str) -> std::result::Result<(), AudioError> {
        self.set_mute(process_name, false).await
    }
}
