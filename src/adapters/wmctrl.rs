use crate::adapters::process::{matches_process_name, refresh_pids};
use crate::domain::ports::WindowTitleSource;
use crate::utils::error::{AdMuteError, Result};
use async_trait::async_trait;
use regex::Regex;
use std::sync::Mutex;
use sysinfo::{Pid, System};
use tokio::process::Command;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowEntry {
    pub pid: u32,
    pub title: String,
}

/// Reads X11 window titles through `wmctrl -lp` and keeps those owned by
/// the target process.
pub struct WmctrlTitleSource {
    process_name: String,
    line_re: Regex,
    system: Mutex<System>,
}

impl WmctrlTitleSource {
    pub fn new(process_name: impl Into<String>) -> Result<Self> {
        Ok(Self {
            process_name: process_name.into(),
            line_re: window_line_regex()?,
            system: Mutex::new(System::new()),
        })
    }

    fn owned_by_target(&self, windows: &[WindowEntry]) -> Result<Vec<bool>> {
        let pids: Vec<Pid> = windows.iter().map(|w| Pid::from_u32(w.pid)).collect();

        let mut system = self.system.lock().map_err(|_| AdMuteError::TitleSourceError {
            message: "process table lock poisoned".to_string(),
        })?;
        refresh_pids(&mut system, &pids);

        Ok(pids
            .iter()
            .map(|pid| {
                system
                    .process(*pid)
                    .map(|p| matches_process_name(&p.name().to_string_lossy(), &self.process_name))
                    .unwrap_or(false)
            })
            .collect())
    }
}

fn window_line_regex() -> Result<Regex> {
    // 0x03a00007  0 12345  host Title with spaces
    Ok(Regex::new(
        r"^0x[0-9a-fA-F]+\s+-?\d+\s+(\d+)\s+\S+(?:\s(.*))?$",
    )?)
}

pub fn parse_window_list(re: &Regex, output: &str) -> Vec<WindowEntry> {
    output
        .lines()
        .filter_map(|line| {
            let caps = re.captures(line)?;
            Some(WindowEntry {
                pid: caps[1].parse().ok()?,
                title: caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default(),
            })
        })
        .collect()
}

#[async_trait]
impl WindowTitleSource for WmctrlTitleSource {
    async fn current_title(&self) -> Result<String> {
        let output = Command::new("wmctrl")
            .arg("-lp")
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| AdMuteError::TitleSourceError {
                message: format!("failed to run wmctrl: {}", e),
            })?;

        if !output.status.success() {
            return Err(AdMuteError::TitleSourceError {
                message: format!(
                    "wmctrl exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        let windows = parse_window_list(&self.line_re, &String::from_utf8_lossy(&output.stdout));
        let owned = self.owned_by_target(&windows)?;

        // 第一個有內容的標題
        let title = windows
            .into_iter()
            .zip(owned)
            .filter(|(_, owned)| *owned)
            .map(|(window, _)| window.title)
            .find(|title| !title.trim().is_empty())
            .unwrap_or_default();

        Ok(title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_window_list() {
        let re = window_line_regex().unwrap();
        let output = "\
0x01e00003  0 1204   laptop Terminal
0x03a00007  0 48213  laptop Radiohead - Creep
0x03a0000b -1 48213  laptop
garbage line
";

        let windows = parse_window_list(&re, output);
        assert_eq!(windows.len(), 3);
        assert_eq!(
            windows[1],
            WindowEntry {
                pid: 48213,
                title: "Radiohead - Creep".to_string(),
            }
        );
        assert_eq!(windows[2].title, "");
    }

    #[test]
    fn test_title_keeps_inner_spacing() {
        let re = window_line_regex().unwrap();
        let windows = parse_window_list(&re, "0x0400000a  2 77  host Artist  -  Two  Spaces");
        assert_eq!(windows[0].title, "Artist  -  Two  Spaces");
    }
}
