use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, RefreshKind, System};

/// Exact, case-insensitive process-name match; a trailing `.exe` is ignored.
pub fn matches_process_name(actual: &str, target: &str) -> bool {
    let actual = actual.to_lowercase();
    let target = target.trim().to_lowercase();
    actual == target || actual.strip_suffix(".exe") == Some(target.as_str())
}

pub fn is_process_running(target: &str) -> bool {
    let system = System::new_with_specifics(
        RefreshKind::nothing().with_processes(ProcessRefreshKind::nothing()),
    );
    system
        .processes()
        .values()
        .any(|process| matches_process_name(&process.name().to_string_lossy(), target))
}

/// 每次只刷新指定的 PID，避免每個 tick 掃描全部程序
pub(crate) fn refresh_pids(system: &mut System, pids: &[sysinfo::Pid]) {
    system.refresh_processes_specifics(
        ProcessesToUpdate::Some(pids),
        true,
        ProcessRefreshKind::nothing(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_process_name() {
        assert!(matches_process_name("spotify", "spotify"));
        assert!(matches_process_name("Spotify.exe", "spotify"));
        assert!(matches_process_name("SPOTIFY", " Spotify "));
        assert!(!matches_process_name("spotifyd", "spotify"));
        assert!(!matches_process_name("firefox", "spotify"));
    }

    #[test]
    fn test_current_process_is_running() {
        let system = System::new_with_specifics(
            RefreshKind::nothing().with_processes(ProcessRefreshKind::nothing()),
        );
        let pid = sysinfo::get_current_pid().unwrap();
        let name = system
            .process(pid)
            .map(|p| p.name().to_string_lossy().into_owned())
            .unwrap();

        assert!(is_process_running(&name));
    }
}
