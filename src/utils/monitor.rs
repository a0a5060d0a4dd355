#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct PhaseStats {
    pub phase: String,
    pub memory_mb: u64,
    pub peak_memory_mb: u64,
    pub phase_time: Duration,
    pub elapsed_time: Duration,
}

#[cfg(feature = "cli")]
struct MonitorState {
    system: System,
    peak_memory_mb: u64,
    last_mark: Instant,
}

/// 掃描過程的記憶體與各階段耗時
#[cfg(feature = "cli")]
pub struct ScanMonitor {
    state: Option<Mutex<MonitorState>>,
    pid: Option<Pid>,
    start_time: Instant,
}

#[cfg(feature = "cli")]
impl ScanMonitor {
    pub fn new(enabled: bool) -> Self {
        let now = Instant::now();
        let pid = sysinfo::get_current_pid().ok();
        let state = (enabled && pid.is_some()).then(|| {
            Mutex::new(MonitorState {
                system: System::new(),
                peak_memory_mb: 0,
                last_mark: now,
            })
        });

        if enabled && pid.is_none() {
            tracing::warn!("Process monitoring unavailable on this platform");
        }

        Self {
            state,
            pid,
            start_time: now,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.state.is_some()
    }

    /// 記錄一個階段結束時的狀態
    pub fn mark(&self, phase: &str) -> Option<PhaseStats> {
        let pid = self.pid?;
        let mut state = self.state.as_ref()?.lock().ok()?;

        state.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing().with_memory(),
        );
        let memory_mb = state.system.process(pid)?.memory() / 1024 / 1024;
        state.peak_memory_mb = state.peak_memory_mb.max(memory_mb);

        let now = Instant::now();
        let phase_time = now.duration_since(state.last_mark);
        state.last_mark = now;

        Some(PhaseStats {
            phase: phase.to_string(),
            memory_mb,
            peak_memory_mb: state.peak_memory_mb,
            phase_time,
            elapsed_time: self.start_time.elapsed(),
        })
    }

    pub fn log_stats(&self, phase: &str) {
        if let Some(stats) = self.mark(phase) {
            tracing::info!(
                "📊 {} - Memory: {}MB, Peak: {}MB, Phase: {:?}, Total: {:?}",
                stats.phase,
                stats.memory_mb,
                stats.peak_memory_mb,
                stats.phase_time,
                stats.elapsed_time
            );
        }
    }

    pub fn log_final_stats(&self) {
        if let Some(stats) = self.mark("Final") {
            tracing::info!(
                "📊 Final Stats - Total Time: {:?}, Peak Memory: {}MB",
                stats.elapsed_time,
                stats.peak_memory_mb
            );
        }
    }
}

#[cfg(feature = "cli")]
impl Default for ScanMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

// 非 CLI 建置時不做任何事
#[cfg(not(feature = "cli"))]
#[derive(Default)]
pub struct ScanMonitor;

#[cfg(not(feature = "cli"))]
impl ScanMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn is_enabled(&self) -> bool {
        false
    }

    pub fn log_stats(&self, _phase: &str) {}

    pub fn log_final_stats(&self) {}
}
