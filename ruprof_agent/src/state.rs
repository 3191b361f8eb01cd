//! Persistent sysinfo handles reused across ticks.

use sysinfo::{CpuRefreshKind, Disks, Networks, RefreshKind, System};

pub struct HostState {
    pub sys: System,
    pub disks: Disks,
    pub networks: Networks,
}

impl HostState {
    pub fn new() -> Self {
        let sys = System::new_with_specifics(
            RefreshKind::nothing().with_cpu(CpuRefreshKind::nothing().with_frequency()),
        );
        Self {
            sys,
            disks: Disks::new_with_refreshed_list(),
            networks: Networks::new_with_refreshed_list(),
        }
    }

    pub fn logical_cpus(&self) -> usize {
        match self.sys.cpus().len() {
            0 => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            n => n,
        }
    }
}

impl Default for HostState {
    fn default() -> Self {
        Self::new()
    }
}
