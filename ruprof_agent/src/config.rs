//! Sampler configuration: CLI values layered over `RUPROF_*` env overrides.

use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

pub const DEFAULT_PID_FILE: &str = "./profile.pid";
pub const DEFAULT_CGROUP_DIR: &str = "/sys/fs/cgroup";
pub const DEFAULT_NET_IFACE: &str = "eth0";

/// Which metric levels a tick collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Levels {
    pub vm: bool,
    pub container: bool,
    pub process: bool,
}

impl Levels {
    pub const ALL: Levels = Levels {
        vm: true,
        container: true,
        process: true,
    };

    /// No flag given means every level.
    pub fn from_flags(vm: bool, container: bool, process: bool) -> Self {
        if !vm && !container && !process {
            Self::ALL
        } else {
            Levels {
                vm,
                container,
                process,
            }
        }
    }
}

impl Default for Levels {
    fn default() -> Self {
        Self::ALL
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CgroupVersion {
    V1,
    V2,
    #[default]
    Auto,
}

impl CgroupVersion {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "v1" | "1" => Some(CgroupVersion::V1),
            "v2" | "2" => Some(CgroupVersion::V2),
            "auto" => Some(CgroupVersion::Auto),
            _ => None,
        }
    }

    /// Resolve `Auto`: the unified hierarchy exposes `cgroup.controllers` at its root.
    pub fn resolve(self, cgroup_root: &Path) -> Self {
        match self {
            CgroupVersion::Auto if cgroup_root.join("cgroup.controllers").exists() => {
                CgroupVersion::V2
            }
            CgroupVersion::Auto => CgroupVersion::V1,
            v => v,
        }
    }
}

/// Filesystem roots the probes read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePaths {
    pub proc_root: PathBuf,
    pub sys_root: PathBuf,
    pub cgroup_root: PathBuf,
    pub hostname_file: PathBuf,
}

impl Default for SourcePaths {
    fn default() -> Self {
        Self {
            proc_root: env_path("RUPROF_PROC_ROOT").unwrap_or_else(|| PathBuf::from("/proc")),
            sys_root: env_path("RUPROF_SYS_ROOT").unwrap_or_else(|| PathBuf::from("/sys")),
            cgroup_root: env_path("RUPROF_CGROUP_DIR")
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CGROUP_DIR)),
            hostname_file: PathBuf::from("/etc/hostname"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SamplerConfig {
    pub output_dir: PathBuf,
    /// 0 = back-to-back ticks, no pacing.
    pub interval_ms: u64,
    pub levels: Levels,
    pub pid_file: PathBuf,
    pub net_iface: String,
    pub cgroup_version: CgroupVersion,
    pub paths: SourcePaths,
}

impl SamplerConfig {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            interval_ms: 0,
            levels: Levels::ALL,
            pid_file: env_path("RUPROF_PID_FILE")
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PID_FILE)),
            net_iface: default_iface().to_string(),
            cgroup_version: std::env::var("RUPROF_CGROUP_VERSION")
                .ok()
                .and_then(|v| CgroupVersion::parse(&v))
                .unwrap_or_default(),
            paths: SourcePaths::default(),
        }
    }

    /// The loop owns the liveness file only when it runs on a fixed cadence.
    pub fn removes_pid_file(&self) -> bool {
        self.interval_ms != 0
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var_os(key)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

// Read once
fn default_iface() -> &'static str {
    static IFACE: OnceCell<String> = OnceCell::new();
    IFACE.get_or_init(|| {
        std::env::var("RUPROF_NET_IFACE")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_NET_IFACE.to_string())
    })
}
