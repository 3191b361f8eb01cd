//! One-time host description: kernel, CPU model, cache topology, identity.

use crate::config::SourcePaths;
use crate::error::{ProbeError, ProbeResult};
use crate::probe::{read_first_line, read_source, run_command};
use crate::procfs::parse_cpu_model;
use crate::record::FaultLog;
use crate::state::HostState;
use crate::types::StaticInfo;
use crate::units::parse_cache_size;
use std::collections::BTreeMap;
use std::path::Path;
use sysinfo::System;

pub const UNAVAILABLE: &str = "unavailable";

/// One `cpuN/cache/indexM` directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheIndex {
    pub level: u32,
    /// "d", "i" or "" for unified caches.
    pub kind: &'static str,
    pub shared_cpu_map: String,
    pub size: u64,
}

impl CacheIndex {
    pub fn key(&self) -> String {
        format!("L{}{}", self.level, self.kind)
    }
}

pub fn cache_kind(raw: &str) -> &'static str {
    match raw.trim() {
        "Data" => "d",
        "Instruction" => "i",
        _ => "",
    }
}

pub fn read_cache_index(dir: &Path) -> ProbeResult<CacheIndex> {
    let target = dir.display().to_string();
    let level = read_first_line(&dir.join("level"))?
        .parse::<u32>()
        .map_err(|e| ProbeError::parse(&target, format!("level: {e}")))?;
    let kind = cache_kind(&read_first_line(&dir.join("type"))?);
    let shared_cpu_map = read_first_line(&dir.join("shared_cpu_map"))?;
    let raw_size = read_first_line(&dir.join("size"))?;
    let size = parse_cache_size(&raw_size)
        .ok_or_else(|| ProbeError::parse(&target, format!("size {raw_size:?}")))?;
    Ok(CacheIndex {
        level,
        kind,
        shared_cpu_map,
        size,
    })
}

/// Total size per cache key. Every core sharing a cache instance reports it,
/// so instances are counted once per distinct `shared_cpu_map`.
pub fn aggregate_caches<I>(entries: I) -> BTreeMap<String, u64>
where
    I: IntoIterator<Item = CacheIndex>,
{
    let mut instances: BTreeMap<String, BTreeMap<String, u64>> = BTreeMap::new();
    for e in entries {
        instances
            .entry(e.key())
            .or_default()
            .entry(e.shared_cpu_map)
            .or_insert(e.size);
    }
    instances
        .into_iter()
        .map(|(key, maps)| (key, maps.values().sum()))
        .collect()
}

/// Walk `<sys>/devices/system/cpu/cpu*/cache/index*`. Unreadable index
/// directories are reported and left out.
pub fn scan_caches(sys_root: &Path, log: &mut FaultLog) -> BTreeMap<String, u64> {
    let pattern = format!(
        "{}/devices/system/cpu/cpu[0-9]*/cache/index[0-9]*",
        glob::Pattern::escape(&sys_root.display().to_string())
    );
    let dirs = match glob::glob(&pattern) {
        Ok(paths) => paths.filter_map(Result::ok).collect::<Vec<_>>(),
        Err(e) => {
            log.report("vCpuCache", &ProbeError::parse(&pattern, e.to_string()));
            Vec::new()
        }
    };
    let entries = dirs.iter().filter_map(|d| match read_cache_index(d) {
        Ok(ci) => Some(ci),
        Err(e) => {
            log.report("vCpuCache", &e);
            None
        }
    });
    aggregate_caches(entries.collect::<Vec<_>>())
}

fn or_placeholder(res: ProbeResult<String>, field: &str, log: &mut FaultLog) -> String {
    res.unwrap_or_else(|e| {
        log.report(field, &e);
        UNAVAILABLE.to_string()
    })
}

fn container_id(paths: &SourcePaths) -> ProbeResult<String> {
    read_first_line(&paths.hostname_file)
        .and_then(|h| {
            if h.is_empty() {
                Err(ProbeError::unavailable(paths.hostname_file.display().to_string()))
            } else {
                Ok(h)
            }
        })
        .or_else(|e| {
            hostname::get()
                .map(|h| h.to_string_lossy().into_owned())
                .map_err(|_| e)
        })
}

/// Gather static info. Each sub-probe degrades to a placeholder on failure.
pub fn collect_static(state: &HostState, paths: &SourcePaths, log: &mut FaultLog) -> StaticInfo {
    let kernel = run_command("uname", &["-a"]).map(|s| s.trim_end().to_string());
    let cpu_type = read_source(&paths.proc_root.join("cpuinfo")).and_then(|s| parse_cpu_model(&s));
    let container_id = container_id(paths).unwrap_or_else(|e| {
        log.report("cId", &e);
        "unknown".to_string()
    });
    StaticInfo {
        kernel_info: or_placeholder(kernel, "vKernelInfo", log),
        cpu_type: or_placeholder(cpu_type, "vCpuType", log),
        cpu_cache: scan_caches(&paths.sys_root, log),
        boot_time: System::boot_time(),
        vm_id: UNAVAILABLE.to_string(),
        num_processors: state.logical_cpus(),
        container_id,
    }
}
