//! Persisted record shapes. Field names are the on-disk schema consumed by the
//! delta tooling and the chart renderer; keep them stable.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One-time host description written to `static.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StaticInfo {
    #[serde(rename = "vKernelInfo")]
    pub kernel_info: String,
    #[serde(rename = "vCpuType")]
    pub cpu_type: String,
    /// `L1d`/`L1i`/`L2`/`L3` -> total bytes across distinct cache instances.
    #[serde(rename = "vCpuCache")]
    pub cpu_cache: BTreeMap<String, u64>,
    #[serde(rename = "vBootTime")]
    pub boot_time: u64,
    #[serde(rename = "vId")]
    pub vm_id: String,
    #[serde(rename = "cNumProcessors")]
    pub num_processors: usize,
    #[serde(rename = "cId")]
    pub container_id: String,
}

/// Per-process entry of the `pProcesses` array. Times are centiseconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessRecord {
    #[serde(rename = "pId")]
    pub pid: u32,
    #[serde(rename = "pCmdline")]
    pub cmdline: String,
    #[serde(rename = "pName")]
    pub name: String,
    #[serde(rename = "pNumThreads")]
    pub num_threads: u64,
    #[serde(rename = "pCpuTimeUserMode")]
    pub cpu_user: f64,
    #[serde(rename = "pCpuTimeKernelMode")]
    pub cpu_kernel: f64,
    #[serde(rename = "pChildrenUserMode")]
    pub children_user: f64,
    #[serde(rename = "pChildrenKernelMode")]
    pub children_kernel: f64,
    #[serde(rename = "pVoluntaryContextSwitches")]
    pub voluntary_ctx: u64,
    #[serde(rename = "pInvoluntaryContextSwitches")]
    pub involuntary_ctx: u64,
    #[serde(rename = "pBlockIODelays")]
    pub block_io_delays: f64,
    #[serde(rename = "pVirtualMemoryBytes")]
    pub virtual_memory: u64,
}
