//! VM-level and process-level metrics collection.

use crate::blockdev::BlockDevice;
use crate::config::SourcePaths;
use crate::error::{ProbeError, ProbeResult};
use crate::probe::{keyed_value, read_source};
use crate::procfs::{
    join_cmdline, parse_cpu_times, parse_ctx_switches, parse_diskstats, parse_meminfo,
    parse_pid_stat, CpuTimes, DiskStat,
};
use crate::record::{now_secs, SampleBuilder};
use crate::state::HostState;
use crate::types::ProcessRecord;
use crate::units::{bytes_to_memory_unit, scaled_counter, ticks_to_centis};
use std::fs;
use std::path::Path;
use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System};
use tracing::debug;

type CpuPick = fn(&CpuTimes) -> u64;

const CPU_FIELDS: [(&str, CpuPick); 9] = [
    ("vCpuTime", |c: &CpuTimes| c.user + c.system),
    ("vCpuTimeUserMode", |c: &CpuTimes| c.user),
    ("vCpuTimeKernelMode", |c: &CpuTimes| c.system),
    ("vCpuIdleTime", |c: &CpuTimes| c.idle),
    ("vCpuTimeIOWait", |c: &CpuTimes| c.iowait),
    ("vCpuTimeIntSrvc", |c: &CpuTimes| c.irq),
    ("vCpuTimeSoftIntSrvc", |c: &CpuTimes| c.softirq),
    ("vCpuNice", |c: &CpuTimes| c.nice),
    ("vCpuSteal", |c: &CpuTimes| c.steal),
];

/// Disk counters summed over whole disks, plus the first disk's completed I/Os.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiskTotals {
    pub sectors_read: u64,
    pub sectors_written: u64,
    pub reads_merged: u64,
    pub writes_merged: u64,
    pub read_ms: u64,
    pub write_ms: u64,
    pub primary_reads: u64,
    pub primary_writes: u64,
}

pub fn disk_totals(stats: &[DiskStat], disks: &[BlockDevice]) -> DiskTotals {
    let mut t = DiskTotals::default();
    let is_whole = |s: &DiskStat| disks.iter().any(|d| d.name == s.name);
    for s in stats.iter().filter(|s| is_whole(s)) {
        t.sectors_read += s.sectors_read;
        t.sectors_written += s.sectors_written;
        t.reads_merged += s.reads_merged;
        t.writes_merged += s.writes_merged;
        t.read_ms += s.read_ms;
        t.write_ms += s.write_ms;
    }
    if let Some(primary) = disks
        .first()
        .and_then(|d| stats.iter().find(|s| s.name == d.name))
    {
        t.primary_reads = primary.reads;
        t.primary_writes = primary.writes;
    }
    t
}

/// Collect host-wide metrics.
pub fn collect_vm(
    state: &mut HostState,
    paths: &SourcePaths,
    disks: &[BlockDevice],
) -> SampleBuilder {
    let proc_root = paths.proc_root.as_path();
    let mut b = SampleBuilder::new();
    b.set("vMetricType", "VM Level");

    let stat = read_source(&proc_root.join("stat"));
    let cpu = stat.clone().and_then(|s| parse_cpu_times(&s)).unwrap_or_else(|e| {
        b.fault("vCpuTime", e);
        CpuTimes::default()
    });
    let ts = now_secs();
    for (key, pick) in CPU_FIELDS {
        b.set(key, ticks_to_centis(pick(&cpu)));
        b.set(format!("t{key}"), ts);
    }
    b.timed(
        "vCpuContextSwitches",
        stat.and_then(|s| keyed_value("/proc/stat", &s, "ctxt"))
            .map(scaled_counter),
        0,
    );

    let vmstat = read_source(&proc_root.join("vmstat"));
    b.probe(
        "vPgFault",
        vmstat.clone().and_then(|s| keyed_value("/proc/vmstat", &s, "pgfault")),
        0,
    );
    b.probe(
        "vMajorPageFault",
        vmstat.and_then(|s| keyed_value("/proc/vmstat", &s, "pgmajfault")),
        0,
    );

    let totals = match read_source(&proc_root.join("diskstats")) {
        Ok(text) => disk_totals(&parse_diskstats(&text), disks),
        Err(e) => {
            b.fault("vDiskStats", e);
            DiskTotals::default()
        }
    };
    b.set("vDiskSectorReads", totals.sectors_read);
    b.set("vDiskSectorWrites", totals.sectors_written);
    b.set("vDiskSuccessfulReads", totals.primary_reads);
    b.set("vDiskMergedReads", totals.reads_merged);
    b.set("vDiskReadTime", totals.read_ms);
    b.set("vDiskSuccessfulWrites", totals.primary_writes);
    b.set("vDiskMergedWrites", totals.writes_merged);
    b.set("vDiskWriteTime", totals.write_ms);

    let (total, free) = root_fs_usage(state).unwrap_or_else(|e| {
        b.fault("vDiskTotal", e);
        (0, 0)
    });
    b.set("vDiskTotal", total);
    b.set("vDiskUsed", total.saturating_sub(free));
    b.set("vDiskFree", free);

    state.networks.refresh(true);
    let (rx, tx) = state
        .networks
        .iter()
        .fold((0u64, 0u64), |(rx, tx), (_, data)| {
            (
                rx.saturating_add(data.total_received()),
                tx.saturating_add(data.total_transmitted()),
            )
        });
    b.set("vNetworkBytesRecvd", rx);
    b.set("vNetworkBytesSent", tx);

    let mem = read_source(&proc_root.join("meminfo"))
        .and_then(|s| parse_meminfo(&s))
        .unwrap_or_else(|e| {
            b.fault("vMemoryTotal", e);
            Default::default()
        });
    b.set("vMemoryTotal", bytes_to_memory_unit(mem.total));
    b.set("vMemoryFree", bytes_to_memory_unit(mem.free));
    b.set("vMemoryBuffers", bytes_to_memory_unit(mem.buffers));
    b.set("vMemoryCached", bytes_to_memory_unit(mem.cached));

    b.set("vLoadAvg", System::load_average().one);

    state.sys.refresh_cpu_frequency();
    let mhz = state
        .sys
        .cpus()
        .first()
        .map(|c| c.frequency())
        .ok_or_else(|| ProbeError::unavailable("cpu frequency"));
    b.probe("vCpuMhz", mhz, 0);
    b
}

fn root_fs_usage(state: &mut HostState) -> ProbeResult<(u64, u64)> {
    state.disks.refresh(true);
    state
        .disks
        .list()
        .iter()
        .find(|d| d.mount_point() == Path::new("/"))
        .map(|d| (d.total_space(), d.available_space()))
        .ok_or_else(|| ProbeError::unavailable("filesystem mounted at /"))
}

/// Build one process entry from `<proc>/<pid>`. Any read failure means the
/// process went away (or is not ours to inspect).
pub fn process_record(proc_root: &Path, pid: u32, name: &str) -> ProbeResult<ProcessRecord> {
    let dir = proc_root.join(pid.to_string());
    let vanished = move |_: std::io::Error| ProbeError::Vanished { pid };
    let stat = parse_pid_stat(&fs::read_to_string(dir.join("stat")).map_err(vanished)?)?;
    let (voluntary_ctx, involuntary_ctx) =
        parse_ctx_switches(&fs::read_to_string(dir.join("status")).map_err(vanished)?)?;
    let cmdline = join_cmdline(&fs::read(dir.join("cmdline")).map_err(vanished)?);
    Ok(ProcessRecord {
        pid,
        cmdline,
        name: if name.is_empty() { stat.comm.clone() } else { name.to_string() },
        num_threads: stat.num_threads,
        cpu_user: ticks_to_centis(stat.utime),
        cpu_kernel: ticks_to_centis(stat.stime),
        children_user: ticks_to_centis(stat.cutime),
        children_kernel: ticks_to_centis(stat.cstime),
        voluntary_ctx,
        involuntary_ctx,
        block_io_delays: ticks_to_centis(stat.blkio_ticks),
        virtual_memory: stat.vsize,
    })
}

/// One record per live process, ordered by pid. Processes that disappear
/// between listing and inspection are skipped.
pub fn collect_processes(state: &mut HostState, proc_root: &Path) -> Vec<ProcessRecord> {
    let sys = &mut state.sys;
    sys.refresh_processes_specifics(ProcessesToUpdate::All, true, ProcessRefreshKind::nothing());

    let mut listed: Vec<(u32, String)> = sys
        .processes()
        .values()
        .map(|p| (p.pid().as_u32(), p.name().to_string_lossy().into_owned()))
        .collect();
    listed.sort_unstable_by_key(|(pid, _)| *pid);

    let mut skipped = 0usize;
    let records: Vec<ProcessRecord> = listed
        .iter()
        .filter_map(|(pid, name)| match process_record(proc_root, *pid, name) {
            Ok(r) => Some(r),
            Err(e) => {
                debug!("skipping process: {e}");
                skipped += 1;
                None
            }
        })
        .collect();
    if skipped > 0 {
        debug!(skipped, collected = records.len(), "process scan finished");
    }
    records
}
