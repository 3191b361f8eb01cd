//! Container-level metrics from the cgroup pseudo-filesystem (v1 controller
//! directories or the v2 unified hierarchy).

use crate::blockdev::{is_disk, BlockDevice};
use crate::config::{CgroupVersion, SourcePaths};
use crate::error::{ProbeError, ProbeResult};
use crate::probe::{keyed_value, parse_u64, read_source, read_u64};
use crate::procfs::parse_net_dev;
use crate::record::{now_secs, SampleBuilder};
use crate::units::{ticks_to_centis, usec_to_centis, SECTOR_BYTES};
use std::path::Path;

/// Per-core cpuacct usage, in nanoseconds.
pub fn parse_percpu(target: &str, text: &str) -> ProbeResult<Vec<u64>> {
    text.split_whitespace().map(|t| parse_u64(target, t)).collect()
}

/// Sum of `blkio.sectors` ("8:0 53966" per line) over every device.
pub fn parse_v1_sectors(target: &str, text: &str) -> ProbeResult<u64> {
    text.lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| {
            let mut it = l.split_whitespace();
            match (it.next(), it.next()) {
                (Some(_), Some(v)) => parse_u64(target, v),
                _ => Err(ProbeError::parse(target, format!("short line {l:?}"))),
            }
        })
        .sum()
}

/// Read/Write byte totals from `blkio.throttle.io_service_bytes`, restricted to `disks`.
pub fn parse_v1_service_bytes(
    target: &str,
    text: &str,
    disks: &[BlockDevice],
) -> ProbeResult<(u64, u64)> {
    let (mut read, mut write) = (0u64, 0u64);
    for l in text.lines() {
        let f: Vec<&str> = l.split_whitespace().collect();
        let [dev, op, val] = f.as_slice() else {
            continue; // the trailing "Total N" line has two columns
        };
        if !is_disk(disks, dev) {
            continue;
        }
        match *op {
            "Read" => read = read.saturating_add(parse_u64(target, val)?),
            "Write" => write = write.saturating_add(parse_u64(target, val)?),
            _ => {}
        }
    }
    Ok((read, write))
}

/// One device row of v2 `io.stat`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IoStatRow {
    pub maj_min: String,
    pub rbytes: u64,
    pub wbytes: u64,
}

pub fn parse_io_stat(target: &str, text: &str) -> ProbeResult<Vec<IoStatRow>> {
    text.lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| {
            let mut it = l.split_whitespace();
            let mut row = IoStatRow {
                maj_min: it.next().unwrap_or_default().to_string(),
                ..Default::default()
            };
            for kv in it {
                match kv.split_once('=') {
                    Some(("rbytes", v)) => row.rbytes = parse_u64(target, v)?,
                    Some(("wbytes", v)) => row.wbytes = parse_u64(target, v)?,
                    Some(_) => {}
                    None => return Err(ProbeError::parse(target, format!("bad pair {kv:?}"))),
                }
            }
            Ok(row)
        })
        .collect()
}

fn path_str(p: &Path) -> String {
    p.display().to_string()
}

fn stat_value(path: &Path, key: &str) -> ProbeResult<u64> {
    let text = read_source(path)?;
    keyed_value(&path_str(path), &text, key)
}

fn count_lines(path: &Path) -> ProbeResult<u64> {
    let text = read_source(path)?;
    Ok(text.lines().filter(|l| !l.trim().is_empty()).count() as u64)
}

/// Collect container-level metrics. Every field has a zero default; an absent
/// cgroup hierarchy yields a fully defaulted sample.
pub fn collect_container(
    paths: &SourcePaths,
    version: CgroupVersion,
    iface: &str,
    disks: &[BlockDevice],
) -> SampleBuilder {
    let root = paths.cgroup_root.as_path();
    let mut b = SampleBuilder::new();
    b.set("cMetricType", "Container level");
    match version.resolve(root) {
        CgroupVersion::V2 => collect_v2(&mut b, root, disks),
        _ => collect_v1(&mut b, root, disks),
    }

    let net = read_source(&paths.proc_root.join("net/dev"))
        .and_then(|text| parse_net_dev(&text, iface));
    let (rx, tx) = match net {
        Ok(v) => v,
        Err(e) => {
            b.fault("cNetworkBytes", e);
            (0, 0)
        }
    };
    b.set("cNetworkBytesRecvd", rx);
    b.set("cNetworkBytesSent", tx);
    b
}

fn record_percpu(b: &mut SampleBuilder, res: ProbeResult<Vec<u64>>) {
    let per_core = match res {
        Ok(v) if !v.is_empty() => v,
        Ok(_) => vec![0],
        Err(e) => {
            b.fault("cProcessorStats", e);
            vec![0]
        }
    };
    for (i, ns) in per_core.into_iter().enumerate() {
        b.set(format!("cCpu{i}TIME"), ns);
        b.set(format!("tcCpu{i}TIME"), now_secs());
    }
}

fn collect_v1(b: &mut SampleBuilder, root: &Path, disks: &[BlockDevice]) {
    let cpuacct = root.join("cpuacct");
    b.timed("cCpuTime", read_u64(&cpuacct.join("cpuacct.usage")), 0);

    let path = cpuacct.join("cpuacct.usage_percpu");
    record_percpu(
        b,
        read_source(&path).and_then(|t| parse_percpu(&path_str(&path), &t)),
    );

    let stat = cpuacct.join("cpuacct.stat");
    b.timed(
        "cCpuTimeUserMode",
        stat_value(&stat, "user").map(ticks_to_centis),
        0.0,
    );
    b.timed(
        "cCpuTimeKernelMode",
        stat_value(&stat, "system").map(ticks_to_centis),
        0.0,
    );

    let mem_stat = root.join("memory/memory.stat");
    b.probe("cPGFault", stat_value(&mem_stat, "pgfault"), 0);
    b.probe("cMajorPGFault", stat_value(&mem_stat, "pgmajfault"), 0);

    let sectors = root.join("blkio/blkio.sectors");
    b.probe(
        "cDiskSectorIO",
        read_source(&sectors).and_then(|t| parse_v1_sectors(&path_str(&sectors), &t)),
        0,
    );

    let svc = root.join("blkio/blkio.throttle.io_service_bytes");
    let (read, write) = match read_source(&svc)
        .and_then(|t| parse_v1_service_bytes(&path_str(&svc), &t, disks))
    {
        Ok(v) => v,
        Err(e) => {
            b.fault("cDiskBytes", e);
            (0, 0)
        }
    };
    b.set("cDiskReadBytes", read);
    b.set("cDiskWriteBytes", write);

    b.probe("cMemoryUsed", read_u64(&root.join("memory/memory.usage_in_bytes")), 0);
    b.probe(
        "cMemoryMaxUsed",
        read_u64(&root.join("memory/memory.max_usage_in_bytes")),
        0,
    );
    b.probe("cNumProcesses", count_lines(&root.join("pids/tasks")), 0);
}

fn collect_v2(b: &mut SampleBuilder, root: &Path, disks: &[BlockDevice]) {
    let cpu_stat = root.join("cpu.stat");
    b.timed(
        "cCpuTime",
        stat_value(&cpu_stat, "usage_usec").map(|us| us.saturating_mul(1000)),
        0,
    );
    // the unified hierarchy has no per-core accounting
    record_percpu(
        b,
        Err(ProbeError::unavailable(format!(
            "{} per-core usage",
            path_str(root)
        ))),
    );
    b.timed(
        "cCpuTimeUserMode",
        stat_value(&cpu_stat, "user_usec").map(usec_to_centis),
        0.0,
    );
    b.timed(
        "cCpuTimeKernelMode",
        stat_value(&cpu_stat, "system_usec").map(usec_to_centis),
        0.0,
    );

    let mem_stat = root.join("memory.stat");
    b.probe("cPGFault", stat_value(&mem_stat, "pgfault"), 0);
    b.probe("cMajorPGFault", stat_value(&mem_stat, "pgmajfault"), 0);

    let io = root.join("io.stat");
    match read_source(&io).and_then(|t| parse_io_stat(&path_str(&io), &t)) {
        Ok(rows) => {
            let all: u64 = rows.iter().map(|r| r.rbytes + r.wbytes).sum();
            let (read, write) = rows
                .iter()
                .filter(|r| is_disk(disks, &r.maj_min))
                .fold((0u64, 0u64), |(r, w), row| (r + row.rbytes, w + row.wbytes));
            b.set("cDiskSectorIO", all / SECTOR_BYTES);
            b.set("cDiskReadBytes", read);
            b.set("cDiskWriteBytes", write);
        }
        Err(e) => {
            b.fault("cDiskIO", e);
            b.set("cDiskSectorIO", 0);
            b.set("cDiskReadBytes", 0);
            b.set("cDiskWriteBytes", 0);
        }
    }

    b.probe("cMemoryUsed", read_u64(&root.join("memory.current")), 0);
    b.probe("cMemoryMaxUsed", read_u64(&root.join("memory.peak")), 0);
    b.probe("cNumProcesses", read_u64(&root.join("pids.current")), 0);
}
