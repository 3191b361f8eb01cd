//! Parsers for `/proc` text formats. Pure functions over file contents so the
//! collectors can be exercised against fixtures.

use crate::error::{ProbeError, ProbeResult};
use crate::probe::parse_u64;

/// Host-wide CPU time breakdown from the aggregate `cpu` line of `/proc/stat`, in ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CpuTimes {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
}

pub fn parse_cpu_times(stat: &str) -> ProbeResult<CpuTimes> {
    // "cpu  user nice system idle iowait irq softirq steal guest guest_nice"
    let line = stat
        .lines()
        .find(|l| l.split_whitespace().next() == Some("cpu"))
        .ok_or_else(|| ProbeError::parse("/proc/stat", "no aggregate cpu line"))?;
    let vals: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .map(|t| parse_u64("/proc/stat", t))
        .collect::<ProbeResult<_>>()?;
    if vals.len() < 4 {
        return Err(ProbeError::parse(
            "/proc/stat",
            format!("cpu line has {} columns", vals.len()),
        ));
    }
    let at = |i: usize| vals.get(i).copied().unwrap_or(0);
    Ok(CpuTimes {
        user: at(0),
        nice: at(1),
        system: at(2),
        idle: at(3),
        iowait: at(4),
        irq: at(5),
        softirq: at(6),
        steal: at(7),
    })
}

/// Memory totals from `/proc/meminfo`, in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MemInfo {
    pub total: u64,
    pub free: u64,
    pub buffers: u64,
    pub cached: u64,
}

pub fn parse_meminfo(text: &str) -> ProbeResult<MemInfo> {
    let kb = |key: &str| -> Option<u64> {
        text.lines().find_map(|l| {
            let (k, rest) = l.split_once(':')?;
            if k.trim() != key {
                return None;
            }
            rest.split_whitespace().next()?.parse::<u64>().ok()
        })
    };
    let total = kb("MemTotal").ok_or_else(|| ProbeError::parse("/proc/meminfo", "no MemTotal"))?;
    Ok(MemInfo {
        total: total * 1024,
        free: kb("MemFree").unwrap_or(0) * 1024,
        buffers: kb("Buffers").unwrap_or(0) * 1024,
        // page cache as reported by free(1): Cached + SReclaimable
        cached: (kb("Cached").unwrap_or(0) + kb("SReclaimable").unwrap_or(0)) * 1024,
    })
}

/// One row of `/proc/diskstats`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiskStat {
    pub major: u32,
    pub minor: u32,
    pub name: String,
    pub reads: u64,
    pub reads_merged: u64,
    pub sectors_read: u64,
    pub read_ms: u64,
    pub writes: u64,
    pub writes_merged: u64,
    pub sectors_written: u64,
    pub write_ms: u64,
}

/// Malformed rows are dropped rather than failing the whole table.
pub fn parse_diskstats(text: &str) -> Vec<DiskStat> {
    text.lines()
        .filter_map(|l| {
            let f: Vec<&str> = l.split_whitespace().collect();
            if f.len() < 11 {
                return None;
            }
            let n = |i: usize| f[i].parse::<u64>().ok();
            Some(DiskStat {
                major: f[0].parse().ok()?,
                minor: f[1].parse().ok()?,
                name: f[2].to_string(),
                reads: n(3)?,
                reads_merged: n(4)?,
                sectors_read: n(5)?,
                read_ms: n(6)?,
                writes: n(7)?,
                writes_merged: n(8)?,
                sectors_written: n(9)?,
                write_ms: n(10)?,
            })
        })
        .collect()
}

/// Received/sent byte totals for one interface in `/proc/net/dev`.
pub fn parse_net_dev(text: &str, iface: &str) -> ProbeResult<(u64, u64)> {
    let target = "/proc/net/dev";
    let rest = text
        .lines()
        .find_map(|l| {
            let (name, rest) = l.split_once(':')?;
            (name.trim() == iface).then_some(rest)
        })
        .ok_or_else(|| ProbeError::unavailable(format!("{target} interface {iface}")))?;
    let f: Vec<&str> = rest.split_whitespace().collect();
    if f.len() < 9 {
        return Err(ProbeError::parse(target, format!("{iface} has {} columns", f.len())));
    }
    Ok((parse_u64(target, f[0])?, parse_u64(target, f[8])?))
}

/// First `model name` entry of `/proc/cpuinfo`.
pub fn parse_cpu_model(text: &str) -> ProbeResult<String> {
    text.lines()
        .find_map(|l| {
            let (k, v) = l.split_once(':')?;
            (k.trim() == "model name").then(|| v.trim().to_string())
        })
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ProbeError::parse("/proc/cpuinfo", "no model name"))
}

/// Fields of `/proc/<pid>/stat` the process collector reports.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PidStat {
    pub comm: String,
    pub utime: u64,
    pub stime: u64,
    pub cutime: u64,
    pub cstime: u64,
    pub num_threads: u64,
    pub vsize: u64,
    pub blkio_ticks: u64,
}

pub fn parse_pid_stat(text: &str) -> ProbeResult<PidStat> {
    let target = "/proc/<pid>/stat";
    // comm may itself contain spaces and parentheses; it ends at the last ')'
    let lpar = text.find('(').ok_or_else(|| ProbeError::parse(target, "no comm"))?;
    let rpar = text.rfind(')').ok_or_else(|| ProbeError::parse(target, "no comm"))?;
    if rpar < lpar {
        return Err(ProbeError::parse(target, "unbalanced comm"));
    }
    let comm = text[lpar + 1..rpar].to_string();
    // index 0 is field 3 (state) in proc(5) numbering
    let f: Vec<&str> = text[rpar + 1..].split_whitespace().collect();
    if f.len() < 21 {
        return Err(ProbeError::parse(target, format!("{} fields after comm", f.len())));
    }
    let n = |i: usize| parse_u64(target, f[i]);
    Ok(PidStat {
        comm,
        utime: n(11)?,
        stime: n(12)?,
        // children times are signed in the kernel but never negative in practice
        cutime: f[13].parse::<i64>().map(|v| v.max(0) as u64).unwrap_or(0),
        cstime: f[14].parse::<i64>().map(|v| v.max(0) as u64).unwrap_or(0),
        num_threads: n(17)?,
        vsize: n(20)?,
        blkio_ticks: f.get(39).and_then(|v| v.parse().ok()).unwrap_or(0),
    })
}

/// Voluntary and involuntary context switches from `/proc/<pid>/status`.
pub fn parse_ctx_switches(text: &str) -> ProbeResult<(u64, u64)> {
    let target = "/proc/<pid>/status";
    let find = |key: &str| -> ProbeResult<u64> {
        let raw = text
            .lines()
            .find_map(|l| {
                let (k, v) = l.split_once(':')?;
                (k.trim() == key).then_some(v)
            })
            .ok_or_else(|| ProbeError::parse(target, format!("no {key}")))?;
        parse_u64(target, raw)
    };
    Ok((find("voluntary_ctxt_switches")?, find("nonvoluntary_ctxt_switches")?))
}

/// `/proc/<pid>/cmdline` is NUL separated; join it the way `ps` shows it.
pub fn join_cmdline(raw: &[u8]) -> String {
    raw.split(|b| *b == 0)
        .filter(|s| !s.is_empty())
        .map(|s| String::from_utf8_lossy(s).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}
