//! Argument parsing for the `sampler` binary.

use crate::config::{CgroupVersion, Levels, SamplerConfig};
use std::path::PathBuf;

pub const USAGE: &str = "Usage: sampler <output_dir> [tick_interval_ms=0] [--vm|-v] [--container|-c] [--process|-p] \
[--pid-file PATH] [--cgroup-dir PATH] [--cgroup-version v1|v2|auto] [--iface NAME]";

#[derive(Debug)]
pub enum Cli {
    Run(SamplerConfig),
    Help,
}

pub fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Cli, String> {
    let mut it = args.into_iter();
    let _prog = it.next();
    let mut output_dir: Option<String> = None;
    let mut interval: Option<u64> = None;
    let (mut vm, mut container, mut process) = (false, false, false);
    let mut pid_file: Option<String> = None;
    let mut cgroup_dir: Option<String> = None;
    let mut cgroup_version: Option<CgroupVersion> = None;
    let mut iface: Option<String> = None;

    fn value(it: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, String> {
        it.next()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| format!("{flag} needs a value. {USAGE}"))
    }

    while let Some(arg) = it.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Cli::Help),
            "-v" | "--vm" => vm = true,
            "-c" | "--container" => container = true,
            "-p" | "--process" => process = true,
            "--pid-file" => pid_file = Some(value(&mut it, "--pid-file")?),
            "--cgroup-dir" => cgroup_dir = Some(value(&mut it, "--cgroup-dir")?),
            "--iface" => iface = Some(value(&mut it, "--iface")?),
            "--cgroup-version" => {
                let v = value(&mut it, "--cgroup-version")?;
                cgroup_version = Some(
                    CgroupVersion::parse(&v)
                        .ok_or_else(|| format!("unknown cgroup version {v:?}. {USAGE}"))?,
                );
            }
            _ if arg.starts_with('-') => return Err(format!("Unknown flag {arg}. {USAGE}")),
            _ if output_dir.is_none() => output_dir = Some(arg),
            _ if interval.is_none() => {
                interval = Some(
                    arg.parse::<u64>()
                        .map_err(|_| format!("tick interval must be milliseconds, got {arg:?}"))?,
                );
            }
            _ => return Err(format!("Unexpected argument {arg:?}. {USAGE}")),
        }
    }

    let output_dir = output_dir.ok_or_else(|| USAGE.to_string())?;
    let mut cfg = SamplerConfig::new(PathBuf::from(output_dir));
    cfg.interval_ms = interval.unwrap_or(0);
    cfg.levels = Levels::from_flags(vm, container, process);
    if let Some(p) = pid_file {
        cfg.pid_file = PathBuf::from(p);
    }
    if let Some(d) = cgroup_dir {
        cfg.paths.cgroup_root = PathBuf::from(d);
    }
    if let Some(v) = cgroup_version {
        cfg.cgroup_version = v;
    }
    if let Some(i) = iface {
        cfg.net_iface = i;
    }
    Ok(Cli::Run(cfg))
}
