//! Low-level source readers. Each returns a `ProbeResult` so the caller decides
//! the default; none of them log.

use crate::error::{ProbeError, ProbeResult};
use std::fs;
use std::path::Path;
use std::process::Command;

/// Read a whole pseudo-file. Missing, unreadable and empty files are all `Unavailable`.
pub fn read_source(path: &Path) -> ProbeResult<String> {
    match fs::read_to_string(path) {
        Ok(s) if !s.is_empty() => Ok(s),
        _ => Err(ProbeError::unavailable(path.display().to_string())),
    }
}

pub fn read_first_line(path: &Path) -> ProbeResult<String> {
    let s = read_source(path)?;
    Ok(s.lines().next().unwrap_or("").trim().to_string())
}

pub fn parse_u64(target: &str, raw: &str) -> ProbeResult<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|e| ProbeError::parse(target, format!("{raw:?}: {e}")))
}

/// Read a file holding a single integer.
pub fn read_u64(path: &Path) -> ProbeResult<u64> {
    let s = read_source(path)?;
    parse_u64(&path.display().to_string(), &s)
}

/// Look up `key value` in a whitespace separated key/value listing
/// (`memory.stat`, `/proc/vmstat`, `cpu.stat`, ...).
pub fn keyed_value(target: &str, text: &str, key: &str) -> ProbeResult<u64> {
    let raw = text
        .lines()
        .find_map(|l| {
            let mut it = l.split_whitespace();
            (it.next() == Some(key)).then(|| it.next()).flatten()
        })
        .ok_or_else(|| ProbeError::parse(target, format!("no `{key}` entry")))?;
    parse_u64(target, raw)
}

/// Run a command and capture stdout. No timeout: a wedged command stalls the tick.
pub fn run_command(program: &str, args: &[&str]) -> ProbeResult<String> {
    let command = std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ");
    let out = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| ProbeError::Command {
            command: command.clone(),
            detail: e.to_string(),
        })?;
    if !out.status.success() {
        return Err(ProbeError::Command {
            command,
            detail: format!("exit status {}", out.status),
        });
    }
    let text = String::from_utf8_lossy(&out.stdout).into_owned();
    if text.trim().is_empty() {
        return Err(ProbeError::unavailable(command));
    }
    Ok(text)
}
