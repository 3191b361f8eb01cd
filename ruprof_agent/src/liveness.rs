//! The loop's only stop signal: a pid file written by whoever started the run.

use std::fs;
use std::io;
use std::path::Path;

/// Alive while the pid file exists, names a pid, and that pid has a procfs entry.
pub fn is_alive(pid_file: &Path, proc_root: &Path) -> bool {
    let Ok(raw) = fs::read_to_string(pid_file) else {
        return false;
    };
    match raw.trim().parse::<u32>() {
        Ok(pid) => proc_root.join(pid.to_string()).exists(),
        Err(_) => false,
    }
}

/// Remove the pid file; a file that is already gone is fine.
pub fn release(pid_file: &Path) -> io::Result<()> {
    match fs::remove_file(pid_file) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
