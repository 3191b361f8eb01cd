//! Block-device classification. Only devices typed `disk` count towards disk
//! and container I/O attribution; loop, ram and partition devices do not.

use crate::error::{ProbeError, ProbeResult};
use crate::probe::{read_first_line, run_command};
use std::fs;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDevice {
    pub name: String,
    /// `major:minor`, as printed by lsblk and the cgroup blkio files.
    pub maj_min: String,
}

/// Parse `lsblk -l -n -o NAME,MAJ:MIN,TYPE` output, keeping `disk` rows.
pub fn parse_lsblk(text: &str) -> Vec<BlockDevice> {
    text.lines()
        .filter_map(|l| {
            let f: Vec<&str> = l.split_whitespace().collect();
            match f.as_slice() {
                [name, maj_min, "disk", ..] => Some(BlockDevice {
                    name: name.to_string(),
                    maj_min: maj_min.to_string(),
                }),
                _ => None,
            }
        })
        .collect()
}

/// Enumerate whole disks via lsblk, falling back to `<sys>/block` when lsblk
/// is missing.
pub fn detect_disks(sys_root: &Path) -> ProbeResult<Vec<BlockDevice>> {
    match run_command("lsblk", &["-a", "-l", "-n", "-o", "NAME,MAJ:MIN,TYPE"]) {
        Ok(out) => Ok(parse_lsblk(&out)),
        Err(e) => {
            debug!("lsblk failed ({e}); scanning sysfs instead");
            sysfs_disks(sys_root).map_err(|_| e)
        }
    }
}

fn is_pseudo_device(name: &str) -> bool {
    ["loop", "ram", "zram", "nbd", "sr"]
        .iter()
        .any(|p| name.starts_with(p))
}

// device-mapper and md raid volumes sit on top of real disks
fn is_virtual_volume(dev_dir: &Path) -> bool {
    dev_dir.join("dm").is_dir() || dev_dir.join("md").is_dir()
}

/// `<sys>/block` lists whole devices only; partitions live one level down.
/// Optical drives and stacked volumes (dm, md) are not disks.
pub fn sysfs_disks(sys_root: &Path) -> ProbeResult<Vec<BlockDevice>> {
    let dir = sys_root.join("block");
    let entries =
        fs::read_dir(&dir).map_err(|_| ProbeError::unavailable(dir.display().to_string()))?;
    let mut out: Vec<BlockDevice> = entries
        .filter_map(Result::ok)
        .filter_map(|e| {
            let name = e.file_name().to_string_lossy().into_owned();
            if is_pseudo_device(&name) || is_virtual_volume(&e.path()) {
                return None;
            }
            let maj_min = read_first_line(&e.path().join("dev")).ok()?;
            Some(BlockDevice { name, maj_min })
        })
        .collect();
    out.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(out)
}

pub fn is_disk(disks: &[BlockDevice], maj_min: &str) -> bool {
    disks.iter().any(|d| d.maj_min == maj_min)
}
