//! Container-level collection against v1 and v2 cgroup fixture trees.
use ruprof_agent::blockdev::BlockDevice;
use ruprof_agent::cgroup::{
    collect_container, parse_io_stat, parse_percpu, parse_v1_sectors, parse_v1_service_bytes,
};
use ruprof_agent::{CgroupVersion, SourcePaths};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

fn write(root: &Path, rel: &str, body: &str) {
    let p = root.join(rel);
    fs::create_dir_all(p.parent().unwrap()).unwrap();
    fs::write(p, body).unwrap();
}

fn sda() -> Vec<BlockDevice> {
    vec![BlockDevice {
        name: "sda".into(),
        maj_min: "8:0".into(),
    }]
}

fn paths(cgroup: &Path, proc_root: &Path) -> SourcePaths {
    SourcePaths {
        proc_root: proc_root.to_path_buf(),
        sys_root: proc_root.join("sys"),
        cgroup_root: cgroup.to_path_buf(),
        hostname_file: proc_root.join("hostname"),
    }
}

const NET_DEV: &str = "Inter-| Receive | Transmit\n face |bytes packets errs drop fifo frame compressed multicast|bytes\n  eth0: 1000 10 0 0 0 0 0 0 2000 20 0 0 0 0 0 0\n";

#[test]
fn v1_hierarchy() {
    let cg = tempfile::tempdir().unwrap();
    let proc_dir = tempfile::tempdir().unwrap();
    let r = cg.path();
    write(r, "cpuacct/cpuacct.usage", "5000000000\n");
    write(r, "cpuacct/cpuacct.usage_percpu", "3000000000 2000000000 \n");
    write(r, "cpuacct/cpuacct.stat", "user 250\nsystem 50\n");
    write(r, "memory/memory.stat", "cache 1\npgfault 900\npgmajfault 4\n");
    write(r, "blkio/blkio.sectors", "8:0 100\n8:16 20\n");
    write(
        r,
        "blkio/blkio.throttle.io_service_bytes",
        "8:0 Read 4096\n8:0 Write 8192\n8:0 Total 12288\n8:16 Read 512\nTotal 12800\n",
    );
    write(r, "memory/memory.usage_in_bytes", "1048576\n");
    write(r, "memory/memory.max_usage_in_bytes", "2097152\n");
    write(r, "pids/tasks", "1\n7\n9\n");
    write(proc_dir.path(), "net/dev", NET_DEV);

    let b = collect_container(&paths(r, proc_dir.path()), CgroupVersion::Auto, "eth0", &sda());
    assert!(b.faults().is_empty(), "unexpected faults: {:?}", b.faults());
    assert_eq!(b.get("cMetricType"), Some(&json!("Container level")));
    assert_eq!(b.get("cCpuTime"), Some(&json!(5000000000u64)));
    assert!(b.get("tcCpuTime").and_then(Value::as_f64).is_some());
    assert_eq!(b.get("cCpu0TIME"), Some(&json!(3000000000u64)));
    assert_eq!(b.get("cCpu1TIME"), Some(&json!(2000000000u64)));
    assert!(b.get("tcCpu1TIME").is_some());
    assert!(b.get("cCpu2TIME").is_none());
    assert_eq!(b.get("cCpuTimeUserMode"), Some(&json!(250.0)));
    assert_eq!(b.get("cCpuTimeKernelMode"), Some(&json!(50.0)));
    assert_eq!(b.get("cPGFault"), Some(&json!(900)));
    assert_eq!(b.get("cMajorPGFault"), Some(&json!(4)));
    assert_eq!(b.get("cDiskSectorIO"), Some(&json!(120)));
    assert_eq!(b.get("cDiskReadBytes"), Some(&json!(4096)));
    assert_eq!(b.get("cDiskWriteBytes"), Some(&json!(8192)));
    assert_eq!(b.get("cMemoryUsed"), Some(&json!(1048576)));
    assert_eq!(b.get("cMemoryMaxUsed"), Some(&json!(2097152)));
    assert_eq!(b.get("cNumProcesses"), Some(&json!(3)));
    assert_eq!(b.get("cNetworkBytesRecvd"), Some(&json!(1000)));
    assert_eq!(b.get("cNetworkBytesSent"), Some(&json!(2000)));
}

#[test]
fn v2_unified_hierarchy() {
    let cg = tempfile::tempdir().unwrap();
    let proc_dir = tempfile::tempdir().unwrap();
    let r = cg.path();
    write(r, "cgroup.controllers", "cpu io memory pids\n");
    write(
        r,
        "cpu.stat",
        "usage_usec 2000000\nuser_usec 1500000\nsystem_usec 500000\n",
    );
    write(r, "memory.stat", "anon 1\npgfault 77\npgmajfault 2\n");
    write(
        r,
        "io.stat",
        "8:0 rbytes=1024 wbytes=2048 rios=1 wios=2 dbytes=0 dios=0\n7:0 rbytes=512 wbytes=0 rios=1 wios=0 dbytes=0 dios=0\n",
    );
    write(r, "memory.current", "4096\n");
    write(r, "memory.peak", "8192\n");
    write(r, "pids.current", "5\n");
    write(proc_dir.path(), "net/dev", NET_DEV);

    assert_eq!(CgroupVersion::Auto.resolve(r), CgroupVersion::V2);
    let b = collect_container(&paths(r, proc_dir.path()), CgroupVersion::Auto, "eth0", &sda());
    assert_eq!(b.get("cCpuTime"), Some(&json!(2000000000u64)));
    // no per-core accounting in v2
    assert_eq!(b.get("cCpu0TIME"), Some(&json!(0)));
    assert_eq!(b.get("cCpuTimeUserMode"), Some(&json!(150.0)));
    assert_eq!(b.get("cCpuTimeKernelMode"), Some(&json!(50.0)));
    assert_eq!(b.get("cPGFault"), Some(&json!(77)));
    assert_eq!(b.get("cDiskSectorIO"), Some(&json!((1024 + 2048 + 512) / 512)));
    assert_eq!(b.get("cDiskReadBytes"), Some(&json!(1024)));
    assert_eq!(b.get("cDiskWriteBytes"), Some(&json!(2048)));
    assert_eq!(b.get("cMemoryUsed"), Some(&json!(4096)));
    assert_eq!(b.get("cMemoryMaxUsed"), Some(&json!(8192)));
    assert_eq!(b.get("cNumProcesses"), Some(&json!(5)));
}

#[test]
fn absent_hierarchy_degrades_to_zeros() {
    let cg = tempfile::tempdir().unwrap();
    let proc_dir = tempfile::tempdir().unwrap();
    let missing = cg.path().join("not-mounted");

    let b = collect_container(&paths(&missing, proc_dir.path()), CgroupVersion::Auto, "eth0", &[]);
    for key in [
        "cCpuTime",
        "cCpu0TIME",
        "cPGFault",
        "cMajorPGFault",
        "cDiskSectorIO",
        "cDiskReadBytes",
        "cDiskWriteBytes",
        "cMemoryUsed",
        "cMemoryMaxUsed",
        "cNumProcesses",
        "cNetworkBytesRecvd",
        "cNetworkBytesSent",
    ] {
        let v = b.get(key).unwrap_or_else(|| panic!("{key} missing"));
        assert_eq!(v.as_f64(), Some(0.0), "{key} = {v}");
    }
    assert_eq!(b.get("cCpuTimeUserMode"), Some(&json!(0.0)));
    assert!(!b.faults().is_empty());
    // the record itself never carries error text
    assert!(b.get("error").is_none());
}

#[test]
fn explicit_version_overrides_detection() {
    let cg = tempfile::tempdir().unwrap();
    write(cg.path(), "cgroup.controllers", "cpu\n");
    assert_eq!(CgroupVersion::V1.resolve(cg.path()), CgroupVersion::V1);
    assert_eq!(CgroupVersion::Auto.resolve(&cg.path().join("x")), CgroupVersion::V1);
    assert_eq!(CgroupVersion::parse("V2"), Some(CgroupVersion::V2));
    assert_eq!(CgroupVersion::parse("v3"), None);
}

#[test]
fn raw_cgroup_parsers() {
    assert_eq!(parse_percpu("p", "1 2 3\n").unwrap(), vec![1, 2, 3]);
    assert!(parse_percpu("p", "1 x").is_err());
    assert_eq!(parse_v1_sectors("s", "8:0 10\n\n8:16 5\n").unwrap(), 15);
    assert!(parse_v1_sectors("s", "8:0\n").is_err());
    assert_eq!(
        parse_v1_service_bytes("b", "8:16 Read 99\nTotal 99\n", &sda()).unwrap(),
        (0, 0)
    );
    let rows = parse_io_stat("io", "259:0 rbytes=1 wbytes=2 rios=3\n").unwrap();
    assert_eq!(rows[0].maj_min, "259:0");
    assert_eq!((rows[0].rbytes, rows[0].wbytes), (1, 2));
    assert!(parse_io_stat("io", "8:0 garbage\n").is_err());
}
