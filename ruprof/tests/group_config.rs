//! Group config parsing and resolution.
use ruprof::groups::{fallback_groups, parse_group_config, resolve_groups, UNSPECIFIED_UNIT};
use ruprof::{build_charts, MetricGroup, RenderMode, SampleTable};
use std::fs;

fn group(name: &str, unit: &str, metrics: &[&str]) -> MetricGroup {
    let mut g = MetricGroup::new(name, unit);
    g.metrics = metrics.iter().map(|m| m.to_string()).collect();
    g
}

#[test]
fn two_groups_round_trip() {
    let groups = parse_group_config("### Memory,KB\nvMemoryUsed\n### CPU,%\nvCpuTime\n");
    assert_eq!(
        groups,
        vec![
            group("Memory", "KB", &["vMemoryUsed"]),
            group("CPU", "%", &["vCpuTime"]),
        ]
    );
}

#[test]
fn comments_and_excluded_metrics_keep_the_group_open() {
    let text = "\
# top level comment
### Disk,bytes
vDiskReadBytes
   #vDiskWriteBytes
# another comment

vDiskSectorReads
";
    let groups = parse_group_config(text);
    assert_eq!(groups, vec![group("Disk", "bytes", &["vDiskReadBytes", "vDiskSectorReads"])]);
}

#[test]
fn leading_metrics_and_unknown_group_are_dropped() {
    let text = "orphan\n### Unknown\nstray\n### Net\ncNetworkBytesSent\n";
    let groups = parse_group_config(text);
    assert_eq!(groups, vec![group("Net", UNSPECIFIED_UNIT, &["cNetworkBytesSent"])]);
}

#[test]
fn bare_header_opens_an_unnamed_group() {
    let groups = parse_group_config("###\nvCpuTime\n### Mem,KB\nvMemoryFree\n###  ,KB\nvLoadAvg\n");
    assert_eq!(
        groups,
        vec![
            group("", "KB", &["vLoadAvg"]),
            group("Mem", "KB", &["vMemoryFree"]),
        ]
    );
}

#[test]
fn unnamed_groups_chart_by_index() {
    let table =
        SampleTable::from_csv_reader("vCpuTime,vMemoryFree\n1,5\n2,6\n".as_bytes()).unwrap();
    let groups = parse_group_config("### Mem,KB\nvMemoryFree\n###\nvCpuTime\n");
    assert_eq!(groups[1], group("", UNSPECIFIED_UNIT, &["vCpuTime"]));

    let charts = build_charts(&table, &groups, RenderMode::Multi);
    let stems: Vec<&str> = charts.iter().map(|c| c.file_stem.as_str()).collect();
    assert_eq!(stems, ["Mem", "profiler_1"]);
    assert_eq!(charts[1].series[0].name, "vCpuTime");
}

#[test]
fn redeclared_group_replaces_in_place() {
    let text = "### A,x\na1\n### B,y\nb1\n### A,z\na2\n";
    let groups = parse_group_config(text);
    assert_eq!(groups, vec![group("A", "z", &["a2"]), group("B", "y", &["b1"])]);
}

#[test]
fn header_whitespace_is_trimmed() {
    let groups = parse_group_config("  ###  Load Avg , load \n  vLoadAvg  \n");
    assert_eq!(groups, vec![group("Load Avg", "load", &["vLoadAvg"])]);
}

#[test]
fn missing_config_falls_back_to_all_numeric_columns() {
    let table = SampleTable::from_csv_reader("a,b,label\n1,2,x\n3,4,y\n".as_bytes()).unwrap();
    let fallback = fallback_groups(&table);
    assert_eq!(fallback, vec![group("All", UNSPECIFIED_UNIT, &["a", "b"])]);

    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.cfg");
    let groups = resolve_groups(Some(missing.as_path()), &table);
    assert_eq!(groups, fallback);

    let cfg = dir.path().join("graph.cfg");
    fs::write(&cfg, "### Only B,u\nb\n").unwrap();
    assert_eq!(resolve_groups(Some(cfg.as_path()), &table), vec![group("Only B", "u", &["b"])]);
}
