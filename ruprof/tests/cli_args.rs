//! CLI tests for the chart binary
use assert_cmd::Command;
use ruprof::cli::{parse_args, ChartArgs, Cli};
use ruprof::{OutputTarget, RenderMode};
use std::fs;
use std::path::PathBuf;

fn parse(v: &[&str]) -> Result<Cli, String> {
    parse_args(std::iter::once("chart").chain(v.iter().copied()).map(String::from))
}

fn run_args(v: &[&str]) -> ChartArgs {
    match parse(v).unwrap() {
        Cli::Run(a) => a,
        Cli::Help => panic!("unexpected help"),
    }
}

#[test]
fn positional_forms() {
    let a = run_args(&["samples.csv"]);
    assert_eq!(a.samples, PathBuf::from("samples.csv"));
    assert_eq!(a.output, OutputTarget::Interactive);
    assert_eq!(a.mode, RenderMode::Multi);

    let a = run_args(&["samples.csv", "out/", "graph.cfg", "single"]);
    assert_eq!(a.output, OutputTarget::Directory(PathBuf::from("out/")));
    assert_eq!(a.group_config, Some(PathBuf::from("graph.cfg")));
    assert_eq!(a.mode, RenderMode::Single);

    // mode may directly follow the output
    let a = run_args(&["samples.csv", "-", "SINGLE"]);
    assert_eq!(a.output, OutputTarget::Interactive);
    assert_eq!(a.group_config, None);
    assert_eq!(a.mode, RenderMode::Single);
}

#[test]
fn bad_invocations() {
    assert!(parse(&[]).is_err());
    assert!(parse(&["a", "b", "c", "multi", "extra"]).is_err());
    assert!(parse(&["a", "--wat"]).is_err());
    assert_eq!(parse(&["-h"]), Ok(Cli::Help));
}

#[test]
fn end_to_end_directory_output() {
    let dir = tempfile::tempdir().unwrap();
    let samples = dir.path().join("samples.csv");
    fs::write(&samples, "vCpuTime,vMemoryUsed,vLoadAvg\n1,100,0.5\n2,100,0.7\n4,100,0.6\n").unwrap();
    let cfg = dir.path().join("graph.cfg");
    fs::write(&cfg, "### CPU,%\nvCpuTime\n#vLoadAvg\n### Memory,KB\nvMemoryUsed\n").unwrap();
    let out = dir.path().join("charts");

    Command::cargo_bin("chart")
        .unwrap()
        .args([&samples, &out, &cfg])
        .arg("single")
        .assert()
        .success();

    assert!(out.join("vCpuTime.txt").is_file());
    // constant series still renders
    assert!(out.join("vMemoryUsed.txt").is_file());
    assert!(!out.join("vLoadAvg.txt").exists());
}

#[test]
fn unreadable_samples_fail() {
    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("chart")
        .unwrap()
        .arg(dir.path().join("missing.csv"))
        .arg(dir.path().join("out"))
        .assert()
        .failure();
}

#[test]
fn usage_errors_exit_2() {
    Command::cargo_bin("chart").unwrap().assert().code(2);
    Command::cargo_bin("chart").unwrap().arg("--help").assert().success();
}
