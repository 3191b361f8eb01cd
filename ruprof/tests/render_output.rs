//! Text raster output: file naming, single-file targets, drawn content.
use ruprof::plot::single_charts;
use ruprof::render::{rasterize, RASTER_EXT};
use ruprof::{
    build_charts, render_charts, MetricGroup, OutputTarget, RasterSize, RenderMode, SampleTable,
};
use std::fs;

fn table() -> SampleTable {
    SampleTable::from_csv_reader("vCpuTime,vMemoryUsed\n1,100\n5,200\n3,150\n".as_bytes()).unwrap()
}

fn groups() -> Vec<MetricGroup> {
    let mut cpu = MetricGroup::new("CPU", "%");
    cpu.metrics = vec!["vCpuTime".into()];
    let mut mem = MetricGroup::new("Memory", "KB");
    mem.metrics = vec!["vMemoryUsed".into()];
    vec![cpu, mem]
}

const SIZE: RasterSize = RasterSize {
    width: 60,
    height: 20,
};

#[test]
fn raster_has_title_axis_and_unit() {
    let spec = &single_charts(&table(), &groups()[0])[0];
    let text = rasterize(spec, SIZE);
    assert_eq!(text.lines().count(), 20);
    assert!(text.lines().all(|l| l.chars().count() <= 60));
    assert!(text.contains("vCpuTime"));
    assert!(text.contains("Time Steps"));
    assert!(text.contains('%'));
}

#[test]
fn single_mode_writes_one_file_per_metric() {
    let out = tempfile::tempdir().unwrap();
    let charts = build_charts(&table(), &groups(), RenderMode::Single);
    let written =
        render_charts(&charts, &OutputTarget::Directory(out.path().to_path_buf()), SIZE).unwrap();
    assert_eq!(
        written,
        vec![
            out.path().join(format!("vCpuTime.{RASTER_EXT}")),
            out.path().join(format!("vMemoryUsed.{RASTER_EXT}")),
        ]
    );
    assert!(fs::read_to_string(&written[1]).unwrap().contains("KB"));
}

#[test]
fn multi_mode_names_files_after_groups() {
    let out = tempfile::tempdir().unwrap();
    let target = OutputTarget::Directory(out.path().join("nested"));
    let charts = build_charts(&table(), &groups(), RenderMode::Multi);
    let written = render_charts(&charts, &target, SIZE).unwrap();
    let names: Vec<String> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["CPU.txt", "Memory.txt"]);
}

#[test]
fn file_target_concatenates_charts() {
    let out = tempfile::tempdir().unwrap();
    let path = out.path().join("all.txt");
    let charts = build_charts(&table(), &groups(), RenderMode::Multi);
    let written = render_charts(&charts, &OutputTarget::File(path.clone()), SIZE).unwrap();
    assert_eq!(written, vec![path.clone()]);
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("CPU") && text.contains("Memory"));
    assert_eq!(text.lines().count(), 2 * 20 + 1);
}

#[test]
fn output_target_from_argument() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(OutputTarget::from_arg(None), OutputTarget::Interactive);
    assert_eq!(OutputTarget::from_arg(Some("-")), OutputTarget::Interactive);
    let existing = dir.path().to_string_lossy().into_owned();
    assert!(matches!(OutputTarget::from_arg(Some(existing.as_str())), OutputTarget::Directory(_)));
    assert!(matches!(OutputTarget::from_arg(Some("charts/")), OutputTarget::Directory(_)));
    assert!(matches!(OutputTarget::from_arg(Some("charts")), OutputTarget::Directory(_)));
    assert!(matches!(OutputTarget::from_arg(Some("charts.txt")), OutputTarget::File(_)));

    let plain = dir.path().join("plainfile");
    fs::write(&plain, "").unwrap();
    assert!(matches!(
        OutputTarget::from_arg(Some(&*plain.to_string_lossy())),
        OutputTarget::File(_)
    ));
}
