//! Chart building: per-metric and per-group axis ranges.
use ruprof::plot::{multi_chart, sanitize_stem, single_charts};
use ruprof::{build_charts, MetricGroup, RenderMode, SampleTable, YBounds};

fn table() -> SampleTable {
    let csv = "flat,rise,mixed,label\n42,1,-5,a\n42,2,,b\n42,3,10,c\n";
    SampleTable::from_csv_reader(csv.as_bytes()).unwrap()
}

fn group(name: &str, metrics: &[&str]) -> MetricGroup {
    let mut g = MetricGroup::new(name, "units");
    g.metrics = metrics.iter().map(|m| m.to_string()).collect();
    g
}

#[test]
fn constant_series_is_auto_scaled_without_zero_height() {
    let charts = single_charts(&table(), &group("G", &["flat"]));
    assert_eq!(charts.len(), 1);
    let c = &charts[0];
    assert_eq!(c.y, YBounds::Auto);
    let [lo, hi] = c.y_range();
    assert!(lo < 42.0 && 42.0 < hi, "range [{lo}, {hi}]");
    assert!(hi - lo >= 2.0);
}

#[test]
fn large_constant_uses_five_percent_padding() {
    let t = SampleTable::from_csv_reader("big\n1000\n1000\n".as_bytes()).unwrap();
    let c = &single_charts(&t, &group("G", &["big"]))[0];
    assert_eq!(c.y_range(), [950.0, 1050.0]);
}

#[test]
fn single_mode_scales_each_metric_to_itself() {
    let charts = single_charts(&table(), &group("G", &["rise", "mixed"]));
    assert_eq!(charts.len(), 2);
    assert_eq!(charts[0].title, "rise");
    assert_eq!(charts[0].file_stem, "rise");
    assert_eq!(charts[0].y, YBounds::Fixed { min: 1.0, max: 3.0 });
    assert_eq!(charts[1].y, YBounds::Fixed { min: -5.0, max: 10.0 });
    assert!(!charts[0].legend);
    assert_eq!(charts[0].unit, "units");
    assert_eq!(charts[0].x_max, 2.0);
    // gaps are dropped, not plotted as zero
    assert_eq!(charts[1].series[0].points, vec![(0.0, -5.0), (2.0, 10.0)]);
}

#[test]
fn text_and_missing_metrics_are_excluded() {
    let charts = single_charts(&table(), &group("G", &["label", "nope", "rise"]));
    let titles: Vec<&str> = charts.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, ["rise"]);
}

#[test]
fn multi_mode_uses_union_range() {
    let c = multi_chart(&table(), &group("Mixed bag", &["rise", "mixed", "nope"]), 3).unwrap();
    assert_eq!(c.y, YBounds::Fixed { min: -5.0, max: 10.0 });
    assert_eq!(c.series.len(), 2);
    assert!(c.legend);
    assert_eq!(c.file_stem, "Mixed_bag");
}

#[test]
fn multi_mode_degenerate_union_is_auto() {
    let c = multi_chart(&table(), &group("Flat", &["flat"]), 0).unwrap();
    assert_eq!(c.y, YBounds::Auto);
}

#[test]
fn multi_mode_skips_groups_with_nothing_to_plot() {
    assert!(multi_chart(&table(), &group("Empty", &["label"]), 0).is_none());
}

#[test]
fn unnameable_group_falls_back_to_index() {
    let c = multi_chart(&table(), &group("", &["rise"]), 7).unwrap();
    assert_eq!(c.file_stem, "profiler_7");
    assert_eq!(sanitize_stem("CPU %/core"), "CPU___core");
}

#[test]
fn build_charts_follows_config_order() {
    let groups = vec![group("B", &["rise"]), group("A", &["flat", "mixed"])];
    let multi = build_charts(&table(), &groups, RenderMode::Multi);
    let titles: Vec<&str> = multi.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, ["B", "A"]);
    let single = build_charts(&table(), &groups, RenderMode::Single);
    let titles: Vec<&str> = single.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, ["rise", "flat", "mixed"]);
}
