//! Chart specifications: which series go on which chart, and the Y range
//! each chart asks for. Drawing lives in `ui`.

use crate::groups::MetricGroup;
use crate::table::SampleTable;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// One chart per metric, each scaled to its own range.
    Single,
    /// One chart per group, scaled to the union of its metrics' ranges.
    Multi,
}

impl RenderMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "single" => Some(RenderMode::Single),
            "multi" => Some(RenderMode::Multi),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum YBounds {
    /// Exact `[min, max]`, only ever requested with `min < max`.
    Fixed { min: f64, max: f64 },
    /// Let the drawer pick a range around the data.
    Auto,
}

impl YBounds {
    /// Never yields a zero-height or inverted range.
    pub fn from_range(min: f64, max: f64) -> Self {
        if min < max {
            YBounds::Fixed { min, max }
        } else {
            YBounds::Auto
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    /// Output file name without extension.
    pub file_stem: String,
    pub unit: String,
    pub x_max: f64,
    pub y: YBounds,
    pub legend: bool,
    pub series: Vec<Series>,
}

impl ChartSpec {
    /// Concrete Y bounds for drawing. Auto ranges are padded around the data.
    pub fn y_range(&self) -> [f64; 2] {
        match self.y {
            YBounds::Fixed { min, max } => [min, max],
            YBounds::Auto => {
                let (lo, hi) = self
                    .series
                    .iter()
                    .flat_map(|s| s.points.iter().map(|p| p.1))
                    .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                        (lo.min(v), hi.max(v))
                    });
                if !lo.is_finite() || !hi.is_finite() {
                    return [0.0, 1.0];
                }
                let mid = (lo + hi) / 2.0;
                let half = ((hi - lo) / 2.0).max(mid.abs() * 0.05).max(1.0);
                [mid - half, mid + half]
            }
        }
    }
}

/// Min and max over finite values.
pub fn finite_range(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

fn series_for(table: &SampleTable, metric: &str) -> Option<(Series, (f64, f64))> {
    if table.column(metric).is_none() {
        warn!("Could not find the metric \"{metric}\"");
        return None;
    }
    // textual columns are not plotted
    let values = table.numeric(metric)?;
    let Some(range) = finite_range(values) else {
        warn!("metric \"{metric}\" has no numeric samples");
        return None;
    };
    let points = table
        .time_steps()
        .zip(values.iter().copied())
        .filter(|(_, v)| v.is_finite())
        .collect();
    Some((
        Series {
            name: metric.to_string(),
            points,
        },
        range,
    ))
}

fn x_max(table: &SampleTable) -> f64 {
    (table.rows().saturating_sub(1) as f64).max(1.0)
}

/// Replace anything that is awkward in a file name.
pub fn sanitize_stem(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// One chart per metric of `group`.
pub fn single_charts(table: &SampleTable, group: &MetricGroup) -> Vec<ChartSpec> {
    group
        .metrics
        .iter()
        .filter_map(|metric| {
            let (series, (min, max)) = series_for(table, metric)?;
            let stem = sanitize_stem(metric);
            Some(ChartSpec {
                title: metric.clone(),
                file_stem: if stem.is_empty() { "metric".into() } else { stem },
                unit: group.unit.clone(),
                x_max: x_max(table),
                y: YBounds::from_range(min, max),
                legend: false,
                series: vec![series],
            })
        })
        .collect()
}

/// One chart for the whole group; `None` if none of its metrics can be plotted.
pub fn multi_chart(table: &SampleTable, group: &MetricGroup, index: usize) -> Option<ChartSpec> {
    let mut series = Vec::new();
    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for metric in &group.metrics {
        if let Some((s, (min, max))) = series_for(table, metric) {
            lo = lo.min(min);
            hi = hi.max(max);
            series.push(s);
        }
    }
    if series.is_empty() {
        warn!("group \"{}\" has nothing to plot", group.name);
        return None;
    }
    let stem = match sanitize_stem(&group.name) {
        s if s.is_empty() => format!("profiler_{index}"),
        s => s,
    };
    Some(ChartSpec {
        title: if group.name.trim().is_empty() {
            stem.clone()
        } else {
            group.name.clone()
        },
        file_stem: stem,
        unit: group.unit.clone(),
        x_max: x_max(table),
        y: YBounds::from_range(lo, hi),
        legend: true,
        series,
    })
}

/// Every chart for `groups` in config order.
pub fn build_charts(
    table: &SampleTable,
    groups: &[MetricGroup],
    mode: RenderMode,
) -> Vec<ChartSpec> {
    match mode {
        RenderMode::Single => groups.iter().flat_map(|g| single_charts(table, g)).collect(),
        RenderMode::Multi => groups
            .iter()
            .enumerate()
            .filter_map(|(i, g)| multi_chart(table, g, i))
            .collect(),
    }
}
