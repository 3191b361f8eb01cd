//! Rasterize charts into text files.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use ratatui::{buffer::Buffer, layout::Rect};
use tracing::{debug, info};

use crate::plot::ChartSpec;
use crate::ui::chart::draw_chart;

pub const RASTER_EXT: &str = "txt";
pub const DEFAULT_WIDTH: u16 = 100;
pub const DEFAULT_HEIGHT: u16 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// One file per chart inside this directory.
    Directory(PathBuf),
    /// Every chart in a single file, separated by blank lines.
    File(PathBuf),
    /// Page through charts in the terminal.
    Interactive,
}

impl OutputTarget {
    pub fn from_arg(arg: Option<&str>) -> Self {
        let Some(arg) = arg else {
            return OutputTarget::Interactive;
        };
        if arg == "-" {
            return OutputTarget::Interactive;
        }
        let path = PathBuf::from(arg);
        if path.is_file() {
            return OutputTarget::File(path);
        }
        if path.is_dir() || arg.ends_with('/') || path.extension().is_none() {
            OutputTarget::Directory(path)
        } else {
            OutputTarget::File(path)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterSize {
    pub width: u16,
    pub height: u16,
}

impl Default for RasterSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

impl RasterSize {
    /// Defaults overridden by RUPROF_CHART_WIDTH / RUPROF_CHART_HEIGHT.
    pub fn from_env() -> Self {
        let env_dim = |key: &str, default: u16| {
            std::env::var(key)
                .ok()
                .and_then(|v| v.trim().parse::<u16>().ok())
                .filter(|&v| v >= 10)
                .unwrap_or(default)
        };
        Self {
            width: env_dim("RUPROF_CHART_WIDTH", DEFAULT_WIDTH),
            height: env_dim("RUPROF_CHART_HEIGHT", DEFAULT_HEIGHT),
        }
    }
}

/// Draw `spec` off-screen and return it as text, one line per row.
pub fn rasterize(spec: &ChartSpec, size: RasterSize) -> String {
    let area = Rect::new(0, 0, size.width, size.height);
    let mut buf = Buffer::empty(area);
    draw_chart(spec, area, &mut buf);

    let mut out = String::new();
    for row in buf.content.chunks(size.width as usize) {
        let line: String = row.iter().map(|c| c.symbol()).collect();
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Write every chart to `target`; returns the files written.
pub fn render_charts(
    charts: &[ChartSpec],
    target: &OutputTarget,
    size: RasterSize,
) -> anyhow::Result<Vec<PathBuf>> {
    match target {
        OutputTarget::Directory(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating output directory {}", dir.display()))?;
            let mut written = Vec::with_capacity(charts.len());
            for spec in charts {
                let path = unique_path(dir, &spec.file_stem, &written);
                fs::write(&path, rasterize(spec, size))
                    .with_context(|| format!("writing {}", path.display()))?;
                debug!(path = %path.display(), "chart written");
                written.push(path);
            }
            info!(count = written.len(), dir = %dir.display(), "charts written");
            Ok(written)
        }
        OutputTarget::File(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            let body = charts
                .iter()
                .map(|spec| rasterize(spec, size))
                .collect::<Vec<_>>()
                .join("\n");
            fs::write(path, body).with_context(|| format!("writing {}", path.display()))?;
            info!(count = charts.len(), path = %path.display(), "charts written");
            Ok(vec![path.clone()])
        }
        OutputTarget::Interactive => anyhow::bail!("interactive output has no files to write"),
    }
}

// Two metrics can sanitize to the same stem; keep both.
fn unique_path(dir: &Path, stem: &str, taken: &[PathBuf]) -> PathBuf {
    let mut path = dir.join(format!("{stem}.{RASTER_EXT}"));
    let mut n = 1;
    while taken.contains(&path) {
        path = dir.join(format!("{stem}_{n}.{RASTER_EXT}"));
        n += 1;
    }
    path
}
