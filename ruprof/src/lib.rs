//! ruprof: offline chart renderer for sampler output.
//!
//! Loads a table of samples (CSV or a sampler output directory), groups its
//! metrics according to a small line-oriented config, and draws one line
//! chart per metric or per group, either to text rasters or to the terminal.

pub mod app;
pub mod cli;
pub mod groups;
pub mod plot;
pub mod render;
pub mod table;
pub mod ui;

pub use groups::{parse_group_config, MetricGroup};
pub use plot::{build_charts, ChartSpec, RenderMode, YBounds};
pub use render::{render_charts, OutputTarget, RasterSize};
pub use table::SampleTable;
