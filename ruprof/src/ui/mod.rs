//! UI module root: exposes drawing functions for the chart viewer.

pub mod chart;
pub mod header;
pub mod theme;
pub mod util;
