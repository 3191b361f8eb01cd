//! Top header with the chart position and key help.

use ratatui::{
    layout::Rect,
    widgets::{Block, Borders},
    Frame,
};

pub fn draw_header(f: &mut Frame<'_>, area: Rect, source: &str, index: usize, total: usize) {
    let title = if total == 0 {
        format!("ruprof — {source}: nothing to plot  (press 'q' to quit)")
    } else {
        format!(
            "ruprof — {source} | chart {}/{total}  (←/→ to page, 'q' to quit)",
            index + 1
        )
    };
    f.render_widget(Block::default().title(title).borders(Borders::BOTTOM), area);
}
