//! Line chart for one `ChartSpec`.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, LegendPosition, Widget},
};

use crate::plot::ChartSpec;
use crate::ui::theme::{series_color, AXIS, TITLE};
use crate::ui::util::{axis_label, truncate_middle};

pub const X_AXIS_TITLE: &str = "Time Steps";

fn axis_labels(lo: f64, hi: f64) -> Vec<Span<'static>> {
    let mid = (lo + hi) / 2.0;
    [lo, mid, hi]
        .into_iter()
        .map(|v| Span::styled(axis_label(v), Style::default().fg(AXIS)))
        .collect()
}

/// Render `spec` into `area` of `buf`.
pub fn draw_chart(spec: &ChartSpec, area: Rect, buf: &mut Buffer) {
    let [y_lo, y_hi] = spec.y_range();
    let max_title = area.width.saturating_sub(4) as usize;

    let datasets: Vec<Dataset<'_>> = spec
        .series
        .iter()
        .enumerate()
        .map(|(i, s)| {
            Dataset::default()
                .name(s.name.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(series_color(i)))
                .data(&s.points)
        })
        .collect();

    let mut chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(
                    truncate_middle(&spec.title, max_title),
                    Style::default().fg(TITLE).add_modifier(Modifier::BOLD),
                )),
        )
        .x_axis(
            Axis::default()
                .title(X_AXIS_TITLE)
                .style(Style::default().fg(AXIS))
                .bounds([0.0, spec.x_max])
                .labels(axis_labels(0.0, spec.x_max)),
        )
        .y_axis(
            Axis::default()
                .title(spec.unit.clone())
                .style(Style::default().fg(AXIS))
                .bounds([y_lo, y_hi])
                .labels(axis_labels(y_lo, y_hi)),
        );

    chart = if spec.legend {
        chart
            .legend_position(Some(LegendPosition::TopRight))
            .hidden_legend_constraints((Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)))
    } else {
        chart.legend_position(None)
    };

    chart.render(area, buf);
}
