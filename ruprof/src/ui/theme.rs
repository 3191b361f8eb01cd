//! Shared chart colors.

use ratatui::style::Color;

pub const AXIS: Color = Color::Rgb(170, 170, 180);
pub const TITLE: Color = Color::Rgb(220, 220, 230);

/// Series colors, cycled in group order.
pub const PALETTE: [Color; 8] = [
    Color::Cyan,
    Color::Yellow,
    Color::Magenta,
    Color::Green,
    Color::LightRed,
    Color::LightBlue,
    Color::Rgb(255, 165, 0),
    Color::Gray,
];

pub fn series_color(i: usize) -> Color {
    PALETTE[i % PALETTE.len()]
}
