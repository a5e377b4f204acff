//! Color constants and bar scaling for the TUI.

use ratatui::style::Color;

/// Allocation bar color.
pub const BAR_COLOR: Color = Color::LightBlue;
/// Bar color for lines above the high-usage threshold.
pub const BAR_HIGH: Color = Color::LightRed;
/// Header bar foreground.
pub const HEADER_FG: Color = Color::White;
/// Header bar background.
pub const HEADER_BG: Color = Color::DarkGray;
/// Footer help text color.
pub const FOOTER_FG: Color = Color::DarkGray;
/// Highlighted table row background.
pub const SELECTED_BG: Color = Color::Blue;
/// Saving tip text color.
pub const TIP_FG: Color = Color::Yellow;

/// Fixed-point scale for bar values; `BarChart` only takes integers.
const BAR_SCALE: f64 = 100.0;

/// Converts a share to a non-negative integer bar length.
pub fn bar_value(share: f64) -> u64 {
    if share.is_finite() && share > 0.0 {
        (share * BAR_SCALE).round() as u64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_value_scales_and_clamps() {
        assert_eq!(bar_value(1.234), 123);
        assert_eq!(bar_value(0.0), 0);
        assert_eq!(bar_value(-1e-12), 0);
        assert_eq!(bar_value(f64::NAN), 0);
    }
}
