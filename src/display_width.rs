use unicode_width::UnicodeWidthStr;

/// Average glyph advance of a proportional sans-serif face, as a fraction of
/// the font size. Wide (CJK) characters count as two columns.
const CHAR_ADVANCE: f64 = 0.6;
pub const LINE_HEIGHT: f64 = 1.2;

pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

pub fn split_lines(s: &str) -> Vec<&str> {
    s.split('\n').collect()
}

/// Maximum display width among newline-separated lines.
pub fn multiline_width(s: &str) -> usize {
    split_lines(s)
        .iter()
        .map(|line| display_width(line))
        .max()
        .unwrap_or(0)
}

pub fn line_count(s: &str) -> usize {
    split_lines(s).len()
}

/// Estimated `(width, height)` of a text block at `font_size`.
pub fn text_extent(s: &str, font_size: f64) -> (f64, f64) {
    let width = multiline_width(s) as f64 * font_size * CHAR_ADVANCE;
    let height = line_count(s) as f64 * font_size * LINE_HEIGHT;
    (width, height)
}
