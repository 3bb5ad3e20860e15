//! Text measurement.
//!
//! Layout of rendered glyphs belongs to the host, so the engine asks a
//! [`TextMetrics`] implementation how much room a string needs. The bundled
//! [`ApproximateMetrics`] estimates sizes from per-family average character
//! widths, which is good enough for headless use and tests.

use crate::elements::FontFamily;
use kurbo::Size;

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f64 = 1.2;

/// Font parameters relevant to measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec {
    pub family: FontFamily,
    pub size: f64,
}

impl FontSpec {
    pub fn new(family: FontFamily, size: f64) -> Self {
        Self { family, size }
    }

    pub fn line_height(&self) -> f64 {
        self.size * LINE_HEIGHT_FACTOR
    }
}

/// Measures text laid out with an optional wrapping width.
pub trait TextMetrics {
    /// Size of `text` when wrapped to `max_width` (or unwrapped for `None`).
    ///
    /// Empty text still occupies one line.
    fn measure(&self, text: &str, font: FontSpec, max_width: Option<f64>) -> Size;
}

/// Character-count based metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproximateMetrics;

impl ApproximateMetrics {
    fn char_width(font: FontSpec) -> f64 {
        font.size * font.family.width_factor()
    }
}

impl TextMetrics for ApproximateMetrics {
    fn measure(&self, text: &str, font: FontSpec, max_width: Option<f64>) -> Size {
        let char_width = Self::char_width(font);
        let max_chars = max_width.map(|w| ((w.abs() / char_width).floor() as usize).max(1));

        let mut line_count = 0usize;
        let mut widest = 0usize;
        // split keeps a trailing empty segment, so "a\n" is two lines
        for raw in text.split('\n') {
            for len in wrap_line(raw, max_chars) {
                line_count += 1;
                widest = widest.max(len);
            }
        }

        Size::new(
            widest as f64 * char_width,
            line_count.max(1) as f64 * font.line_height(),
        )
    }
}

/// Greedy word wrap, returning the character length of each visual line.
fn wrap_line(line: &str, max_chars: Option<usize>) -> Vec<usize> {
    let Some(max) = max_chars else {
        return vec![line.chars().count()];
    };

    let mut lines = Vec::new();
    let mut current = 0usize;
    for word in line.split(' ') {
        let mut len = word.chars().count();
        let needed = if current == 0 { len } else { current + 1 + len };
        if needed <= max {
            current = needed;
            continue;
        }
        if current > 0 {
            lines.push(current);
        }
        while len > max {
            lines.push(max);
            len -= max;
        }
        current = len;
    }
    lines.push(current);
    lines
}
