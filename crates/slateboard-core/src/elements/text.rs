//! Free-standing text.

use super::{ElementBehavior, ElementDefaults, Frame, HookContext, Property, PropertyValue, SerializableColor};
use crate::handles::{Edge, HandleKind, resize_frame};
use crate::metrics::{FontSpec, TextMetrics};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Smallest font size the auto-fit search will choose.
pub const MIN_FONT_SIZE: f64 = 8.0;
/// Font size increment used by the auto-fit search.
pub const FONT_SIZE_STEP: f64 = 2.0;
/// Largest font size the auto-fit search will choose.
pub const MAX_FONT_SIZE: f64 = 400.0;
/// Width given to text boxes created without a drag.
pub const DEFAULT_TEXT_WIDTH: f64 = 200.0;
/// Boxes narrower than this after creation fall back to the default width.
const MIN_CREATED_WIDTH: f64 = 8.0;

/// Available font families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FontFamily {
    /// Hand-drawn style font (default).
    #[default]
    Hand,
    Sans,
    Mono,
}

impl FontFamily {
    /// Font family name as used by renderers.
    pub fn name(&self) -> &'static str {
        match self {
            FontFamily::Hand => "Virgil",
            FontFamily::Sans => "Noto Sans",
            FontFamily::Mono => "Cascadia Mono",
        }
    }

    /// Average glyph advance as a fraction of the font size.
    pub fn width_factor(&self) -> f64 {
        match self {
            FontFamily::Hand => 0.55,
            FontFamily::Sans => 0.52,
            FontFamily::Mono => 0.60,
        }
    }
}

/// A wrapped block of text whose height follows its content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextData {
    #[serde(default)]
    pub content: String,
    pub font_size: f64,
    #[serde(default)]
    pub font_family: FontFamily,
    #[serde(default = "SerializableColor::black")]
    pub color: SerializableColor,
}

impl TextData {
    pub const DEFAULT_FONT_SIZE: f64 = 20.0;

    pub fn new(defaults: &ElementDefaults) -> Self {
        Self {
            content: String::new(),
            font_size: defaults.font_size,
            font_family: defaults.font_family,
            color: defaults.text_color,
        }
    }

    fn font(&self) -> FontSpec {
        FontSpec::new(self.font_family, self.font_size)
    }

    /// Set the frame height to what the content needs at the current width.
    fn fit_height(&self, frame: &mut Frame, metrics: &dyn TextMetrics) {
        let width = frame.width().abs();
        let needed = metrics.measure(&self.content, self.font(), Some(width));
        frame.y2 = if frame.height() < 0.0 {
            frame.y1 - needed.height
        } else {
            frame.y1 + needed.height
        };
    }
}

/// Largest font size in `MIN_FONT_SIZE..=MAX_FONT_SIZE` (stepping by
/// `FONT_SIZE_STEP`) at which `content` fits a `width` x `height` box.
pub fn fit_font_size(
    content: &str,
    family: FontFamily,
    width: f64,
    height: f64,
    metrics: &dyn TextMetrics,
) -> f64 {
    let mut best = MIN_FONT_SIZE;
    let mut size = MIN_FONT_SIZE;
    while size <= MAX_FONT_SIZE {
        let needed = metrics.measure(content, FontSpec::new(family, size), Some(width));
        if needed.height > height + 1e-9 || needed.width > width + 1e-9 {
            break;
        }
        best = size;
        size += FONT_SIZE_STEP;
    }
    best
}

impl ElementBehavior for TextData {
    fn on_create_end(&mut self, frame: &mut Frame, ctx: &HookContext<'_>) {
        frame.normalize();
        if frame.width() < MIN_CREATED_WIDTH {
            frame.x2 = frame.x1 + DEFAULT_TEXT_WIDTH;
        }
        self.fit_height(frame, ctx.metrics);
    }

    fn is_degenerate(&self, _frame: &Frame) -> bool {
        false
    }

    fn on_resize(&mut self, frame: &mut Frame, handle: HandleKind, point: Point, ctx: &HookContext<'_>) {
        *frame = resize_frame(frame, handle, point);
        match handle {
            HandleKind::Edge(Edge::Left | Edge::Right) => self.fit_height(frame, ctx.metrics),
            HandleKind::Corner(_) | HandleKind::Edge(Edge::Top | Edge::Bottom) => {
                self.font_size = fit_font_size(
                    &self.content,
                    self.font_family,
                    frame.width().abs(),
                    frame.height().abs(),
                    ctx.metrics,
                );
            }
            _ => {}
        }
    }

    fn on_update(&mut self, frame: &mut Frame, changed: &[Property], ctx: &HookContext<'_>) {
        if changed.iter().any(|p| p.affects_text_layout()) {
            self.fit_height(frame, ctx.metrics);
        }
    }

    fn is_value_allowed(&self, property: Property, value: &PropertyValue) -> bool {
        match (property, value) {
            (Property::FontSize, PropertyValue::Number(size)) => {
                (MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(size)
            }
            (Property::FontFamily, PropertyValue::Font(_)) => true,
            (Property::TextColor, PropertyValue::Color(_)) => true,
            (Property::Content, PropertyValue::Text(_)) => true,
            _ => false,
        }
    }

    fn apply_property(&mut self, property: Property, value: &PropertyValue) -> bool {
        match (property, value) {
            (Property::FontSize, PropertyValue::Number(size)) => self.font_size = *size,
            (Property::FontFamily, PropertyValue::Font(f)) => self.font_family = *f,
            (Property::TextColor, PropertyValue::Color(c)) => self.color = *c,
            (Property::Content, PropertyValue::Text(t)) => self.content = t.clone(),
            _ => return false,
        }
        true
    }

    fn text(&self) -> Option<&str> {
        Some(&self.content)
    }

    fn set_text(&mut self, content: &str) -> bool {
        self.content = content.to_string();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handles::Corner;
    use crate::metrics::ApproximateMetrics;
    use crate::settings::EditorSettings;

    fn text(content: &str) -> TextData {
        TextData {
            content: content.to_string(),
            ..TextData::new(&ElementDefaults::default())
        }
    }

    #[test]
    fn test_create_without_drag_uses_default_width() {
        let settings = EditorSettings::default();
        let ctx = HookContext::new(&ApproximateMetrics, &settings);
        let mut data = text("");
        let mut frame = Frame::at(Point::new(10.0, 10.0));
        data.on_create_end(&mut frame, &ctx);
        assert!((frame.width() - DEFAULT_TEXT_WIDTH).abs() < f64::EPSILON);
        // one line at 20px with 1.2 line height
        assert!((frame.height() - 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_side_resize_rewraps() {
        let settings = EditorSettings::default();
        let ctx = HookContext::new(&ApproximateMetrics, &settings);
        let mut data = text("hello world");
        let mut frame = Frame::new(0.0, 0.0, 200.0, 24.0);
        data.on_resize(&mut frame, HandleKind::Edge(Edge::Right), Point::new(60.0, 0.0), &ctx);
        assert!((frame.x2 - 60.0).abs() < f64::EPSILON);
        assert!((frame.height() - 48.0).abs() < 1e-9);
        assert!((data.font_size - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_corner_resize_fits_font() {
        let settings = EditorSettings::default();
        let ctx = HookContext::new(&ApproximateMetrics, &settings);
        let mut data = text("abcd");
        let mut frame = Frame::new(0.0, 0.0, 100.0, 30.0);
        data.on_resize(
            &mut frame,
            HandleKind::Corner(Corner::BottomRight),
            Point::new(200.0, 60.0),
            &ctx,
        );
        let fitted = data.font_size;
        let needed = ApproximateMetrics.measure("abcd", FontSpec::new(FontFamily::Hand, fitted), Some(200.0));
        assert!(needed.height <= 60.0 + 1e-9);
        let bigger = ApproximateMetrics.measure(
            "abcd",
            FontSpec::new(FontFamily::Hand, fitted + FONT_SIZE_STEP),
            Some(200.0),
        );
        assert!(bigger.height > 60.0 || bigger.width > 200.0);
    }

    #[test]
    fn test_fit_font_size_bounds() {
        // nothing fits a tiny box, so the minimum wins
        assert!((fit_font_size("abc", FontFamily::Hand, 1.0, 1.0, &ApproximateMetrics) - MIN_FONT_SIZE).abs() < f64::EPSILON);
        assert!((fit_font_size("a", FontFamily::Hand, 1e6, 1e6, &ApproximateMetrics) - MAX_FONT_SIZE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_content_update_remeasures() {
        let settings = EditorSettings::default();
        let ctx = HookContext::new(&ApproximateMetrics, &settings);
        let mut data = text("one");
        let mut frame = Frame::new(0.0, 0.0, 200.0, 24.0);
        data.content = "one\ntwo".to_string();
        data.on_update(&mut frame, &[Property::Content], &ctx);
        assert!((frame.height() - 48.0).abs() < 1e-9);
    }
}
