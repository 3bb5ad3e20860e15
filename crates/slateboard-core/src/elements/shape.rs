//! Geometric shapes: rectangle, ellipse and diamond.

use super::{
    ElementBehavior, ElementDefaults, FontFamily, Frame, Property, PropertyValue,
    SerializableColor, Stroke, apply_stroke, stroke_value_allowed,
};
use super::text::{MAX_FONT_SIZE, MIN_FONT_SIZE};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Outline of a shape element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShapeKind {
    Rectangle,
    Ellipse,
    Diamond,
}

/// A closed shape with an optional centered label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeData {
    pub shape: ShapeKind,
    #[serde(default)]
    pub stroke: Stroke,
    #[serde(default)]
    pub fill: Option<SerializableColor>,
    #[serde(default)]
    pub label: String,
    #[serde(default = "default_label_size")]
    pub font_size: f64,
    #[serde(default)]
    pub font_family: FontFamily,
}

fn default_label_size() -> f64 {
    super::TextData::DEFAULT_FONT_SIZE
}

impl ShapeData {
    pub fn new(shape: ShapeKind, defaults: &ElementDefaults) -> Self {
        Self {
            shape,
            stroke: defaults.stroke,
            fill: defaults.fill,
            label: String::new(),
            font_size: defaults.font_size,
            font_family: defaults.font_family,
        }
    }
}

impl ElementBehavior for ShapeData {
    fn hit_test(&self, frame: &Frame, point: Point, tolerance: f64) -> bool {
        let rect = frame.rect().inflate(tolerance, tolerance);
        if !rect.contains(point) {
            return false;
        }
        let center = rect.center();
        let rx = rect.width() / 2.0;
        let ry = rect.height() / 2.0;
        if rx <= 0.0 || ry <= 0.0 {
            return true;
        }
        let dx = (point.x - center.x) / rx;
        let dy = (point.y - center.y) / ry;
        match self.shape {
            ShapeKind::Rectangle => true,
            ShapeKind::Ellipse => dx * dx + dy * dy <= 1.0,
            ShapeKind::Diamond => dx.abs() + dy.abs() <= 1.0,
        }
    }

    fn is_value_allowed(&self, property: Property, value: &PropertyValue) -> bool {
        match (property, value) {
            (Property::FillColor, PropertyValue::OptionalColor(_)) => true,
            (Property::FontSize, PropertyValue::Number(size)) => {
                (MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(size)
            }
            (Property::FontFamily, PropertyValue::Font(_)) => true,
            (Property::Content, PropertyValue::Text(_)) => true,
            (Property::ShapeKind, PropertyValue::Shape(_)) => true,
            _ => stroke_value_allowed(property, value),
        }
    }

    fn apply_property(&mut self, property: Property, value: &PropertyValue) -> bool {
        match (property, value) {
            (Property::FillColor, PropertyValue::OptionalColor(c)) => self.fill = *c,
            (Property::FontSize, PropertyValue::Number(size)) => self.font_size = *size,
            (Property::FontFamily, PropertyValue::Font(f)) => self.font_family = *f,
            (Property::Content, PropertyValue::Text(t)) => self.label = t.clone(),
            (Property::ShapeKind, PropertyValue::Shape(s)) => self.shape = *s,
            _ => return apply_stroke(&mut self.stroke, property, value),
        }
        true
    }

    fn text(&self) -> Option<&str> {
        Some(&self.label)
    }

    fn set_text(&mut self, content: &str) -> bool {
        self.label = content.to_string();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(kind: ShapeKind) -> ShapeData {
        ShapeData::new(kind, &ElementDefaults::default())
    }

    #[test]
    fn test_ellipse_hit_test_excludes_corners() {
        let frame = Frame::new(0.0, 0.0, 100.0, 100.0);
        let ellipse = shape(ShapeKind::Ellipse);
        assert!(ellipse.hit_test(&frame, Point::new(50.0, 50.0), 0.0));
        assert!(!ellipse.hit_test(&frame, Point::new(2.0, 2.0), 0.0));
        assert!(shape(ShapeKind::Rectangle).hit_test(&frame, Point::new(2.0, 2.0), 0.0));
    }

    #[test]
    fn test_diamond_hit_test() {
        let frame = Frame::new(0.0, 0.0, 100.0, 100.0);
        let diamond = shape(ShapeKind::Diamond);
        assert!(diamond.hit_test(&frame, Point::new(50.0, 5.0), 0.0));
        assert!(!diamond.hit_test(&frame, Point::new(10.0, 10.0), 0.0));
    }

    #[test]
    fn test_property_validation() {
        let data = shape(ShapeKind::Rectangle);
        assert!(data.is_value_allowed(Property::FillColor, &PropertyValue::OptionalColor(None)));
        assert!(data.is_value_allowed(Property::StrokeWidth, &PropertyValue::Number(4.0)));
        assert!(!data.is_value_allowed(Property::StrokeWidth, &PropertyValue::Number(0.0)));
        assert!(!data.is_value_allowed(Property::FontSize, &PropertyValue::Number(1.0)));
        assert!(!data.is_value_allowed(Property::StartHead, &PropertyValue::Number(1.0)));
    }
}
