//! Freehand strokes.

use super::{
    ElementBehavior, ElementDefaults, Frame, HookContext, Property, PropertyValue, Stroke,
    apply_stroke, stroke_value_allowed,
};
use crate::handles::{HandleKind, resize_frame};
use kurbo::{Line, ParamCurveNearest, Point, Vec2};
use serde::{Deserialize, Serialize};

/// A pen stroke.
///
/// While the stroke is being drawn its points are absolute canvas positions.
/// Once committed they are relative to the frame's top-left corner, which
/// lets drags move the frame alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreehandData {
    pub points: Vec<Point>,
    #[serde(default)]
    pub stroke: Stroke,
    #[serde(default)]
    absolute: bool,
}

impl FreehandData {
    pub fn new(defaults: &ElementDefaults) -> Self {
        Self {
            points: Vec::new(),
            stroke: defaults.stroke,
            absolute: false,
        }
    }

    /// Points in canvas space.
    pub fn absolute_points(&self, frame: &Frame) -> Vec<Point> {
        if self.absolute {
            return self.points.clone();
        }
        let origin = frame.start().to_vec2();
        self.points.iter().map(|p| *p + origin).collect()
    }
}

/// Distance from `point` to the polyline through `points`.
fn polyline_distance(points: &[Point], point: Point) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => (point - *only).hypot(),
        _ => points
            .windows(2)
            .map(|w| Line::new(w[0], w[1]).nearest(point, 1e-9).distance_sq.sqrt())
            .fold(f64::INFINITY, f64::min),
    }
}

impl ElementBehavior for FreehandData {
    fn on_create_start(&mut self, frame: &mut Frame, point: Point, _ctx: &HookContext<'_>) {
        self.points = vec![point];
        self.absolute = true;
        *frame = Frame::at(point);
    }

    fn on_create_move(&mut self, frame: &mut Frame, point: Point, ctx: &HookContext<'_>) {
        let far_enough = self
            .points
            .last()
            .is_none_or(|last| (point - *last).hypot() > ctx.settings.freehand_min_distance);
        if far_enough {
            self.points.push(point);
            if let Some(bounds) = Frame::bounding(self.points.iter().copied()) {
                *frame = bounds;
            }
        }
    }

    fn on_create_end(&mut self, frame: &mut Frame, ctx: &HookContext<'_>) {
        let Some(mut bounds) = Frame::bounding(self.points.iter().copied()) else {
            frame.normalize();
            return;
        };
        let pad = ctx.settings.freehand_padding;
        bounds = Frame::new(bounds.x1 - pad, bounds.y1 - pad, bounds.x2 + pad, bounds.y2 + pad);
        bounds.expand_to_grid(ctx.settings.grid_size);
        let origin = bounds.start().to_vec2();
        for p in &mut self.points {
            *p -= origin;
        }
        self.absolute = false;
        *frame = bounds;
    }

    fn is_degenerate(&self, _frame: &Frame) -> bool {
        self.points.is_empty()
    }

    fn on_resize(&mut self, frame: &mut Frame, handle: HandleKind, point: Point, _ctx: &HookContext<'_>) {
        let original = *frame;
        *frame = resize_frame(&original, handle, point);
        let sx = if original.width() != 0.0 { frame.width() / original.width() } else { 1.0 };
        let sy = if original.height() != 0.0 { frame.height() / original.height() } else { 1.0 };
        // relative to (x1, y1), so a signed scale also mirrors a flipped frame
        for p in &mut self.points {
            *p = Point::new(p.x * sx, p.y * sy);
        }
    }

    fn on_resize_end(&mut self, frame: &mut Frame, _ctx: &HookContext<'_>) {
        let before = frame.start();
        frame.normalize();
        let shift = before - frame.start();
        if shift != Vec2::ZERO {
            for p in &mut self.points {
                *p += shift;
            }
        }
    }

    fn hit_test(&self, frame: &Frame, point: Point, tolerance: f64) -> bool {
        polyline_distance(&self.absolute_points(frame), point) <= tolerance + self.stroke.width / 2.0
    }

    fn is_value_allowed(&self, property: Property, value: &PropertyValue) -> bool {
        stroke_value_allowed(property, value)
    }

    fn apply_property(&mut self, property: Property, value: &PropertyValue) -> bool {
        apply_stroke(&mut self.stroke, property, value)
    }
}
