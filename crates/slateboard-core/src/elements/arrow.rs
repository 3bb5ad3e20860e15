//! Arrows: a straight or single-curve connector that can bind its ends to
//! other elements.

use super::{
    ElementBehavior, ElementDefaults, ElementId, Frame, HookContext, Property, PropertyValue,
    Stroke, apply_stroke, stroke_value_allowed,
};
use crate::handles::{Handle, HandleKind};
use kurbo::{BezPath, Line, ParamCurve, ParamCurveNearest, Point, QuadBez, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Sample count used when searching for where a path leaves a bound element.
const TRIM_SAMPLES: usize = 64;
const TRIM_BISECTIONS: usize = 24;

/// Arrowhead decoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Arrowhead {
    #[default]
    None,
    Triangle,
    Bar,
    Dot,
}

/// Attachment of an arrow end to another element.
///
/// The anchor is stored as fractions of the target's box so that it follows
/// the target when it moves or resizes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrowBinding {
    pub element: ElementId,
    pub fx: f64,
    pub fy: f64,
}

impl ArrowBinding {
    /// Bind `point` to the element whose box is `rect`.
    pub fn new(element: ElementId, rect: Rect, point: Point) -> Self {
        let fraction = |v: f64, lo: f64, len: f64| {
            if len > 0.0 { ((v - lo) / len).clamp(0.0, 1.0) } else { 0.5 }
        };
        Self {
            element,
            fx: fraction(point.x, rect.x0, rect.width()),
            fy: fraction(point.y, rect.y0, rect.height()),
        }
    }

    /// The anchor point inside `rect`.
    pub fn anchor(&self, rect: Rect) -> Point {
        Point::new(
            rect.x0 + self.fx * rect.width(),
            rect.y0 + self.fy * rect.height(),
        )
    }
}

/// Geometry of an arrow ready to be stroked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArrowPath {
    Line(Line),
    Quad(QuadBez),
}

impl ArrowPath {
    pub fn eval(&self, t: f64) -> Point {
        match self {
            ArrowPath::Line(line) => line.eval(t),
            ArrowPath::Quad(quad) => quad.eval(t),
        }
    }

    pub fn start(&self) -> Point {
        self.eval(0.0)
    }

    pub fn end(&self) -> Point {
        self.eval(1.0)
    }

    pub fn subsegment(&self, range: std::ops::Range<f64>) -> Self {
        match self {
            ArrowPath::Line(line) => ArrowPath::Line(line.subsegment(range)),
            ArrowPath::Quad(quad) => ArrowPath::Quad(quad.subsegment(range)),
        }
    }

    /// Distance from `point` to the nearest point on the path.
    pub fn distance(&self, point: Point) -> f64 {
        let nearest = match self {
            ArrowPath::Line(line) => line.nearest(point, 1e-6),
            ArrowPath::Quad(quad) => quad.nearest(point, 1e-6),
        };
        nearest.distance_sq.sqrt()
    }

    pub fn to_bez_path(&self) -> BezPath {
        let mut path = BezPath::new();
        match self {
            ArrowPath::Line(line) => {
                path.move_to(line.p0);
                path.line_to(line.p1);
            }
            ArrowPath::Quad(quad) => {
                path.move_to(quad.p0);
                path.quad_to(quad.p1, quad.p2);
            }
        }
        path
    }

    /// Cut away the parts of the path lying inside the bound elements.
    fn trimmed(self, start_rect: Option<Rect>, end_rect: Option<Rect>) -> Self {
        let t0 = start_rect.map_or(0.0, |r| self.boundary_param(r, true));
        let t1 = end_rect.map_or(1.0, |r| self.boundary_param(r, false));
        if t0 >= t1 {
            return self;
        }
        self.subsegment(t0..t1)
    }

    /// Parameter at which the path first leaves `rect`, walking from one end.
    fn boundary_param(&self, rect: Rect, from_start: bool) -> f64 {
        let inside = |t: f64| {
            let p = self.eval(t);
            p.x >= rect.x0 && p.x <= rect.x1 && p.y >= rect.y0 && p.y <= rect.y1
        };
        let param = |i: usize| {
            let f = i as f64 / TRIM_SAMPLES as f64;
            if from_start { f } else { 1.0 - f }
        };

        if !inside(param(0)) {
            return param(0);
        }
        for i in 1..=TRIM_SAMPLES {
            let t = param(i);
            if !inside(t) {
                let (mut a, mut b) = (param(i - 1), t);
                for _ in 0..TRIM_BISECTIONS {
                    let mid = (a + b) / 2.0;
                    if inside(mid) {
                        a = mid;
                    } else {
                        b = mid;
                    }
                }
                return b;
            }
        }
        param(TRIM_SAMPLES)
    }
}

/// An arrow between two points, optionally bent through a quadratic control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrowData {
    pub start: Point,
    pub end: Point,
    /// Quadratic control point; `None` for a straight arrow.
    #[serde(default)]
    pub control: Option<Point>,
    #[serde(default)]
    pub start_binding: Option<ArrowBinding>,
    #[serde(default)]
    pub end_binding: Option<ArrowBinding>,
    #[serde(default)]
    pub start_head: Arrowhead,
    #[serde(default)]
    pub end_head: Arrowhead,
    #[serde(default)]
    pub stroke: Stroke,
}

impl ArrowData {
    pub fn new(defaults: &ElementDefaults) -> Self {
        Self {
            start: Point::ZERO,
            end: Point::ZERO,
            control: None,
            start_binding: None,
            end_binding: None,
            start_head: defaults.start_head,
            end_head: defaults.end_head,
            stroke: defaults.stroke,
        }
    }

    fn curve(start: Point, end: Point, control: Option<Point>) -> ArrowPath {
        match control {
            Some(c) => ArrowPath::Quad(QuadBez::new(start, c, end)),
            None => ArrowPath::Line(Line::new(start, end)),
        }
    }

    /// Unbound geometry from the stored points.
    pub fn raw_path(&self) -> ArrowPath {
        Self::curve(self.start, self.end, self.control)
    }

    /// Point halfway along the curve, where the midpoint handle sits.
    pub fn midpoint(&self) -> Point {
        self.raw_path().eval(0.5)
    }

    /// Bend the arrow so that its halfway point passes through `point`.
    pub fn set_midpoint(&mut self, point: Point) {
        let chord_mid = self.start.midpoint(self.end);
        self.control = Some(Point::new(
            2.0 * point.x - chord_mid.x,
            2.0 * point.y - chord_mid.y,
        ));
    }

    pub fn is_bound(&self) -> bool {
        self.start_binding.is_some() || self.end_binding.is_some()
    }

    pub fn clear_bindings(&mut self) {
        self.start_binding = None;
        self.end_binding = None;
    }

    /// Endpoints with bindings resolved against their targets' boxes.
    ///
    /// A binding whose target cannot be found falls back to the stored point.
    pub fn resolved_endpoints(&self, lookup: &dyn Fn(ElementId) -> Option<Rect>) -> (Point, Point) {
        let resolve = |binding: Option<ArrowBinding>, fallback: Point| {
            binding
                .and_then(|b| lookup(b.element).map(|rect| b.anchor(rect)))
                .unwrap_or(fallback)
        };
        (
            resolve(self.start_binding, self.start),
            resolve(self.end_binding, self.end),
        )
    }

    /// Renderable path: endpoints resolved and both ends trimmed at the
    /// boundary of the element they are bound to.
    pub fn path(&self, lookup: &dyn Fn(ElementId) -> Option<Rect>) -> ArrowPath {
        let (start, end) = self.resolved_endpoints(lookup);
        let control = self.control.map(|c| {
            // keep the bend relative to the chord when endpoints moved
            let stored_mid = self.start.midpoint(self.end);
            c + (start.midpoint(end) - stored_mid)
        });
        let start_rect = self.start_binding.and_then(|b| lookup(b.element));
        let end_rect = self.end_binding.and_then(|b| lookup(b.element));
        Self::curve(start, end, control).trimmed(start_rect, end_rect)
    }

    /// Move the stored endpoints onto their bound anchors, carrying the bend
    /// along with the chord. Returns false if nothing moved.
    pub fn follow_bindings(
        &mut self,
        frame: &mut Frame,
        lookup: &dyn Fn(ElementId) -> Option<Rect>,
    ) -> bool {
        let (start, end) = self.resolved_endpoints(lookup);
        let unchanged = |a: Point, b: Point| (a - b).hypot() < 1e-9;
        if unchanged(start, self.start) && unchanged(end, self.end) {
            return false;
        }
        let shift = start.midpoint(end) - self.start.midpoint(self.end);
        self.control = self.control.map(|c| c + shift);
        self.start = start;
        self.end = end;
        self.sync_frame(frame);
        frame.normalize();
        true
    }

    fn sync_frame(&self, frame: &mut Frame) {
        *frame = Frame::from_points(self.start, self.end);
    }
}

impl ElementBehavior for ArrowData {
    fn on_create_start(&mut self, frame: &mut Frame, point: Point, _ctx: &HookContext<'_>) {
        self.start = point;
        self.end = point;
        self.control = None;
        self.sync_frame(frame);
    }

    fn on_create_move(&mut self, frame: &mut Frame, point: Point, _ctx: &HookContext<'_>) {
        self.end = point;
        self.sync_frame(frame);
    }

    fn on_create_end(&mut self, frame: &mut Frame, _ctx: &HookContext<'_>) {
        self.sync_frame(frame);
        frame.normalize();
    }

    fn is_degenerate(&self, _frame: &Frame) -> bool {
        self.start == self.end
    }

    fn on_drag(&mut self, delta: Vec2) {
        self.start += delta;
        self.end += delta;
        if let Some(control) = &mut self.control {
            *control += delta;
        }
    }

    fn on_resize(&mut self, frame: &mut Frame, handle: HandleKind, point: Point, _ctx: &HookContext<'_>) {
        match handle {
            HandleKind::Start => self.start = point,
            HandleKind::End => self.end = point,
            HandleKind::Midpoint => self.set_midpoint(point),
            _ => return,
        }
        self.sync_frame(frame);
    }

    fn on_resize_end(&mut self, frame: &mut Frame, ctx: &HookContext<'_>) {
        if self.control.is_some() {
            let chord = Line::new(self.start, self.end);
            let offset = chord.nearest(self.midpoint(), 1e-6).distance_sq.sqrt();
            if offset < ctx.settings.arrow_straighten_distance {
                self.control = None;
            }
        }
        self.sync_frame(frame);
        frame.normalize();
    }

    fn handles(&self, _frame: &Frame, _rotation: f64) -> Vec<Handle> {
        vec![
            Handle::new(self.start, HandleKind::Start),
            Handle::new(self.end, HandleKind::End),
            Handle::new(self.midpoint(), HandleKind::Midpoint),
        ]
    }

    fn hit_test(&self, _frame: &Frame, point: Point, tolerance: f64) -> bool {
        self.raw_path().distance(point) <= tolerance + self.stroke.width / 2.0
    }

    fn is_value_allowed(&self, property: Property, value: &PropertyValue) -> bool {
        match (property, value) {
            (Property::StartHead | Property::EndHead, PropertyValue::Head(_)) => true,
            _ => stroke_value_allowed(property, value),
        }
    }

    fn apply_property(&mut self, property: Property, value: &PropertyValue) -> bool {
        match (property, value) {
            (Property::StartHead, PropertyValue::Head(h)) => self.start_head = *h,
            (Property::EndHead, PropertyValue::Head(h)) => self.end_head = *h,
            _ => return apply_stroke(&mut self.stroke, property, value),
        }
        true
    }
}
