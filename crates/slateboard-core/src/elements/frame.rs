//! The bounding box every element carries.

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Axis-aligned box given by two corners.
///
/// While a gesture is in progress the corners may be unordered
/// (`x2 < x1` or `y2 < y1`); everything persisted is normalized.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Frame {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Frame {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Frame spanning two points, in the given order.
    pub fn from_points(a: Point, b: Point) -> Self {
        Self::new(a.x, a.y, b.x, b.y)
    }

    /// Zero-size frame at a point.
    pub fn at(point: Point) -> Self {
        Self::from_points(point, point)
    }

    pub fn from_rect(rect: Rect) -> Self {
        Self::new(rect.x0, rect.y0, rect.x1, rect.y1)
    }

    /// Frame of the given size centered on a point.
    pub fn centered(center: Point, width: f64, height: f64) -> Self {
        Self::new(
            center.x - width / 2.0,
            center.y - height / 2.0,
            center.x + width / 2.0,
            center.y + height / 2.0,
        )
    }

    /// Smallest normalized frame containing every point.
    pub fn bounding(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self::at(first), |mut frame, p| {
            frame.x1 = frame.x1.min(p.x);
            frame.y1 = frame.y1.min(p.y);
            frame.x2 = frame.x2.max(p.x);
            frame.y2 = frame.y2.max(p.y);
            frame
        }))
    }

    /// Signed width (negative while flipped).
    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    /// Signed height (negative while flipped).
    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    pub fn start(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    pub fn end(&self) -> Point {
        Point::new(self.x2, self.y2)
    }

    pub fn center(&self) -> Point {
        Point::new((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    /// Normalized rectangle covering the frame.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x1, self.y1, self.x2, self.y2).abs()
    }

    pub fn is_normalized(&self) -> bool {
        self.x1 <= self.x2 && self.y1 <= self.y2
    }

    /// Reorder corners so that `x1 <= x2` and `y1 <= y2`.
    pub fn normalize(&mut self) {
        if self.x1 > self.x2 {
            std::mem::swap(&mut self.x1, &mut self.x2);
        }
        if self.y1 > self.y2 {
            std::mem::swap(&mut self.y1, &mut self.y2);
        }
    }

    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.x1 += delta.x;
        self.x2 += delta.x;
        self.y1 += delta.y;
        self.y2 += delta.y;
    }

    pub fn translated(mut self, delta: Vec2) -> Self {
        self.translate(delta);
        self
    }

    /// Inclusive containment test.
    pub fn contains(&self, point: Point) -> bool {
        let r = self.rect();
        point.x >= r.x0 && point.x <= r.x1 && point.y >= r.y0 && point.y <= r.y1
    }

    /// Whether `other` lies entirely inside this frame.
    pub fn contains_frame(&self, other: &Frame) -> bool {
        let outer = self.rect();
        let inner = other.rect();
        inner.x0 >= outer.x0 && inner.x1 <= outer.x1 && inner.y0 >= outer.y0 && inner.y1 <= outer.y1
    }

    pub fn union(&self, other: &Frame) -> Frame {
        Frame::from_rect(self.rect().union(other.rect()))
    }

    /// Round every coordinate to the nearest grid line.
    pub fn round_to_grid(&mut self, grid: f64) {
        if grid <= 0.0 {
            return;
        }
        self.x1 = round_to(self.x1, grid);
        self.y1 = round_to(self.y1, grid);
        self.x2 = round_to(self.x2, grid);
        self.y2 = round_to(self.y2, grid);
    }

    /// Grow a normalized frame outward to the enclosing grid lines.
    pub fn expand_to_grid(&mut self, grid: f64) {
        if grid <= 0.0 {
            return;
        }
        self.normalize();
        self.x1 = (self.x1 / grid).floor() * grid;
        self.y1 = (self.y1 / grid).floor() * grid;
        self.x2 = (self.x2 / grid).ceil() * grid;
        self.y2 = (self.y2 / grid).ceil() * grid;
    }
}

fn round_to(value: f64, grid: f64) -> f64 {
    (value / grid).round() * grid
}
