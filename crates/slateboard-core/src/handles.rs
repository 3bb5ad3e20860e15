//! Resize and rotation handles.
//!
//! Handles are computed from an element's frame in its local (unrotated)
//! space and then rotated with the element for hit testing.

use crate::elements::Frame;
use kurbo::{Affine, Point, Rect};
use serde::{Deserialize, Serialize};

/// Handle hit tolerance in screen pixels.
pub const HANDLE_HIT_TOLERANCE: f64 = 8.0;

/// Distance from the top edge to the rotation handle (in world units).
pub const ROTATE_HANDLE_OFFSET: f64 = 25.0;

/// Type of selection handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    Corner(Corner),
    Edge(Edge),
    /// Arrow start point.
    Start,
    /// Arrow end point.
    End,
    /// Arrow curve midpoint.
    Midpoint,
    /// Rotation handle, positioned above the element.
    Rotate,
}

/// Corner positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Edge positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

impl HandleKind {
    /// Whether dragging this handle changes the frame's horizontal extent.
    pub fn moves_x(self) -> bool {
        matches!(
            self,
            HandleKind::Corner(_) | HandleKind::Edge(Edge::Left) | HandleKind::Edge(Edge::Right)
        )
    }

    /// Whether dragging this handle changes the frame's vertical extent.
    pub fn moves_y(self) -> bool {
        matches!(
            self,
            HandleKind::Corner(_) | HandleKind::Edge(Edge::Top) | HandleKind::Edge(Edge::Bottom)
        )
    }

    pub fn is_corner(self) -> bool {
        matches!(self, HandleKind::Corner(_))
    }
}

/// A selection handle with its position and type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    /// Position in world coordinates.
    pub position: Point,
    pub kind: HandleKind,
}

impl Handle {
    pub fn new(position: Point, kind: HandleKind) -> Self {
        Self { position, kind }
    }

    /// Check if a point (in world coordinates) hits this handle.
    /// `tolerance` should be adjusted for camera zoom.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        (point - self.position).hypot2() <= tolerance * tolerance
    }
}

/// Rotate a point around a center by `angle` radians.
pub fn rotate_about(point: Point, center: Point, angle: f64) -> Point {
    if angle == 0.0 {
        return point;
    }
    Affine::rotate_about(angle, center) * point
}

/// Corner, edge and rotation handles for a box element.
pub fn box_handles(frame: &Frame, rotation: f64) -> Vec<Handle> {
    let rect = frame.rect();
    let center = rect.center();
    let mut handles = corner_handles(rect);
    handles.extend([
        Handle::new(Point::new(center.x, rect.y0), HandleKind::Edge(Edge::Top)),
        Handle::new(Point::new(rect.x1, center.y), HandleKind::Edge(Edge::Right)),
        Handle::new(Point::new(center.x, rect.y1), HandleKind::Edge(Edge::Bottom)),
        Handle::new(Point::new(rect.x0, center.y), HandleKind::Edge(Edge::Left)),
    ]);
    handles.push(rotate_handle(rect));
    rotated(handles, center, rotation)
}

/// Corner and rotation handles only.
pub fn corner_and_rotate_handles(frame: &Frame, rotation: f64) -> Vec<Handle> {
    let rect = frame.rect();
    let mut handles = corner_handles(rect);
    handles.push(rotate_handle(rect));
    rotated(handles, rect.center(), rotation)
}

fn corner_handles(rect: Rect) -> Vec<Handle> {
    vec![
        Handle::new(Point::new(rect.x0, rect.y0), HandleKind::Corner(Corner::TopLeft)),
        Handle::new(Point::new(rect.x1, rect.y0), HandleKind::Corner(Corner::TopRight)),
        Handle::new(Point::new(rect.x0, rect.y1), HandleKind::Corner(Corner::BottomLeft)),
        Handle::new(Point::new(rect.x1, rect.y1), HandleKind::Corner(Corner::BottomRight)),
    ]
}

fn rotate_handle(rect: Rect) -> Handle {
    Handle::new(
        Point::new(rect.center().x, rect.y0 - ROTATE_HANDLE_OFFSET),
        HandleKind::Rotate,
    )
}

fn rotated(mut handles: Vec<Handle>, center: Point, rotation: f64) -> Vec<Handle> {
    for handle in &mut handles {
        handle.position = rotate_about(handle.position, center, rotation);
    }
    handles
}

/// Find which handle (if any) is hit at the given point.
pub fn hit_test_handles(handles: &[Handle], point: Point, tolerance: f64) -> Option<HandleKind> {
    handles
        .iter()
        .find(|handle| handle.hit_test(point, tolerance))
        .map(|handle| handle.kind)
}

/// Move the frame coordinates driven by `handle` to `point`.
///
/// `frame` is the normalized frame at gesture start; the opposite corner or
/// edge is the anchor and stays put. The result may be unordered.
pub fn resize_frame(frame: &Frame, handle: HandleKind, point: Point) -> Frame {
    let mut out = *frame;
    match handle {
        HandleKind::Corner(Corner::TopLeft) => {
            out.x1 = point.x;
            out.y1 = point.y;
        }
        HandleKind::Corner(Corner::TopRight) => {
            out.x2 = point.x;
            out.y1 = point.y;
        }
        HandleKind::Corner(Corner::BottomLeft) => {
            out.x1 = point.x;
            out.y2 = point.y;
        }
        HandleKind::Corner(Corner::BottomRight) => {
            out.x2 = point.x;
            out.y2 = point.y;
        }
        HandleKind::Edge(Edge::Top) => out.y1 = point.y,
        HandleKind::Edge(Edge::Bottom) => out.y2 = point.y,
        HandleKind::Edge(Edge::Left) => out.x1 = point.x,
        HandleKind::Edge(Edge::Right) => out.x2 = point.x,
        HandleKind::Start | HandleKind::End | HandleKind::Midpoint | HandleKind::Rotate => {}
    }
    out
}
