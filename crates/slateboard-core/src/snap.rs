//! Snap functionality for aligning geometry to the grid and to other elements.
//!
//! Element snapping works on *edges*: every candidate element contributes
//! vertical lines (at its left, center and right) and horizontal lines (top,
//! center, bottom). A moving box offers its own three coordinates per axis
//! and is pulled onto the nearest edge within the threshold.

use crate::elements::{Element, Frame};
use crate::settings::EditorSettings;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Grid size for snapping (matches the visual grid).
pub const GRID_SIZE: f64 = 20.0;

/// Distance threshold for element snapping (in canvas units).
pub const SNAP_THRESHOLD: f64 = 10.0;

/// Angle snap increment in degrees.
pub const ANGLE_SNAP_INCREMENT: f64 = 15.0;

/// Positions closer than this are treated as the same edge.
const EDGE_EPSILON: f64 = 1e-6;

/// Result of a snap operation.
#[derive(Debug, Clone, Copy)]
pub struct SnapResult {
    /// The snapped point.
    pub point: Point,
    /// Whether the X coordinate was snapped.
    pub snapped_x: bool,
    /// Whether the Y coordinate was snapped.
    pub snapped_y: bool,
}

impl SnapResult {
    /// Create a result with no snapping.
    pub fn none(point: Point) -> Self {
        Self {
            point,
            snapped_x: false,
            snapped_y: false,
        }
    }

    /// Check if any snapping occurred.
    pub fn is_snapped(&self) -> bool {
        self.snapped_x || self.snapped_y
    }
}

/// Round a single value to the grid.
pub fn snap_value_to_grid(value: f64, grid_size: f64) -> f64 {
    if grid_size <= 0.0 {
        return value;
    }
    (value / grid_size).round() * grid_size
}

/// Snap a point to the nearest grid intersection.
pub fn snap_to_grid(point: Point, grid_size: f64) -> SnapResult {
    SnapResult {
        point: Point::new(
            snap_value_to_grid(point.x, grid_size),
            snap_value_to_grid(point.y, grid_size),
        ),
        snapped_x: true,
        snapped_y: true,
    }
}

/// Snap an angle to the nearest increment.
/// Returns the snapped angle in degrees (0-360).
pub fn snap_angle(angle_degrees: f64, increment: f64) -> f64 {
    let snapped = (angle_degrees / increment).round() * increment;
    if snapped < 0.0 {
        snapped + 360.0
    } else if snapped >= 360.0 {
        snapped - 360.0
    } else {
        snapped
    }
}

/// Orientation of a snap edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SnapAxis {
    /// A vertical line `x = position`.
    X,
    /// A horizontal line `y = position`.
    Y,
}

/// A line other geometry can align to, with the reference points lying on it
/// (used to draw guides).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapEdge {
    pub axis: SnapAxis,
    pub position: f64,
    pub points: Vec<Point>,
}

impl SnapEdge {
    pub fn new(axis: SnapAxis, position: f64) -> Self {
        Self {
            axis,
            position,
            points: Vec::new(),
        }
    }
}

/// Left/center/right and top/center/bottom edges of a frame, without points.
pub fn frame_edges(frame: &Frame) -> Vec<SnapEdge> {
    let rect = frame.rect();
    let center = rect.center();
    vec![
        SnapEdge::new(SnapAxis::X, rect.x0),
        SnapEdge::new(SnapAxis::X, center.x),
        SnapEdge::new(SnapAxis::X, rect.x1),
        SnapEdge::new(SnapAxis::Y, rect.y0),
        SnapEdge::new(SnapAxis::Y, center.y),
        SnapEdge::new(SnapAxis::Y, rect.y1),
    ]
}

/// Corners, edge midpoints and center of a frame that lie on the given line.
pub fn frame_points_on(frame: &Frame, axis: SnapAxis, position: f64) -> Vec<Point> {
    let rect = frame.rect();
    let center = rect.center();
    let xs = [rect.x0, center.x, rect.x1];
    let ys = [rect.y0, center.y, rect.y1];
    let mut points = Vec::with_capacity(3);
    for &x in &xs {
        for &y in &ys {
            let on_line = match axis {
                SnapAxis::X => (x - position).abs() < EDGE_EPSILON,
                SnapAxis::Y => (y - position).abs() < EDGE_EPSILON,
            };
            if on_line {
                points.push(Point::new(x, y));
            }
        }
    }
    points
}

/// Snapping state for one gesture.
///
/// Built once when a gesture starts from every element that is neither
/// selected nor being created, so the moving geometry never snaps to itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapEngine {
    edges: Vec<SnapEdge>,
    threshold: f64,
    /// Grid spacing when grid mode is on; element snapping is skipped then.
    grid: Option<f64>,
    /// Edges matched by the most recent snap, for guide rendering.
    active: Vec<SnapEdge>,
}

impl SnapEngine {
    pub fn build<'a>(
        elements: impl IntoIterator<Item = &'a Element>,
        settings: &EditorSettings,
    ) -> Self {
        let grid = settings.grid_enabled.then_some(settings.grid_size);
        let mut edges: Vec<SnapEdge> = Vec::new();
        if settings.snaps_to_elements() {
            for element in elements {
                if element.selected || element.creating || element.erased {
                    continue;
                }
                for edge in element.snap_edges() {
                    merge_edge(&mut edges, edge);
                }
            }
        }
        log::debug!("Snap engine built with {} edges", edges.len());
        Self {
            edges,
            threshold: settings.snap_threshold,
            grid,
            active: Vec::new(),
        }
    }

    /// An engine that never snaps.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn edges(&self) -> &[SnapEdge] {
        &self.edges
    }

    /// Edges the last snap aligned to.
    pub fn guides(&self) -> &[SnapEdge] {
        &self.active
    }

    pub fn clear_guides(&mut self) {
        self.active.clear();
    }

    /// Offset to apply along `axis`.
    ///
    /// Candidates are tried in order; for each, the nearest edge within the
    /// threshold is taken, and the first candidate that finds one wins.
    pub fn snap_axis(&mut self, axis: SnapAxis, candidates: &[f64]) -> f64 {
        for &candidate in candidates {
            let best = self
                .edges
                .iter()
                .filter(|edge| edge.axis == axis)
                .map(|edge| (edge, edge.position - candidate))
                .filter(|(_, offset)| offset.abs() <= self.threshold)
                .min_by(|a, b| a.1.abs().total_cmp(&b.1.abs()));
            if let Some((edge, offset)) = best {
                self.active.push(edge.clone());
                return offset;
            }
        }
        0.0
    }

    /// Adjust a translation of `frame` by `delta` so that the moved box lines
    /// up with the grid or a nearby edge.
    pub fn snap_translation(&mut self, frame: &Frame, delta: Vec2) -> Vec2 {
        self.active.clear();
        let moved = frame.translated(delta).normalized();
        if let Some(grid) = self.grid {
            return delta
                + Vec2::new(
                    snap_value_to_grid(moved.x1, grid) - moved.x1,
                    snap_value_to_grid(moved.y1, grid) - moved.y1,
                );
        }
        let center = moved.center();
        let dx = self.snap_axis(SnapAxis::X, &[moved.x1, center.x, moved.x2]);
        let dy = self.snap_axis(SnapAxis::Y, &[moved.y1, center.y, moved.y2]);
        delta + Vec2::new(dx, dy)
    }

    /// Snap one moving coordinate, such as a resized edge. Does not clear
    /// guides, so several coordinates can be snapped in one step.
    pub fn snap_coordinate(&mut self, axis: SnapAxis, value: f64) -> f64 {
        if let Some(grid) = self.grid {
            return snap_value_to_grid(value, grid);
        }
        value + self.snap_axis(axis, &[value])
    }

    /// Snap a free point on both axes.
    pub fn snap_point(&mut self, point: Point) -> SnapResult {
        self.active.clear();
        if let Some(grid) = self.grid {
            return snap_to_grid(point, grid);
        }
        let dx = self.snap_axis(SnapAxis::X, &[point.x]);
        let dy = self.snap_axis(SnapAxis::Y, &[point.y]);
        SnapResult {
            point: Point::new(point.x + dx, point.y + dy),
            snapped_x: dx != 0.0,
            snapped_y: dy != 0.0,
        }
    }
}

/// Fold an edge into the list, joining it with an existing edge at the same
/// axis and position.
fn merge_edge(edges: &mut Vec<SnapEdge>, edge: SnapEdge) {
    match edges
        .iter_mut()
        .find(|e| e.axis == edge.axis && (e.position - edge.position).abs() < EDGE_EPSILON)
    {
        Some(existing) => existing.points.extend(edge.points),
        None => edges.push(edge),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{ElementDefaults, ElementKind, ElementType};

    fn rect(x1: f64, y1: f64, x2: f64, y2: f64) -> Element {
        Element::new(
            ElementKind::initialize(ElementType::Rectangle, &ElementDefaults::default()),
            Frame::new(x1, y1, x2, y2),
        )
    }

    #[test]
    fn test_snap_to_grid() {
        let result = snap_to_grid(Point::new(23.0, 47.0), 20.0);
        assert_eq!(result.point, Point::new(20.0, 40.0));
        assert!(result.snapped_x);
        assert!(result.snapped_y);
    }

    #[test]
    fn test_snap_to_grid_round_up() {
        let result = snap_to_grid(Point::new(31.0, 51.0), 20.0);
        assert_eq!(result.point, Point::new(40.0, 60.0));
    }

    #[test]
    fn test_snap_angle() {
        assert!((snap_angle(44.0, 15.0) - 45.0).abs() < f64::EPSILON);
        assert!((snap_angle(-7.0, 15.0) - 0.0).abs() < f64::EPSILON);
        assert!((snap_angle(-10.0, 15.0) - 345.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_edges_at_same_position_merge() {
        let elements = [rect(100.0, 0.0, 150.0, 50.0), rect(100.0, 100.0, 200.0, 150.0)];
        let engine = SnapEngine::build(&elements, &EditorSettings::default());
        let at_100: Vec<_> = engine
            .edges()
            .iter()
            .filter(|e| e.axis == SnapAxis::X && (e.position - 100.0).abs() < 1e-9)
            .collect();
        assert_eq!(at_100.len(), 1);
        assert_eq!(at_100[0].points.len(), 6);
        // A's right edge and B's center coincide at x = 150
        let at_150 = engine
            .edges()
            .iter()
            .filter(|e| e.axis == SnapAxis::X && (e.position - 150.0).abs() < 1e-9)
            .count();
        assert_eq!(at_150, 1);
    }

    #[test]
    fn test_translation_snaps_left_edge() {
        let elements = [rect(100.0, 0.0, 150.0, 50.0), rect(100.0, 100.0, 200.0, 150.0)];
        let mut engine = SnapEngine::build(&elements, &EditorSettings::default());
        let moving = Frame::new(300.0, 400.0, 350.0, 450.0);
        // drag so that the left edge lands at 98
        let delta = engine.snap_translation(&moving, Vec2::new(-202.0, 0.0));
        assert!((moving.x1 + delta.x - 100.0).abs() < 1e-9);
        assert!((delta.y - 0.0).abs() < f64::EPSILON);
        assert_eq!(engine.guides().len(), 1);
        assert_eq!(engine.guides()[0].axis, SnapAxis::X);
    }

    #[test]
    fn test_out_of_threshold_is_untouched() {
        let elements = [rect(100.0, 0.0, 150.0, 50.0)];
        let mut engine = SnapEngine::build(&elements, &EditorSettings::default());
        let moving = Frame::new(300.0, 400.0, 320.0, 420.0);
        let delta = engine.snap_translation(&moving, Vec2::new(-10.0, 0.0));
        assert_eq!(delta, Vec2::new(-10.0, 0.0));
        assert!(engine.guides().is_empty());
    }

    #[test]
    fn test_selected_and_creating_elements_are_ignored() {
        let mut selected = rect(0.0, 0.0, 10.0, 10.0);
        selected.selected = true;
        let mut creating = rect(0.0, 0.0, 10.0, 10.0);
        creating.creating = true;
        let engine = SnapEngine::build(&[selected, creating], &EditorSettings::default());
        assert!(engine.edges().is_empty());
    }

    #[test]
    fn test_grid_mode_rounds_and_skips_elements() {
        let settings = EditorSettings {
            grid_enabled: true,
            grid_size: 10.0,
            ..Default::default()
        };
        let elements = [rect(101.0, 0.0, 150.0, 50.0)];
        let mut engine = SnapEngine::build(&elements, &settings);
        assert!(engine.edges().is_empty());
        assert!((engine.snap_coordinate(SnapAxis::X, 98.0) - 100.0).abs() < f64::EPSILON);
        let moving = Frame::new(0.0, 0.0, 20.0, 20.0);
        assert_eq!(engine.snap_translation(&moving, Vec2::new(13.0, 6.0)), Vec2::new(10.0, 10.0));
    }

    #[test]
    fn test_first_matching_candidate_wins() {
        let elements = [rect(0.0, 0.0, 100.0, 100.0)];
        let mut engine = SnapEngine::build(&elements, &EditorSettings::default());
        // x1 is 4 away from 0; x2 would be 1 away from 100 but comes later
        let offset = engine.snap_axis(SnapAxis::X, &[4.0, 52.0, 101.0]);
        assert!((offset + 4.0).abs() < f64::EPSILON);
    }
}
