//! User-tunable editor settings.
//!
//! Settings travel with the document inside its `appState` block, and the
//! replay binary can override them from a standalone JSON file.

use crate::snap::{ANGLE_SNAP_INCREMENT, GRID_SIZE, SNAP_THRESHOLD};
use serde::{Deserialize, Serialize};

/// Pointer travel (in screen pixels) before a press turns into a drag.
pub const DRAG_THRESHOLD: f64 = 3.0;

/// Minimum distance between consecutive freehand samples.
pub const FREEHAND_MIN_DISTANCE: f64 = 3.0;

/// Padding added around a committed freehand stroke.
pub const FREEHAND_PADDING: f64 = 4.0;

/// Arrows whose midpoint lies closer than this to the straight line lose their curve.
pub const ARROW_STRAIGHTEN_DISTANCE: f64 = 8.0;

/// Editor settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorSettings {
    /// Grid spacing in canvas units.
    pub grid_size: f64,
    /// When enabled, coordinates round to the grid and element snapping is off.
    pub grid_enabled: bool,
    /// Snap to edges and centers of other elements.
    pub snap_to_elements: bool,
    /// Maximum distance (canvas units) at which an edge attracts.
    pub snap_threshold: f64,
    /// Keep the creation tool active after an element is drawn.
    pub tool_lock: bool,
    /// Nudge step used while Shift is held.
    pub nudge_small_step: f64,
    pub drag_threshold: f64,
    pub freehand_min_distance: f64,
    pub freehand_padding: f64,
    pub arrow_straighten_distance: f64,
    /// Rotation increment in degrees when Shift is held.
    pub angle_snap_degrees: f64,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,
            grid_enabled: false,
            snap_to_elements: true,
            snap_threshold: SNAP_THRESHOLD,
            tool_lock: false,
            nudge_small_step: 1.0,
            drag_threshold: DRAG_THRESHOLD,
            freehand_min_distance: FREEHAND_MIN_DISTANCE,
            freehand_padding: FREEHAND_PADDING,
            arrow_straighten_distance: ARROW_STRAIGHTEN_DISTANCE,
            angle_snap_degrees: ANGLE_SNAP_INCREMENT,
        }
    }
}

impl EditorSettings {
    /// Parse settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Nudge distance for an arrow-key press.
    pub fn nudge_step(&self, fine: bool) -> f64 {
        if fine { self.nudge_small_step } else { self.grid_size }
    }

    /// Whether element-to-element snapping is in effect.
    pub fn snaps_to_elements(&self) -> bool {
        self.snap_to_elements && !self.grid_enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = EditorSettings::from_json(r#"{"gridSize": 10, "gridEnabled": true}"#).unwrap();
        assert!((settings.grid_size - 10.0).abs() < f64::EPSILON);
        assert!(settings.grid_enabled);
        assert!((settings.snap_threshold - SNAP_THRESHOLD).abs() < f64::EPSILON);
        assert!(!settings.snaps_to_elements());
    }

    #[test]
    fn test_nudge_step() {
        let settings = EditorSettings::default();
        assert!((settings.nudge_step(false) - GRID_SIZE).abs() < f64::EPSILON);
        assert!((settings.nudge_step(true) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_roundtrip() {
        let settings = EditorSettings { tool_lock: true, ..Default::default() };
        let json = settings.to_json().unwrap();
        assert!(json.contains("toolLock"));
        assert_eq!(EditorSettings::from_json(&json).unwrap(), settings);
    }
}
