//! Tools and gesture states.

use crate::elements::{Element, ElementId, ElementType};
use crate::handles::HandleKind;
use crate::snap::SnapEngine;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Tool {
    #[default]
    Select,
    Pan,
    Erase,
    Rectangle,
    Ellipse,
    Diamond,
    Arrow,
    Text,
    Freehand,
    Note,
    Sticker,
}

impl Tool {
    /// Element type drawn by a creation tool.
    pub fn element_type(self) -> Option<ElementType> {
        match self {
            Tool::Select | Tool::Pan | Tool::Erase => None,
            Tool::Rectangle => Some(ElementType::Rectangle),
            Tool::Ellipse => Some(ElementType::Ellipse),
            Tool::Diamond => Some(ElementType::Diamond),
            Tool::Arrow => Some(ElementType::Arrow),
            Tool::Text => Some(ElementType::Text),
            Tool::Freehand => Some(ElementType::FreehandDraw),
            Tool::Note => Some(ElementType::Note),
            Tool::Sticker => Some(ElementType::Sticker),
        }
    }

    /// Single-key shortcut.
    pub fn from_hotkey(key: char) -> Option<Tool> {
        match key.to_ascii_lowercase() {
            'v' => Some(Tool::Select),
            'h' => Some(Tool::Pan),
            'e' => Some(Tool::Erase),
            'r' => Some(Tool::Rectangle),
            'o' => Some(Tool::Ellipse),
            'd' => Some(Tool::Diamond),
            'a' => Some(Tool::Arrow),
            't' => Some(Tool::Text),
            'p' => Some(Tool::Freehand),
            'n' => Some(Tool::Note),
            's' => Some(Tool::Sticker),
            _ => None,
        }
    }
}

/// Where the current gesture is.
///
/// Positions are canvas coordinates except for `Panning`, which tracks the
/// client position so that panning does not feed back into itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "state")]
pub enum GestureState {
    #[default]
    Idle,
    /// Pressed on an element; becomes `Translating` past the drag threshold.
    Pointing { origin: Point, target: ElementId },
    Creating { id: ElementId, snap: SnapEngine },
    Translating {
        origin: Point,
        /// Moving elements as they were when the gesture started.
        snapshots: Vec<Element>,
        snap: SnapEngine,
    },
    Resizing {
        id: ElementId,
        handle: HandleKind,
        snapshot: Element,
        snap: SnapEngine,
        /// Pointer angle around the element center at press, for rotation.
        start_angle: f64,
    },
    /// Marquee selection.
    Brushing { origin: Point, current: Point },
    Erasing,
    Panning { last: Point },
    TextEditing {
        id: ElementId,
        /// The element was created by this edit and its CREATE entry is still pending.
        created: bool,
        /// State before editing an existing element.
        original: Option<Element>,
    },
}

impl GestureState {
    pub fn is_idle(&self) -> bool {
        matches!(self, GestureState::Idle)
    }

    pub fn is_text_editing(&self) -> bool {
        matches!(self, GestureState::TextEditing { .. })
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            GestureState::Idle => "idle",
            GestureState::Pointing { .. } => "pointing",
            GestureState::Creating { .. } => "creating",
            GestureState::Translating { .. } => "translating",
            GestureState::Resizing { .. } => "resizing",
            GestureState::Brushing { .. } => "brushing",
            GestureState::Erasing => "erasing",
            GestureState::Panning { .. } => "panning",
            GestureState::TextEditing { .. } => "text editing",
        }
    }
}
